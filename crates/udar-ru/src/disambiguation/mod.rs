// Disambiguation: the constraint-grammar collaborator and the merge of its
// decisions back into a sentence.
//
// The merge runs in two phases. First the whole response is parsed and
// checked against the sentence, producing a plan of per-token decisions;
// any structural disagreement fails with `StreamMismatch` before anything
// is touched. Only then is the plan applied, so a sentence is either fully
// updated or left as it was.

#[cfg(feature = "vislcg3")]
pub mod vislcg3;

use tracing::debug;
use udar_core::reading::{split_analysis, split_compound};
use udar_core::tag::Tag;
use udar_core::{Result, UdarError};

use crate::sentence::Sentence;
use crate::stream::cg::{self, Cohort};
use crate::token::Token;

/// The constraint-grammar collaborator, used as a stream filter.
///
/// Receives the submission stream of a sentence (active readings, no
/// markers) and returns the same cohorts with readings marked removed or
/// selected and annotated with rule references.
pub trait Disambiguator: Send + Sync {
    fn disambiguate(&self, stream: &str) -> Result<String>;
}

impl<F> Disambiguator for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn disambiguate(&self, stream: &str) -> Result<String> {
        self(stream)
    }
}

/// Decisions for one token, indexed by active-reading position.
#[derive(Debug, Default)]
struct TokenPlan {
    removed: Vec<bool>,
    selected: Option<usize>,
    rules: Vec<Option<String>>,
    /// (reading index, sub-reading index, tag index, new tag)
    substitutions: Vec<(usize, usize, usize, Tag)>,
}

fn mismatch(reason: String) -> UdarError {
    UdarError::StreamMismatch(reason)
}

fn plan_token(token: &Token, cohort: &Cohort) -> Result<TokenPlan> {
    if cohort.surface != token.text() {
        return Err(mismatch(format!(
            "token {} is {:?} but response line {} has {:?}",
            token.position(),
            token.text(),
            cohort.line,
            cohort.surface
        )));
    }
    let readings = token.readings();
    if cohort.readings.len() != readings.len() {
        return Err(mismatch(format!(
            "token {} ({:?}) submitted with {} readings, response has {}",
            token.position(),
            token.text(),
            readings.len(),
            cohort.readings.len()
        )));
    }

    let mut plan = TokenPlan::default();
    for (index, (reading, returned)) in readings.iter().zip(&cohort.readings).enumerate() {
        let parts: Vec<(&str, Vec<&str>)> = split_compound(&returned.analysis)
            .into_iter()
            .map(split_analysis)
            .collect();
        if parts.len() != reading.sub_reading_count() {
            return Err(mismatch(format!(
                "line {}: reading {:?} has {} sub-readings, submitted {:?} had {}",
                returned.line,
                returned.analysis,
                parts.len(),
                reading.hfst_str(),
                reading.sub_reading_count()
            )));
        }
        for (part, (sub, (lemma, tag_names))) in reading.sub_readings().zip(&parts).enumerate() {
            if tag_names.len() != sub.tags().len() {
                return Err(mismatch(format!(
                    "line {}: reading {:?} has {} tags, submitted {:?} had {}",
                    returned.line,
                    returned.analysis,
                    tag_names.len(),
                    reading.hfst_str(),
                    sub.tags().len()
                )));
            }
            if *lemma != sub.lemma() {
                debug!(line = returned.line, submitted = sub.lemma(), returned = *lemma, "ignoring lemma change");
            }
            for (tag_index, (old, name)) in sub.tags().iter().zip(tag_names).enumerate() {
                if old.name() == *name {
                    continue;
                }
                let new = Tag::from_name(name).ok_or_else(|| {
                    mismatch(format!("line {}: unknown tag {name:?}", returned.line))
                })?;
                plan.substitutions.push((index, part, tag_index, new));
            }
        }

        plan.removed.push(returned.removed);
        plan.rules.push(returned.rule());
        if returned.most_likely && !returned.removed {
            match plan.selected {
                None => plan.selected = Some(index),
                Some(first) => debug!(
                    token = %token.text(),
                    first,
                    ignored = index,
                    "more than one reading selected, keeping the first"
                ),
            }
        }
    }
    Ok(plan)
}

fn apply_plan(token: &mut Token, plan: TokenPlan) {
    let readings = token.readings_mut();
    for (reading_index, part, tag_index, tag) in plan.substitutions {
        readings[reading_index].replace_tag_in(part, tag_index, tag);
    }
    for (i, reading) in readings.iter_mut().enumerate() {
        if let Some(rule) = &plan.rules[i] {
            reading.set_cg_rule(Some(rule.clone()));
        }
        reading.set_most_likely(plan.selected == Some(i));
    }

    let all = std::mem::take(readings);
    let mut newly_removed = Vec::new();
    for (reading, removed) in all.into_iter().zip(plan.removed) {
        if removed {
            newly_removed.push(reading);
        } else {
            token.readings_mut().push(reading);
        }
    }
    if !newly_removed.is_empty() {
        debug!(token = %token.text(), removed = newly_removed.len(), "readings removed");
    }
    token.removed_readings_mut().extend(newly_removed);
    token.select_fallback_most_likely();
}

/// Merge a disambiguation response into `sentence`.
///
/// Fails with [`UdarError::StreamMismatch`] if the response has a different
/// number of cohorts, a different surface or reading count for any token,
/// a reading whose sub-reading or tag count changed, or an unknown
/// substituted tag; with
/// [`UdarError::MalformedStream`] if it cannot be parsed. On failure the
/// sentence is unchanged.
pub fn merge(sentence: &mut Sentence, response: &str) -> Result<()> {
    let cohorts = cg::parse_cohorts(response)?;
    if cohorts.len() != sentence.tokens().len() {
        return Err(mismatch(format!(
            "submitted {} tokens, response has {}",
            sentence.tokens().len(),
            cohorts.len()
        )));
    }
    let plans = sentence
        .tokens()
        .iter()
        .zip(&cohorts)
        .map(|(token, cohort)| plan_token(token, cohort))
        .collect::<Result<Vec<_>>>()?;

    for (token, plan) in sentence.tokens_mut().iter_mut().zip(plans) {
        apply_plan(token, plan);
    }
    Ok(())
}
