// One candidate morphological analysis of a token.

use std::fmt;

use serde::Serialize;

use crate::tag::{FeatureClass, Tag};
use crate::{Result, UdarError};

/// Weights closer than this are considered equal.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Suffix the transducer appends to a wordform it cannot analyze.
pub const UNKNOWN_SUFFIX: &str = "+?";

/// Joins the sub-readings of a compound analysis.
pub const COMPOUND_SEPARATOR: char = '#';

/// One lemma with its tags.
///
/// A simple reading is one sub-reading. A compound reading such as
/// `пол+Num+Acc#час+N+Msc+Inan+Sg+Gen+Count` joins several with `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubReading {
    lemma: String,
    tags: Vec<Tag>,
}

impl SubReading {
    /// Fails with [`UdarError::MalformedAnalysis`] on an empty lemma, an
    /// empty tag list, or an empty or unregistered tag name. `shown` is the
    /// full analysis, for the error message.
    fn new<S: AsRef<str>>(lemma: &str, tag_names: &[S], shown: &dyn Fn() -> String) -> Result<Self> {
        if lemma.is_empty() {
            return Err(UdarError::malformed(shown(), "empty lemma"));
        }
        if tag_names.is_empty() {
            return Err(UdarError::malformed(shown(), "no tags"));
        }
        let mut tags = Vec::with_capacity(tag_names.len());
        for name in tag_names {
            let name = name.as_ref();
            if name.is_empty() {
                return Err(UdarError::malformed(shown(), "empty tag"));
            }
            let tag = Tag::from_name(name)
                .ok_or_else(|| UdarError::malformed(shown(), format!("unknown tag {name}")))?;
            tags.push(tag);
        }
        Ok(Self {
            lemma: lemma.to_string(),
            tags,
        })
    }

    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag) || tag.cover().is_some_and(|cover| self.tags.contains(&cover))
    }

    fn write_hfst(&self, out: &mut String, with_l2: bool) {
        out.push_str(&self.lemma);
        for tag in self.tags.iter().filter(|t| with_l2 || !t.is_learner_error()) {
            out.push('+');
            out.push_str(tag.name());
        }
    }
}

impl fmt::Display for SubReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lemma)?;
        for tag in &self.tags {
            write!(f, "_{tag}")?;
        }
        Ok(())
    }
}

/// Grammatical analysis of a token: lemma, ordered tags and weight.
///
/// A token usually has several readings. Tag order is meaningful: it is the
/// order the generator expects and the order streams print.
///
/// Compound readings keep their last sub-reading as the head: [`lemma`]
/// and [`tags`] describe it, while membership tests look at every
/// sub-reading.
///
/// [`lemma`]: Reading::lemma
/// [`tags`]: Reading::tags
#[derive(Debug, Clone, Serialize)]
pub struct Reading {
    #[serde(flatten)]
    head: SubReading,
    /// Sub-readings before the head, in analysis order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    prefix: Vec<SubReading>,
    /// Lower is more likely.
    weight: f64,
    /// Disambiguation rule that touched this reading, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    cg_rule: Option<String>,
    most_likely: bool,
}

fn check_weight(weight: f64, shown: &dyn Fn() -> String) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(UdarError::malformed(shown(), format!("invalid weight {weight}")));
    }
    Ok(())
}

impl Reading {
    /// Build a simple reading from a lemma, tag names and a weight.
    ///
    /// Fails with [`UdarError::MalformedAnalysis`] on an empty lemma, an
    /// empty tag list, an empty or unregistered tag name, or a weight that
    /// is negative or not finite.
    pub fn new<S: AsRef<str>>(lemma: &str, tag_names: &[S], weight: f64) -> Result<Self> {
        let shown = || {
            let mut s = lemma.to_string();
            for t in tag_names {
                s.push('+');
                s.push_str(t.as_ref());
            }
            s
        };
        check_weight(weight, &shown)?;
        Ok(Self::from_head(SubReading::new(lemma, tag_names, &shown)?, weight))
    }

    fn from_head(head: SubReading, weight: f64) -> Self {
        Self {
            head,
            prefix: Vec::new(),
            weight,
            cg_rule: None,
            most_likely: false,
        }
    }

    /// Parse an `lemma+TAG+TAG` analysis string, or several joined by `#`.
    ///
    /// Returns `Ok(None)` for the out-of-vocabulary marker (`word+?`).
    pub fn parse(analysis: &str, weight: f64) -> Result<Option<Self>> {
        if analysis.ends_with(UNKNOWN_SUFFIX) {
            return Ok(None);
        }
        let shown = || analysis.to_string();
        check_weight(weight, &shown)?;
        let mut parts = split_compound(analysis)
            .into_iter()
            .map(|part| {
                let (lemma, tags) = split_analysis(part);
                SubReading::new(lemma, &tags, &shown)
            })
            .collect::<Result<Vec<_>>>()?;
        let Some(head) = parts.pop() else {
            return Err(UdarError::malformed(analysis, "empty analysis"));
        };
        let mut reading = Self::from_head(head, weight);
        reading.prefix = parts;
        Ok(Some(reading))
    }

    /// Lemma of the head sub-reading.
    pub fn lemma(&self) -> &str {
        &self.head.lemma
    }

    /// Tags of the head sub-reading.
    pub fn tags(&self) -> &[Tag] {
        &self.head.tags
    }

    /// Every sub-reading in analysis order, the head last.
    pub fn sub_readings(&self) -> impl Iterator<Item = &SubReading> {
        self.prefix.iter().chain(std::iter::once(&self.head))
    }

    pub fn sub_reading_count(&self) -> usize {
        self.prefix.len() + 1
    }

    /// More than one lemma joined with `#`.
    pub fn is_compound(&self) -> bool {
        !self.prefix.is_empty()
    }

    /// Lemmas of all sub-readings in analysis order.
    pub fn lemmas(&self) -> impl Iterator<Item = &str> {
        self.sub_readings().map(SubReading::lemma)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn cg_rule(&self) -> Option<&str> {
        self.cg_rule.as_deref()
    }

    pub fn is_most_likely(&self) -> bool {
        self.most_likely
    }

    pub fn set_most_likely(&mut self, value: bool) {
        self.most_likely = value;
    }

    pub fn set_cg_rule(&mut self, rule: Option<String>) {
        self.cg_rule = rule;
    }

    /// Exact lemma match against any sub-reading.
    pub fn has_lemma(&self, lemma: &str) -> bool {
        self.lemmas().any(|l| l == lemma)
    }

    /// Whether any sub-reading carries `tag` or the underspecified tag that
    /// covers it (`MFN` counts as `Msc`).
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.sub_readings().any(|sub| sub.has_tag(tag))
    }

    /// Like [`Reading::has_tag`], by tag name. Unknown names never match.
    pub fn has_tag_name(&self, name: &str) -> bool {
        Tag::from_name(name).is_some_and(|tag| self.has_tag(tag))
    }

    /// First head tag of the given feature class.
    pub fn tag_of_class(&self, class: FeatureClass) -> Option<Tag> {
        self.head
            .tags
            .iter()
            .copied()
            .find(|t| t.feature_class() == Some(class))
    }

    /// The part-of-speech tag of the head, if any.
    pub fn part_of_speech(&self) -> Option<Tag> {
        self.tag_of_class(FeatureClass::PartOfSpeech)
    }

    /// Tags flagged as learner errors, over all sub-readings.
    pub fn learner_error_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.sub_readings()
            .flat_map(|sub| sub.tags.iter().copied())
            .filter(|t| t.is_learner_error())
    }

    /// Substitute the first occurrence of `old` with `new` in every
    /// sub-reading, keeping positions. Returns `false` if `old` is not
    /// present anywhere.
    pub fn replace_tag(&mut self, old: Tag, new: Tag) -> bool {
        let mut replaced = false;
        for sub in self.prefix.iter_mut().chain(std::iter::once(&mut self.head)) {
            if let Some(index) = sub.tags.iter().position(|&t| t == old) {
                sub.tags[index] = new;
                replaced = true;
            }
        }
        replaced
    }

    /// Substitute the head tag at `index`.
    pub fn replace_tag_at(&mut self, index: usize, new: Tag) -> bool {
        self.replace_tag_in(self.prefix.len(), index, new)
    }

    /// Substitute the tag at `index` of sub-reading `part` (analysis
    /// order). Used when a disambiguation response reports a changed tag at
    /// a known position.
    pub fn replace_tag_in(&mut self, part: usize, index: usize, new: Tag) -> bool {
        let sub = if part == self.prefix.len() {
            Some(&mut self.head)
        } else {
            self.prefix.get_mut(part)
        };
        match sub.and_then(|sub| sub.tags.get_mut(index)) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }

    /// `lemma+TAG+TAG`, the transducer's analysis notation, sub-readings
    /// joined by `#`.
    pub fn hfst_str(&self) -> String {
        self.write_hfst(true)
    }

    /// Like [`Reading::hfst_str`] without learner-error tags; this is what
    /// the generator accepts.
    pub fn hfst_str_without_l2(&self) -> String {
        self.write_hfst(false)
    }

    fn write_hfst(&self, with_l2: bool) -> String {
        let mut out = String::new();
        for (i, sub) in self.sub_readings().enumerate() {
            if i > 0 {
                out.push(COMPOUND_SEPARATOR);
            }
            sub.write_hfst(&mut out, with_l2);
        }
        out
    }
}

impl PartialEq for Reading {
    /// Sub-readings and rule match exactly; weights match within
    /// [`WEIGHT_EPSILON`]. The most-likely flag is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head
            && self.prefix == other.prefix
            && (self.weight - other.weight).abs() <= WEIGHT_EPSILON
            && self.cg_rule == other.cg_rule
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sub) in self.sub_readings().enumerate() {
            if i > 0 {
                write!(f, "{COMPOUND_SEPARATOR}")?;
            }
            write!(f, "{sub}")?;
        }
        Ok(())
    }
}

/// Split a compound analysis at `#` separators.
///
/// A `#` only separates when it follows some text and is followed by a
/// character other than `+`, so the analysis of the `#` sign itself
/// (`#+PUNCT`) stays whole.
pub fn split_compound(analysis: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut iter = analysis.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        if c != COMPOUND_SEPARATOR || i == start {
            continue;
        }
        if iter.peek().is_some_and(|&(_, next)| next != '+') {
            parts.push(&analysis[start..i]);
            start = i + 1;
        }
    }
    parts.push(&analysis[start..]);
    parts
}

/// Split an analysis string into lemma and tag names.
///
/// Splits at every `+` followed by a character other than `+`, so a lemma
/// that is itself `+` survives: `++PUNCT` is lemma `+`, tag `PUNCT`.
pub fn split_analysis(analysis: &str) -> (&str, Vec<&str>) {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut iter = analysis.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        if c != '+' || i == start {
            continue;
        }
        match iter.peek() {
            Some(&(_, next)) if next != '+' => {
                parts.push(&analysis[start..i]);
                start = i + 1;
            }
            // A trailing `+` yields an empty tag, reported by the caller.
            None => {
                parts.push(&analysis[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&analysis[start..]);
    let lemma = parts.remove(0);
    (lemma, parts)
}
