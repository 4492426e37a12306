// Stress placement through the accented generator.
//
// Stress is best-effort: a reading the generator cannot produce, or a
// generator failure, leaves the surface form unmarked. Words the analyzer
// does not know are only stressed when guessing is enabled.

use std::collections::BTreeSet;

use tracing::{debug, warn};
use udar_core::case::match_case;
use udar_core::character::{mark_vowels, stressed_vowels};
use udar_core::reading::Reading;
use udar_fst::Generator;

use super::guess::guess_stress;
use super::{StressOptions, StressSelection, generate};
use crate::token::Token;

/// Generated form of one reading, in the capitalization of the token.
fn stressed_reading(token: &Token, reading: &Reading, generator: &dyn Generator) -> Option<String> {
    match generate(reading, generator) {
        Ok(Some(form)) => Some(match_case(token.text(), &form)),
        Ok(None) => {
            debug!(token = %token.text(), reading = %reading, "no stressed form generated");
            None
        }
        Err(e) => {
            warn!(token = %token.text(), error = %e, "stress generation failed, leaving unmarked");
            None
        }
    }
}

/// All distinct stressed forms over the active readings.
pub fn stresses(token: &Token, generator: &dyn Generator) -> BTreeSet<String> {
    token
        .readings()
        .iter()
        .filter_map(|r| stressed_reading(token, r, generator))
        .collect()
}

/// The stressed form of a token under `selection`, without guessing.
pub fn stressed_form(token: &Token, generator: &dyn Generator, selection: StressSelection) -> String {
    stressed_form_with(token, generator, &selection.into())
}

/// The stressed form of a token under `options`.
pub fn stressed_form_with(token: &Token, generator: &dyn Generator, options: &StressOptions<'_>) -> String {
    let surface = token.text();
    if token.is_oov() {
        let guessed = if options.guess { guess_stress(surface) } else { None };
        return guessed.unwrap_or_else(|| surface.to_string());
    }
    let derived = match options.selection {
        StressSelection::MostLikely => token
            .most_likely()
            .and_then(|r| stressed_reading(token, r, generator)),
        StressSelection::Frequency => options
            .frequencies
            .and_then(|table| table.most_frequent(token.readings()))
            .or_else(|| token.most_likely())
            .and_then(|r| stressed_reading(token, r, generator)),
        StressSelection::Safe => {
            let forms: Vec<String> = token
                .readings()
                .iter()
                .map(|r| stressed_reading(token, r, generator))
                .collect::<Option<_>>()
                .unwrap_or_default();
            match forms.split_first() {
                Some((first, rest)) if rest.iter().all(|f| f == first) => Some(first.clone()),
                _ => None,
            }
        }
        StressSelection::All => {
            let mut positions: Vec<usize> = stresses(token, generator)
                .iter()
                .flat_map(|form| stressed_vowels(form))
                .collect();
            positions.sort_unstable();
            positions.dedup();
            (!positions.is_empty()).then(|| mark_vowels(surface, &positions))
        }
    };
    derived.unwrap_or_else(|| surface.to_string())
}
