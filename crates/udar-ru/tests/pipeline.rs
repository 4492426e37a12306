//! End-to-end tests over the lexicon fixture in `tests/data/lexicon.tsv`
//! and a scripted grammar standing in for vislcg3.
//!
//! Tests marked `#[ignore]` run against real compiled resources. Set
//! UDAR_RESOURCE_PATH to a directory with the `.hfstol` transducers and
//! `disambiguator.cg3`, put `hfst-lookup` and `vislcg3` on PATH, and run:
//!
//!   UDAR_RESOURCE_PATH=/path/to/resources cargo test -p udar-ru --test pipeline -- --ignored

#![cfg(feature = "handle")]

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use udar_fst::lexicon::LexiconTransducer;
use udar_ru::{
    Collaborators, Document, Result, Scheme, Sentence, StressSelection, UdarError, UdarHandle,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SENTENCE: &str = "Мы удивились простоте системы.";

fn lexicon() -> LexiconTransducer {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/lexicon.tsv");
    LexiconTransducer::from_path(&path)
        .unwrap_or_else(|e| panic!("failed to load {}: {e}", path.display()))
}

/// A stand-in for the Russian grammar: keeps the singular genitive of
/// `системы` and the dative of `простоте`, removing the rest.
fn scripted_grammar(stream: &str) -> Result<String> {
    let mut out = String::new();
    let mut surface = String::new();
    for line in stream.lines() {
        out.push_str(line);
        if let Some(rest) = line.strip_prefix("\"<") {
            surface = rest.trim_end_matches(">\"").to_string();
        } else if line.starts_with('\t') {
            let decision = match surface.as_str() {
                "системы" if line.contains("+Prop+") => " ;removed REMOVE:12",
                "системы" if line.contains("+Pl+") => " ;removed REMOVE:31",
                "системы" if line.contains("+Sg+Gen") => " @most-likely SELECT:40",
                "простоте" if line.contains("+Loc") => " ;removed REMOVE:7",
                "простоте" if line.contains("+Dat") => " @most-likely SELECT:8",
                _ => "",
            };
            out.push_str(decision);
        }
        out.push('\n');
    }
    Ok(out)
}

fn handle() -> UdarHandle {
    UdarHandle::from_lexicon(lexicon()).with_disambiguator(Arc::new(scripted_grammar))
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Reading resolution
// ---------------------------------------------------------------------------

#[test]
fn slova_has_three_sorted_readings() {
    let token = handle().analyze_word("слова").unwrap();
    assert_eq!(token.readings().len(), 3);
    assert!(token.readings().iter().all(|r| r.lemma() == "слово"));
    let tags: BTreeSet<String> = token.readings().iter().map(|r| r.hfst_str()).collect();
    assert_eq!(
        tags,
        set(&[
            "слово+N+Neu+Inan+Pl+Acc",
            "слово+N+Neu+Inan+Pl+Nom",
            "слово+N+Neu+Inan+Sg+Gen",
        ])
    );
    let weights: Vec<f64> = token.readings().iter().map(|r| r.weight()).collect();
    assert!(weights.iter().all(|w| w.is_finite() && *w >= 0.0));
    assert!(weights.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(token.readings().iter().filter(|r| r.is_most_likely()).count(), 1);
}

#[test]
fn unknown_word_is_a_token_without_readings() {
    let token = handle().analyze_word("шмурдяк").unwrap();
    assert!(token.is_oov());
    assert!(token.most_likely().is_none());
}

// ---------------------------------------------------------------------------
// Disambiguation
// ---------------------------------------------------------------------------

#[test]
fn disambiguation_narrows_sistemy() {
    let mut h = handle();
    h.set_disambiguate(false);
    let before = h.analyze_sentence(SENTENCE).unwrap();
    let sistemy = &before.tokens()[3];
    assert_eq!(sistemy.text(), "системы");
    assert_eq!(sistemy.readings().len(), 4);

    h.set_disambiguate(true);
    let after = h.analyze_sentence(SENTENCE).unwrap();
    let sistemy = &after.tokens()[3];
    assert!(sistemy.readings().len() < 4);
    assert_eq!(sistemy.reading_count(), 4);
    assert_eq!(sistemy.readings().iter().filter(|r| r.is_most_likely()).count(), 1);
    let ml = sistemy.most_likely().unwrap();
    assert_eq!(ml.hfst_str(), "система+N+Fem+Inan+Sg+Gen");
    assert_eq!(ml.cg_rule(), Some("SELECT:40"));
    assert!(sistemy.removed_readings().iter().all(|r| r.cg_rule().is_some()));
}

#[test]
fn every_token_has_one_most_likely_after_merge() {
    let doc = handle().analyze_text(SENTENCE).unwrap();
    for token in doc.tokens() {
        let marked = token.readings().iter().filter(|r| r.is_most_likely()).count();
        assert_eq!(marked, usize::from(!token.readings().is_empty()), "{}", token.text());
        assert!(token.removed_readings().iter().all(|r| !r.is_most_likely()));
    }
}

#[test]
fn short_response_fails_without_touching_sentence() {
    let mut h = handle();
    h.set_disambiguate(false);
    let mut sentence = h.analyze_sentence(SENTENCE).unwrap();
    let before = sentence.clone();

    let truncate = |stream: &str| -> Result<String> {
        let full = scripted_grammar(stream)?;
        let cut = full.rfind("\"<.>\"").unwrap_or(full.len());
        Ok(full[..cut].to_string())
    };
    let err = sentence.disambiguate(&truncate).unwrap_err();
    assert!(matches!(err, UdarError::StreamMismatch(_)));
    assert_eq!(sentence, before);
}

#[test]
fn collaborator_failure_propagates() {
    let mut h = handle();
    h.set_disambiguate(false);
    let mut sentence = h.analyze_sentence(SENTENCE).unwrap();
    let down = |_: &str| -> Result<String> {
        Err(UdarError::unavailable("vislcg3", "not installed"))
    };
    assert!(matches!(
        sentence.disambiguate(&down),
        Err(UdarError::CollaboratorUnavailable { .. })
    ));
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

#[test]
fn cg_stream_round_trip_keeps_partitions() {
    let sentence = handle().analyze_sentence(SENTENCE).unwrap();
    let stream = sentence.to_cg_stream();
    assert!(stream.contains(";removed REMOVE:31"));
    let parsed = Sentence::from_cg_stream(&stream).unwrap();
    assert_eq!(parsed.text(), SENTENCE);
    assert_eq!(parsed.tokens(), sentence.tokens());
    for (a, b) in parsed.tokens().iter().zip(sentence.tokens()) {
        assert_eq!(
            a.most_likely().map(|r| r.hfst_str()),
            b.most_likely().map(|r| r.hfst_str())
        );
    }
}

#[test]
fn hfst_stream_round_trip() {
    let mut h = handle();
    h.set_disambiguate(false);
    let sentence = h.analyze_sentence(SENTENCE).unwrap();
    let parsed = Sentence::from_hfst_stream(&sentence.to_hfst_stream()).unwrap();
    assert_eq!(parsed.text(), SENTENCE);
    for (a, b) in parsed.tokens().iter().zip(sentence.tokens()) {
        assert_eq!(a.text(), b.text());
        assert_eq!(a.readings(), b.readings());
        assert!(a.removed_readings().is_empty());
    }
}

#[test]
fn document_stream_has_sentence_headers() {
    let doc = handle().analyze_text("Мы удивились. Мы удивились простоте системы.").unwrap();
    let stream = doc.to_cg_stream();
    assert_eq!(stream.matches("# TEXT: ").count(), 2);
    let back = Document::from_cg_stream(&stream).unwrap();
    assert_eq!(back.text(), doc.text());
    assert_eq!(back.num_tokens(), doc.num_tokens());
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

#[test]
fn stressed_sentence() {
    let h = handle();
    assert_eq!(
        h.stressed(SENTENCE).unwrap(),
        "Мы́ удиви́лись простоте́ систе́мы."
    );
}

#[test]
fn stress_selection_policies() {
    let mut h = handle();
    h.set_disambiguate(false);
    h.set_stress_selection(StressSelection::Safe);
    // сло́ва and слова́ disagree
    assert_eq!(h.stressed("слова").unwrap(), "слова");
    h.set_stress_selection(StressSelection::All);
    assert_eq!(h.stressed("слова").unwrap(), "сло́ва́");
    h.set_stress_selection(StressSelection::MostLikely);
    assert_eq!(h.stressed("Слова").unwrap(), "Сло́ва");
}

#[test]
fn phonetic_and_transliteration() {
    let mut h = handle();
    assert_eq!(h.phonetic("слово.").unwrap(), "sɫóvə.");
    assert_eq!(h.transliterate(SENTENCE), "My udivilisʹ prostote sistemy.");
    h.set_transliteration(Scheme::Passport2013);
    assert_eq!(h.transliterate("Мы удивились."), "My udivilis.");
}

// ---------------------------------------------------------------------------
// Learner tools
// ---------------------------------------------------------------------------

#[test]
fn distractors_follow_number_of_input() {
    let h = handle();
    assert_eq!(
        h.noun_distractors("словом", true).unwrap(),
        set(&["сло́во", "сло́ва", "сло́ве", "сло́ву", "сло́вом"])
    );
    assert_eq!(
        h.noun_distractors("словах", false).unwrap(),
        set(&["слова", "слов", "словах", "словам", "словами"])
    );
    assert!(matches!(h.noun_distractors("удивились", true), Err(UdarError::NotANoun(_))));
}

#[test]
fn learner_errors_are_grouped_by_tag() {
    let found = handle().diagnose_l2("Он хочит миня.").unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found["Err/L2_FV"], set(&["хочит"]));
    assert_eq!(found["Err/L2_e2i"], set(&["миня"]));
}

#[test]
fn unknown_tag_info() {
    assert!(matches!(UdarHandle::tag_info("UnknownXYZ"), Err(UdarError::UnknownTag(_))));
    assert!(UdarHandle::tag_info("Gen").unwrap().contains("enitive"));
}

// ---------------------------------------------------------------------------
// Documents and serialization
// ---------------------------------------------------------------------------

#[test]
fn document_json_and_features() {
    let doc = handle().analyze_text(SENTENCE).unwrap();
    let json = serde_json::to_value(&doc).unwrap();
    let sistemy = &json["sentences"][0]["tokens"][3];
    assert_eq!(sistemy["text"], "системы");
    assert_eq!(sistemy["readings"][0]["tags"][0], "N");
    assert_eq!(sistemy["readings"][0]["cg_rule"], "SELECT:40");

    let features = serde_json::to_value(doc.features()).unwrap();
    assert_eq!(features["num_tokens"], 5.0);
    assert_eq!(features["num_words"], 4.0);
    assert_eq!(features["oov_ratio"], 0.0);
}

// ---------------------------------------------------------------------------
// Real resources
// ---------------------------------------------------------------------------

fn resource_handle() -> UdarHandle {
    let dir = std::env::var("UDAR_RESOURCE_PATH").expect("UDAR_RESOURCE_PATH not set");
    UdarHandle::from_resource_dir(PathBuf::from(dir).as_path(), &Collaborators::from_env())
        .unwrap_or_else(|e| panic!("failed to load resources: {e}"))
}

#[test]
#[ignore = "requires hfst-lookup and UDAR_RESOURCE_PATH"]
fn real_analyzer_slova() {
    let token = resource_handle().analyze_word("слова").unwrap();
    assert!(token.readings().len() >= 3);
    assert!(token.has_lemma("слово"));
}

#[test]
#[ignore = "requires hfst-lookup, vislcg3 and UDAR_RESOURCE_PATH"]
fn real_grammar_narrows_sistemy() {
    let sentence = resource_handle().analyze_sentence(SENTENCE).unwrap();
    let sistemy = &sentence.tokens()[3];
    assert!(!sistemy.removed_readings().is_empty());
    assert_eq!(sistemy.readings().iter().filter(|r| r.is_most_likely()).count(), 1);
}
