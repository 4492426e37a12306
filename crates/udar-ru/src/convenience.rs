// Lemma and tag introspection helpers for language-learning tools.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use udar_core::character::strip_stress_marks;
use udar_core::tag::{FeatureClass, PARADIGM_CASES, Tag};
use udar_core::{Result, UdarError};
use udar_fst::{Analyzer, Generator};

use crate::derivation;
use crate::sentence::Sentence;
use crate::token::Token;
use crate::tokenizer::Tokenizer;

pub use udar_core::tag::tag_info;

/// The six-case paradigm of a noun wordform, in the number of the input.
///
/// Takes the first noun reading of `word` (stress marks in the input are
/// ignored by analysis), substitutes each of Nom, Acc, Gen, Loc, Dat and
/// Ins for its case and generates the forms. Case forms the generator does
/// not know are left out. With `stressed` false, stress marks are stripped
/// from the result.
///
/// Fails with [`UdarError::NotANoun`] when no reading of `word` is a noun
/// with a case.
pub fn noun_distractors(
    word: &str,
    analyzer: &dyn Analyzer,
    generator: &dyn Generator,
    stressed: bool,
) -> Result<BTreeSet<String>> {
    let analyses = analyzer.analyze(word)?;
    let token = Token::from_analyses(word, 1, &analyses)?;
    let noun = token
        .readings()
        .iter()
        .find(|r| r.part_of_speech().is_some_and(|pos| pos.name() == "N") && r.tag_of_class(FeatureClass::Case).is_some())
        .ok_or_else(|| UdarError::NotANoun(word.to_string()))?;

    let mut forms = BTreeSet::new();
    for case in PARADIGM_CASES {
        let Some(case_tag) = Tag::from_name(case) else {
            continue;
        };
        let mut synthetic = noun.clone();
        let Some(index) = synthetic
            .tags()
            .iter()
            .position(|t| t.feature_class() == Some(FeatureClass::Case))
        else {
            continue;
        };
        synthetic.replace_tag_at(index, case_tag);
        match derivation::generate(&synthetic, generator)? {
            Some(form) if stressed => {
                forms.insert(form);
            }
            Some(form) => {
                forms.insert(strip_stress_marks(&form));
            }
            None => debug!(reading = %synthetic.hfst_str(), "no form for case"),
        }
    }
    Ok(forms)
}

/// Learner errors found in `text`: each L2 error tag name mapped to the
/// surface forms whose readings carry it.
///
/// `analyzer` should be an analyzer that knows learner-error forms; a
/// standard analyzer simply finds none.
pub fn diagnose_l2(
    text: &str,
    tokenizer: &dyn Tokenizer,
    analyzer: &dyn Analyzer,
) -> Result<BTreeMap<String, BTreeSet<String>>> {
    let sentence = Sentence::analyze(text, tokenizer, analyzer)?;
    let mut errors: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for token in sentence.tokens() {
        for reading in token.readings() {
            for tag in reading.learner_error_tags() {
                errors
                    .entry(tag.name().to_string())
                    .or_default()
                    .insert(token.text().to_string());
            }
        }
    }
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::RuleTokenizer;
    use udar_fst::lexicon::LexiconTransducer;

    const TABLE: &str = "\
сло́во\tслово+N+Neu+Inan+Sg+Nom\t5.0
сло́во\tслово+N+Neu+Inan+Sg+Acc\t5.0
сло́ва\tслово+N+Neu+Inan+Sg+Gen\t5.0
сло́ве\tслово+N+Neu+Inan+Sg+Loc\t5.0
сло́ву\tслово+N+Neu+Inan+Sg+Dat\t5.0
сло́вом\tслово+N+Neu+Inan+Sg+Ins\t5.0
бы́стро\tбыстро+Adv\t3.0
ма́ма\tмама+N+Fem+Anim+Sg+Nom\t4.0
хочит\tхотеть+V+Impf+TV+Prs+Sg3+Err/L2_FV\t9.0
";

    #[test]
    fn singular_paradigm() {
        let lex = LexiconTransducer::from_tsv(TABLE).unwrap();
        let forms = noun_distractors("сло́вом", &lex, &lex.accented(), true).unwrap();
        let expected: BTreeSet<String> = ["сло́во", "сло́ва", "сло́ве", "сло́ву", "сло́вом"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(forms, expected);

        let plain = noun_distractors("словом", &lex, &lex.accented(), false).unwrap();
        assert!(plain.contains("слову"));
        assert_eq!(plain.len(), 5);
    }

    #[test]
    fn missing_case_forms_are_skipped() {
        let lex = LexiconTransducer::from_tsv(TABLE).unwrap();
        let forms = noun_distractors("мама", &lex, &lex.accented(), true).unwrap();
        assert_eq!(forms.into_iter().collect::<Vec<_>>(), ["ма́ма"]);
    }

    #[test]
    fn not_a_noun() {
        let lex = LexiconTransducer::from_tsv(TABLE).unwrap();
        let err = noun_distractors("быстро", &lex, &lex, true).unwrap_err();
        assert_eq!(err, UdarError::NotANoun("быстро".into()));
        let err = noun_distractors("шмурдяк", &lex, &lex, true).unwrap_err();
        assert!(matches!(err, UdarError::NotANoun(_)));
    }

    #[test]
    fn learner_errors_by_tag() {
        let lex = LexiconTransducer::from_tsv(TABLE).unwrap().with_learner_errors();
        let found = diagnose_l2("Мама хочит слово.", &RuleTokenizer, &lex).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found["Err/L2_FV"].contains("хочит"));

        let standard = LexiconTransducer::from_tsv(TABLE).unwrap();
        assert!(diagnose_l2("Мама хочит.", &RuleTokenizer, &standard).unwrap().is_empty());
    }

    #[test]
    fn tag_descriptions() {
        assert!(tag_info("Ins").is_ok());
        assert_eq!(tag_info("UnknownXYZ"), Err(UdarError::UnknownTag("UnknownXYZ".into())));
    }
}
