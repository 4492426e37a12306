// In-memory lexicon transducer.
//
// A table of `surface<TAB>lemma+TAGS<TAB>weight` rows (the same columns
// hfst-lookup prints) answers both directions: analysis is keyed by the
// lowercased, destressed surface form and generation by the analysis
// string. Surface forms in the table carry stress marks; the plain
// generator strips them.
//
// Lines starting with `#` and blank lines are ignored.

use std::path::Path;
use std::sync::Arc;

use hashbrown::HashMap;
use tracing::debug;
use udar_core::character::{destress, strip_stress_marks};
use udar_core::{Result, UdarError};

use crate::{Analyzer, Generator, RawAnalysis, analysis_str, parse_weight};

#[derive(Debug, Default)]
struct LexiconData {
    /// Destressed lowercase surface -> analyses in table order.
    analyses: HashMap<String, Vec<RawAnalysis>>,
    /// Analysis string -> (stressed surface, weight) in table order.
    forms: HashMap<String, Vec<(String, f64)>>,
}

/// A lexicon table acting as analyzer and generator.
///
/// Cloning is cheap: the table is shared, only the mode flags are copied.
#[derive(Debug, Clone)]
pub struct LexiconTransducer {
    data: Arc<LexiconData>,
    /// Generate with stress marks.
    accented: bool,
    /// Report analyses carrying learner-error tags.
    learner_errors: bool,
}

impl LexiconTransducer {
    /// Parse a lexicon table.
    ///
    /// Fails with [`UdarError::MalformedStream`] on a row with fewer than
    /// two columns or an unparsable weight.
    pub fn from_tsv(text: &str) -> Result<Self> {
        let mut data = LexiconData::default();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split('\t');
            let surface = fields.next().unwrap_or_default().trim();
            let analysis = fields.next().map(str::trim).unwrap_or_default();
            if surface.is_empty() || analysis.is_empty() {
                return Err(UdarError::MalformedStream {
                    line: line_no,
                    reason: format!("expected surface and analysis columns in {line:?}"),
                });
            }
            let weight_field = fields.next().unwrap_or_default();
            let weight = parse_weight(weight_field).ok_or_else(|| UdarError::MalformedStream {
                line: line_no,
                reason: format!("invalid weight {weight_field:?}"),
            })?;

            if let Some(raw) = RawAnalysis::from_analysis_str(analysis, weight) {
                data.analyses
                    .entry(lookup_key(surface))
                    .or_default()
                    .push(raw);
            }
            data.forms
                .entry(analysis.to_string())
                .or_default()
                .push((surface.to_string(), weight));
        }
        debug!(
            surfaces = data.analyses.len(),
            analyses = data.forms.len(),
            "loaded lexicon"
        );
        Ok(Self {
            data: Arc::new(data),
            accented: true,
            learner_errors: false,
        })
    }

    /// Read and parse a lexicon file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| UdarError::unavailable(path.display().to_string(), e))?;
        Self::from_tsv(&text)
    }

    /// Generator mode that keeps stress marks (the default).
    pub fn accented(&self) -> Self {
        Self {
            accented: true,
            ..self.clone()
        }
    }

    /// Generator mode that strips stress marks.
    pub fn plain(&self) -> Self {
        Self {
            accented: false,
            ..self.clone()
        }
    }

    /// Analyzer mode that also reports learner-error analyses, like the
    /// L2 analyser transducer.
    pub fn with_learner_errors(&self) -> Self {
        Self {
            learner_errors: true,
            ..self.clone()
        }
    }

    /// Number of distinct surface keys.
    pub fn len(&self) -> usize {
        self.data.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.analyses.is_empty()
    }
}

fn lookup_key(surface: &str) -> String {
    destress(&surface.to_lowercase())
}

fn has_learner_error(raw: &RawAnalysis) -> bool {
    raw.tags.iter().any(|t| t.starts_with("Err/L2"))
}

impl Analyzer for LexiconTransducer {
    fn analyze(&self, wordform: &str) -> Result<Vec<RawAnalysis>> {
        let Some(found) = self.data.analyses.get(&lookup_key(wordform)) else {
            return Ok(Vec::new());
        };
        Ok(found
            .iter()
            .filter(|raw| self.learner_errors || !has_learner_error(raw))
            .cloned()
            .collect())
    }
}

impl Generator for LexiconTransducer {
    fn generate(&self, lemma: &str, tags: &[&str]) -> Result<Option<String>> {
        self.generate_analysis(&analysis_str(lemma, tags))
    }

    fn generate_analysis(&self, analysis: &str) -> Result<Option<String>> {
        let best = self.data.forms.get(analysis).and_then(|forms| {
            forms
                .iter()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(form, _)| form.as_str())
        });
        Ok(best.map(|form| {
            if self.accented {
                form.to_string()
            } else {
                strip_stress_marks(form)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
# surface\tanalysis\tweight
сло́ва\tслово+N+Neu+Inan+Sg+Gen\t5.975586
слова́\tслово+N+Neu+Inan+Pl+Acc\t5.975586
слова́\tслово+N+Neu+Inan+Pl+Nom\t5.975586
сло́во\tслово+N+Neu+Inan+Sg+Nom\t5.0
ещё\tещё+Adv\t1.0
стола\tстол+N+Msc+Inan+Sg+Nom+Err/L2_FV\t9.0
";

    #[test]
    fn analyze_by_destressed_key() {
        let lex = LexiconTransducer::from_tsv(TABLE).unwrap();
        let found = lex.analyze("слова").unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].tags.last().map(String::as_str), Some("Gen"));
        assert_eq!(lex.analyze("Слова́").unwrap().len(), 3);
        assert!(lex.analyze("шмурдяк").unwrap().is_empty());
        assert_eq!(lex.len(), 5);
        assert!(!lex.is_empty());
    }

    #[test]
    fn generate_accented_and_plain() {
        let lex = LexiconTransducer::from_tsv(TABLE).unwrap();
        let tags = ["N", "Neu", "Inan", "Pl", "Nom"];
        assert_eq!(lex.generate("слово", &tags).unwrap().as_deref(), Some("слова́"));
        assert_eq!(lex.plain().generate("слово", &tags).unwrap().as_deref(), Some("слова"));
        assert_eq!(lex.plain().generate("ещё", &["Adv"]).unwrap().as_deref(), Some("ещё"));
        assert_eq!(lex.generate("слово", &["N", "Neu", "Inan", "Pl", "Voc"]).unwrap(), None);
    }

    #[test]
    fn compound_rows() {
        let lex = LexiconTransducer::from_tsv(TABLE).unwrap();
        let found = lex.analyze("полчаса").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].analysis_str(), "пол+Num+Acc#час+N+Msc+Inan+Sg+Gen+Count");
        let form = lex
            .generate_analysis("пол+Num+Acc#час+N+Msc+Inan+Sg+Gen+Count")
            .unwrap();
        assert_eq!(form.as_deref(), Some("полчаса́"));
    }

    #[test]
    fn learner_error_analyses_need_opt_in() {
        let lex = LexiconTransducer::from_tsv(TABLE).unwrap();
        assert!(lex.analyze("стола").unwrap().is_empty());
        assert_eq!(lex.with_learner_errors().analyze("стола").unwrap().len(), 1);
    }

    #[test]
    fn malformed_rows() {
        let err = LexiconTransducer::from_tsv("слова\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedStream { line: 1, .. }));
        let err = LexiconTransducer::from_tsv("# header\nслова\tслово+N\tx\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedStream { line: 2, .. }));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = LexiconTransducer::from_path(Path::new("/nonexistent/lexicon.tsv")).unwrap_err();
        assert!(matches!(err, UdarError::CollaboratorUnavailable { .. }));
    }
}
