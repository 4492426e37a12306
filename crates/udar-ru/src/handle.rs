// UdarHandle: top-level integration point for Russian analysis.
//
// Owns the collaborators (analyzer, learner-error analyzer, generators,
// disambiguator) and the tokenizer, and provides one API for analysis,
// disambiguation, stress placement, phonetic transcription,
// transliteration and the learner-tool helpers.
//
// Design notes:
// - Collaborators are held as trait objects behind `Arc`, so a handle can
//   run over hfst-lookup/vislcg3 processes or an in-memory lexicon alike.
// - Options are stored in the handle and applied when methods are called.
// - The learner-error analyzer and the disambiguator are optional;
//   operations that need a missing one fail with
//   `CollaboratorUnavailable`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use udar_core::character::{destress, strip_stress_marks};
use udar_core::process::DEFAULT_TIMEOUT;
use udar_core::reading::Reading;
use udar_core::{Result, UdarError};
use udar_fst::hfst::{self, HfstLookup};
use udar_fst::lexicon::LexiconTransducer;
use udar_fst::{Analyzer, Generator};

use crate::convenience;
use crate::derivation::transliterate::{self, Scheme};
use crate::derivation::evaluation::{self, StressCounts, StressParams};
use crate::derivation::frequency::StressFrequencies;
use crate::derivation::{self, StressOptions, StressSelection};
use crate::disambiguation::Disambiguator;
use crate::disambiguation::vislcg3::{self, Vislcg3};
use crate::document::Document;
use crate::sentence::Sentence;
use crate::token::Token;
use crate::tokenizer::{RuleTokenizer, Tokenizer};

/// File names inside a resource directory.
pub mod resources {
    pub const ANALYZER: &str = "analyser-gt-desc.hfstol";
    pub const L2_ANALYZER: &str = "analyser-gt-desc-L2.hfstol";
    pub const GENERATOR: &str = "generator-gt-norm.hfstol";
    pub const ACCENTED_GENERATOR: &str = "generator-gt-norm.accented.hfstol";
    pub const GRAMMAR: &str = "disambiguator.cg3";
    pub const LEXICON: &str = "lexicon.tsv";
    pub const STRESS_FREQUENCIES: &str = "stress-frequencies.tsv";
}

/// Environment variable overriding the `hfst-lookup` executable.
pub const HFST_LOOKUP_ENV: &str = "UDAR_HFST_LOOKUP";
/// Environment variable overriding the `vislcg3` executable.
pub const VISLCG3_ENV: &str = "UDAR_VISLCG3";

/// External programs used by a resource directory of compiled transducers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collaborators {
    pub hfst_lookup: PathBuf,
    pub vislcg3: PathBuf,
    pub timeout: Duration,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            hfst_lookup: PathBuf::from(hfst::DEFAULT_PROGRAM),
            vislcg3: PathBuf::from(vislcg3::DEFAULT_PROGRAM),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Collaborators {
    /// Defaults, with executables overridden by `UDAR_HFST_LOOKUP` and
    /// `UDAR_VISLCG3` when set.
    pub fn from_env() -> Self {
        let mut collaborators = Self::default();
        if let Some(program) = std::env::var_os(HFST_LOOKUP_ENV).filter(|p| !p.is_empty()) {
            collaborators.hfst_lookup = PathBuf::from(program);
        }
        if let Some(program) = std::env::var_os(VISLCG3_ENV).filter(|p| !p.is_empty()) {
            collaborators.vislcg3 = PathBuf::from(program);
        }
        collaborators
    }

    fn lookup(&self, transducer: PathBuf) -> HfstLookup {
        HfstLookup::with_program(self.hfst_lookup.clone(), transducer).with_timeout(self.timeout)
    }
}

/// Behaviour switches of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleOptions {
    /// Run the disambiguator after analysis, when one is configured.
    pub disambiguate: bool,
    pub stress_selection: StressSelection,
    /// Guess stress for words the analyzer does not know.
    pub guess_stress: bool,
    pub transliteration: Scheme,
}

impl Default for HandleOptions {
    fn default() -> Self {
        Self {
            disambiguate: true,
            stress_selection: StressSelection::default(),
            guess_stress: false,
            transliteration: Scheme::default(),
        }
    }
}

/// Top-level handle that owns all Russian analysis components.
pub struct UdarHandle {
    analyzer: Arc<dyn Analyzer>,
    /// Analyzer that also reports learner-error readings.
    l2_analyzer: Option<Arc<dyn Analyzer>>,
    /// Generator producing stressed forms.
    accented_generator: Arc<dyn Generator>,
    /// Generator producing unstressed forms.
    plain_generator: Option<Arc<dyn Generator>>,
    disambiguator: Option<Arc<dyn Disambiguator>>,
    /// Corpus counts for frequency stress selection.
    frequencies: Option<Arc<StressFrequencies>>,
    tokenizer: Box<dyn Tokenizer>,
    options: HandleOptions,
}

impl UdarHandle {
    /// A handle over an analyzer and a stressed-form generator, with the
    /// rule tokenizer and no optional collaborators.
    pub fn new(analyzer: Arc<dyn Analyzer>, accented_generator: Arc<dyn Generator>) -> Self {
        Self {
            analyzer,
            l2_analyzer: None,
            accented_generator,
            plain_generator: None,
            disambiguator: None,
            frequencies: None,
            tokenizer: Box::new(RuleTokenizer),
            options: HandleOptions::default(),
        }
    }

    pub fn with_l2_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.l2_analyzer = Some(analyzer);
        self
    }

    pub fn with_plain_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.plain_generator = Some(generator);
        self
    }

    pub fn with_disambiguator(mut self, disambiguator: Arc<dyn Disambiguator>) -> Self {
        self.disambiguator = Some(disambiguator);
        self
    }

    pub fn with_stress_frequencies(mut self, frequencies: Arc<StressFrequencies>) -> Self {
        self.frequencies = Some(frequencies);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// A handle over an in-memory lexicon, which serves as analyzer,
    /// learner-error analyzer and both generators.
    pub fn from_lexicon(lexicon: LexiconTransducer) -> Self {
        Self::new(Arc::new(lexicon.clone()), Arc::new(lexicon.accented()))
            .with_l2_analyzer(Arc::new(lexicon.with_learner_errors()))
            .with_plain_generator(Arc::new(lexicon.plain()))
    }

    /// Load a resource directory.
    ///
    /// A directory with `lexicon.tsv` is served from memory. Otherwise the
    /// analyzer and accented generator transducers are required and are run
    /// through `hfst-lookup`; the L2 analyzer, plain generator,
    /// `disambiguator.cg3` grammar and `stress-frequencies.tsv` table are
    /// used when present.
    pub fn from_resource_dir(dir: &Path, collaborators: &Collaborators) -> Result<Self> {
        let path = |name: &str| dir.join(name);
        let grammar = path(resources::GRAMMAR);

        let mut handle = if path(resources::LEXICON).is_file() {
            info!(dir = %dir.display(), "loading lexicon resources");
            Self::from_lexicon(LexiconTransducer::from_path(&path(resources::LEXICON))?)
        } else {
            for required in [resources::ANALYZER, resources::ACCENTED_GENERATOR] {
                if !path(required).is_file() {
                    return Err(UdarError::unavailable(
                        required,
                        format!("not found in {}", dir.display()),
                    ));
                }
            }
            info!(dir = %dir.display(), "loading transducer resources");
            let mut handle = Self::new(
                Arc::new(collaborators.lookup(path(resources::ANALYZER))),
                Arc::new(collaborators.lookup(path(resources::ACCENTED_GENERATOR))),
            );
            if path(resources::L2_ANALYZER).is_file() {
                handle = handle.with_l2_analyzer(Arc::new(collaborators.lookup(path(resources::L2_ANALYZER))));
            }
            if path(resources::GENERATOR).is_file() {
                handle = handle.with_plain_generator(Arc::new(collaborators.lookup(path(resources::GENERATOR))));
            }
            handle
        };

        if grammar.is_file() {
            let cg = Vislcg3::with_program(collaborators.vislcg3.clone(), grammar)
                .with_timeout(collaborators.timeout);
            handle = handle.with_disambiguator(Arc::new(cg));
        } else {
            debug!(dir = %dir.display(), "no grammar, disambiguation disabled");
        }
        if path(resources::STRESS_FREQUENCIES).is_file() {
            let table = StressFrequencies::from_path(&path(resources::STRESS_FREQUENCIES))?;
            handle = handle.with_stress_frequencies(Arc::new(table));
        }
        Ok(handle)
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    /// All readings of one wordform.
    pub fn analyze_word(&self, word: &str) -> Result<Token> {
        let analyses = self.analyzer.analyze(word)?;
        Token::from_analyses(word, 1, &analyses)
    }

    /// Analyze one sentence, disambiguating it if enabled.
    pub fn analyze_sentence(&self, text: &str) -> Result<Sentence> {
        let mut sentence = Sentence::analyze(text, self.tokenizer.as_ref(), self.analyzer.as_ref())?;
        if let Some(disambiguator) = self.active_disambiguator() {
            sentence.disambiguate(disambiguator)?;
        }
        Ok(sentence)
    }

    /// Split and analyze a text, disambiguating it if enabled.
    pub fn analyze_text(&self, text: &str) -> Result<Document> {
        let mut doc = Document::from_text(text, self.tokenizer.as_ref(), self.analyzer.as_ref())?;
        if let Some(disambiguator) = self.active_disambiguator() {
            doc.disambiguate(disambiguator)?;
        }
        Ok(doc)
    }

    /// Disambiguate a document regardless of the `disambiguate` option.
    pub fn disambiguate(&self, doc: &mut Document) -> Result<()> {
        let disambiguator = self
            .disambiguator
            .as_deref()
            .ok_or_else(|| UdarError::unavailable(vislcg3::DEFAULT_PROGRAM, "no grammar loaded"))?;
        doc.disambiguate(disambiguator)
    }

    fn active_disambiguator(&self) -> Option<&dyn Disambiguator> {
        if self.options.disambiguate {
            self.disambiguator.as_deref()
        } else {
            None
        }
    }

    // =========================================================================
    // Derived text
    // =========================================================================

    fn stress_options(&self) -> StressOptions<'_> {
        StressOptions {
            selection: self.options.stress_selection,
            guess: self.options.guess_stress,
            frequencies: self.frequencies.as_deref(),
        }
    }

    /// `text` with stress marks, per the configured selection policy.
    pub fn stressed(&self, text: &str) -> Result<String> {
        let doc = self.analyze_text(text)?;
        Ok(doc.stressed_with(self.accented_generator.as_ref(), &self.stress_options()))
    }

    /// Phonetic transcription of `text`.
    pub fn phonetic(&self, text: &str) -> Result<String> {
        let doc = self.analyze_text(text)?;
        Ok(doc.phonetic_with(self.accented_generator.as_ref(), &self.stress_options()))
    }

    /// The stress settings currently in effect. Disambiguation counts only
    /// when a disambiguator is configured.
    pub fn stress_params(&self) -> StressParams {
        StressParams {
            disambiguate: self.active_disambiguator().is_some(),
            selection: self.options.stress_selection,
            guess: self.options.guess_stress,
        }
    }

    /// Remove the stress from hand-stressed `text`, stress it again and
    /// count how each word came out.
    pub fn stress_eval(&self, text: &str) -> Result<StressCounts> {
        let gold: Vec<String> = self
            .tokenizer
            .tokenize(text)
            .into_iter()
            .map(|t| t.text)
            .collect();
        let doc = self.analyze_text(&destress(text))?;
        let counts = evaluation::stress_eval(&doc, gold.as_slice(), self.accented_generator.as_ref(), &self.stress_options())?;
        debug!(params = %self.stress_params(), tokens = gold.len(), "stress evaluation done");
        Ok(counts)
    }

    /// `text` in the configured transliteration scheme.
    pub fn transliterate(&self, text: &str) -> String {
        transliterate::transliterate(text, self.options.transliteration)
    }

    /// Surface form of a reading, stressed or not.
    pub fn generate(&self, reading: &Reading, stressed: bool) -> Result<Option<String>> {
        match (&self.plain_generator, stressed) {
            (Some(plain), false) => derivation::generate(reading, plain.as_ref()),
            (None, false) => Ok(derivation::generate(reading, self.accented_generator.as_ref())?
                .map(|form| strip_stress_marks(&form))),
            (_, true) => derivation::generate(reading, self.accented_generator.as_ref()),
        }
    }

    // =========================================================================
    // Learner tools
    // =========================================================================

    pub fn noun_distractors(&self, word: &str, stressed: bool) -> Result<BTreeSet<String>> {
        convenience::noun_distractors(
            word,
            self.analyzer.as_ref(),
            self.accented_generator.as_ref(),
            stressed,
        )
    }

    /// Learner errors in `text`, by error tag. Needs an L2 analyzer.
    pub fn diagnose_l2(&self, text: &str) -> Result<BTreeMap<String, BTreeSet<String>>> {
        let analyzer = self
            .l2_analyzer
            .as_deref()
            .ok_or_else(|| UdarError::unavailable(resources::L2_ANALYZER, "no learner-error analyzer loaded"))?;
        convenience::diagnose_l2(text, self.tokenizer.as_ref(), analyzer)
    }

    pub fn tag_info(name: &str) -> Result<&'static str> {
        convenience::tag_info(name)
    }

    // =========================================================================
    // Options
    // =========================================================================

    pub fn options(&self) -> HandleOptions {
        self.options
    }

    pub fn has_disambiguator(&self) -> bool {
        self.disambiguator.is_some()
    }

    pub fn set_disambiguate(&mut self, value: bool) {
        self.options.disambiguate = value;
    }

    pub fn set_stress_selection(&mut self, value: StressSelection) {
        self.options.stress_selection = value;
    }

    pub fn set_guess_stress(&mut self, value: bool) {
        self.options.guess_stress = value;
    }

    pub fn set_transliteration(&mut self, value: Scheme) {
        self.options.transliteration = value;
    }

    /// Set the transliteration scheme by name.
    pub fn set_transliteration_name(&mut self, name: &str) -> Result<()> {
        self.options.transliteration = derivation::scheme(name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
мы́\tмы+Pron+Pers+Pl1+Nom\t1.0
ви́дим\tвидеть+V+Impf+TV+Prs+Pl1\t2.0
сло́во\tслово+N+Neu+Inan+Sg+Nom\t5.0
сло́во\tслово+N+Neu+Inan+Sg+Acc\t5.0
.\t.+PUNCT+SENT\t0.0
";

    fn handle() -> UdarHandle {
        UdarHandle::from_lexicon(LexiconTransducer::from_tsv(TABLE).unwrap())
    }

    #[test]
    fn stress_and_options() {
        let mut h = handle();
        assert!(!h.has_disambiguator());
        assert_eq!(h.stressed("Мы видим слово.").unwrap(), "Мы́ ви́дим сло́во.");
        h.set_transliteration_name("passport2013").unwrap();
        assert_eq!(h.transliterate("Мы"), "My");
        assert!(matches!(
            h.set_transliteration_name("klingon"),
            Err(UdarError::UnknownTransliterationScheme(_))
        ));
        assert_eq!(h.options().transliteration, Scheme::Passport2013);
    }

    #[test]
    fn stress_evaluation() {
        let mut h = handle();
        let counts = h.stress_eval("Мы ви́дим сло́во шму́рдяк.").unwrap();
        assert_eq!(counts.true_positive, 2);
        assert_eq!(counts.false_negative, 1);
        assert_eq!(counts.skip, 2);
        let metrics = counts.compute_metrics().unwrap();
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 2.0 / 3.0);

        h.set_guess_stress(true);
        assert_eq!(h.stress_params().readable_name(), "noCG-most-likely-guess");
        let counts = h.stress_eval("Мы ви́дим сло́во шму́рдяк.").unwrap();
        assert_eq!(counts.true_positive, 3);
        assert_eq!(h.stressed("шмурдяк").unwrap(), "шму́рдяк");
    }

    #[test]
    fn plain_generation() {
        let h = handle();
        let token = h.analyze_word("слово").unwrap();
        let reading = token.most_likely().unwrap();
        assert_eq!(h.generate(reading, true).unwrap().as_deref(), Some("сло́во"));
        assert_eq!(h.generate(reading, false).unwrap().as_deref(), Some("слово"));
    }

    #[test]
    fn disambiguator_runs_when_enabled() {
        let drop_last = |stream: &str| -> Result<String> {
            Ok(stream.replace("Sg+Acc\t5.000000\n", "Sg+Acc\t5.000000 ;removed REMOVE:1\n"))
        };
        let mut h = handle().with_disambiguator(Arc::new(drop_last));
        let s = h.analyze_sentence("слово").unwrap();
        assert_eq!(s.tokens()[0].readings().len(), 1);
        assert_eq!(s.tokens()[0].removed_readings().len(), 1);

        h.set_disambiguate(false);
        let s = h.analyze_sentence("слово").unwrap();
        assert_eq!(s.tokens()[0].readings().len(), 2);

        let mut doc = h.analyze_text("слово").unwrap();
        h.disambiguate(&mut doc).unwrap();
        assert_eq!(doc.tokens().next().unwrap().removed_readings().len(), 1);
    }

    #[test]
    fn missing_collaborators() {
        let h = UdarHandle::new(
            Arc::new(LexiconTransducer::from_tsv(TABLE).unwrap()),
            Arc::new(LexiconTransducer::from_tsv(TABLE).unwrap()),
        );
        assert!(matches!(h.diagnose_l2("Мы."), Err(UdarError::CollaboratorUnavailable { .. })));
        let mut doc = h.analyze_text("Мы.").unwrap();
        assert!(matches!(h.disambiguate(&mut doc), Err(UdarError::CollaboratorUnavailable { .. })));
    }

    #[test]
    fn resource_dir_without_transducers() {
        let dir = std::env::temp_dir().join("udar-handle-empty-resources");
        std::fs::create_dir_all(&dir).unwrap();
        let err = UdarHandle::from_resource_dir(&dir, &Collaborators::default()).err().unwrap();
        assert!(matches!(err, UdarError::CollaboratorUnavailable { .. }));
    }

    #[test]
    fn resource_dir_with_lexicon() {
        let dir = std::env::temp_dir().join("udar-handle-lexicon-resources");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(resources::LEXICON), TABLE).unwrap();
        let h = UdarHandle::from_resource_dir(&dir, &Collaborators::default()).unwrap();
        assert!(!h.has_disambiguator());
        assert_eq!(h.analyze_word("мы").unwrap().readings().len(), 1);
    }

    #[test]
    fn resource_dir_with_stress_frequencies() {
        let dir = std::env::temp_dir().join("udar-handle-frequency-resources");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(resources::LEXICON),
            "сло́ва\tслово+N+Neu+Inan+Sg+Gen\t5.0\nслова́\tслово+N+Neu+Inan+Pl+Nom\t6.0\n",
        )
        .unwrap();
        std::fs::write(dir.join(resources::STRESS_FREQUENCIES), "слово+N+Neu+Inan+Pl+Nom\t9\n").unwrap();
        let mut h = UdarHandle::from_resource_dir(&dir, &Collaborators::default()).unwrap();
        assert_eq!(h.stressed("слова").unwrap(), "сло́ва");
        h.set_stress_selection(StressSelection::Frequency);
        assert_eq!(h.stressed("слова").unwrap(), "слова́");

        std::fs::write(dir.join(resources::STRESS_FREQUENCIES), "слово\tmany\n").unwrap();
        let err = UdarHandle::from_resource_dir(&dir, &Collaborators::default()).err().unwrap();
        assert!(matches!(err, UdarError::MalformedStream { line: 1, .. }));
    }
}
