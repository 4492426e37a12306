// Grammatical tags and the process-wide tag registry.
//
// Tags are interned: every distinct name maps to one static definition,
// and a `Tag` is a copyable handle to it. The registry is built on first
// use and read-only afterwards, so lookups from many threads need no lock.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use hashbrown::HashMap;
use serde::{Serialize, Serializer};

use crate::{Result, UdarError};

/// Morphosyntactic dimension a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeatureClass {
    PartOfSpeech,
    Punctuation,
    Gender,
    Animacy,
    Number,
    Case,
    Aspect,
    Transitivity,
    Tense,
    Mood,
    Person,
    Voice,
    Participle,
    Degree,
    PronounType,
    Derivation,
    Semantic,
    Usage,
    Error,
}

/// The six cases of the standard Russian noun paradigm, in school order
/// after nominative: Nom, Acc, Gen, Loc, Dat, Ins.
pub const PARADIGM_CASES: [&str; 6] = ["Nom", "Acc", "Gen", "Loc", "Dat", "Ins"];

/// Static definition behind a [`Tag`] handle.
#[derive(Debug)]
pub struct TagDef {
    name: &'static str,
    class: Option<FeatureClass>,
    description: &'static str,
    /// Ambiguous cover tag that also satisfies a membership test for this tag.
    cover: Option<&'static str>,
}

const fn def(
    name: &'static str,
    class: Option<FeatureClass>,
    description: &'static str,
) -> TagDef {
    TagDef {
        name,
        class,
        description,
        cover: None,
    }
}

const fn covered(
    name: &'static str,
    class: FeatureClass,
    description: &'static str,
    cover: &'static str,
) -> TagDef {
    TagDef {
        name,
        class: Some(class),
        description,
        cover: Some(cover),
    }
}

use FeatureClass::*;

static TAG_DEFS: &[TagDef] = &[
    // Parts of speech
    def("A", Some(PartOfSpeech), "Adjective"),
    def("Abbr", Some(PartOfSpeech), "Abbreviation"),
    def("Adv", Some(PartOfSpeech), "Adverb"),
    def("CC", Some(PartOfSpeech), "Coordinating conjunction"),
    def("CS", Some(PartOfSpeech), "Subordinating conjunction"),
    def("Interj", Some(PartOfSpeech), "Interjection"),
    def("N", Some(PartOfSpeech), "Noun"),
    def("Num", Some(PartOfSpeech), "Numeral"),
    def("Paren", Some(PartOfSpeech), "Parenthetical word"),
    def("Pcle", Some(PartOfSpeech), "Particle"),
    def("Po", Some(PartOfSpeech), "Postposition"),
    def("Pr", Some(PartOfSpeech), "Preposition"),
    def("Pron", Some(PartOfSpeech), "Pronoun"),
    def("V", Some(PartOfSpeech), "Verb"),
    def("Det", Some(PartOfSpeech), "Determiner"),
    def("Digit", Some(PartOfSpeech), "Number written with digits"),
    def("Symbol", Some(PartOfSpeech), "Symbol"),
    // Punctuation
    def("PUNCT", Some(Punctuation), "Punctuation"),
    def("CLB", Some(Punctuation), "Clause boundary"),
    def("SENT", Some(Punctuation), "Sentence-final punctuation"),
    def("COMMA", Some(Punctuation), "Comma"),
    def("DASH", Some(Punctuation), "Dash"),
    def("LPAR", Some(Punctuation), "Left parenthesis"),
    def("RPAR", Some(Punctuation), "Right parenthesis"),
    def("LQUOT", Some(Punctuation), "Left quotation mark"),
    def("RQUOT", Some(Punctuation), "Right quotation mark"),
    // Gender
    covered("Msc", Gender, "Masculine", "MFN"),
    covered("Fem", Gender, "Feminine", "MFN"),
    covered("Neu", Gender, "Neuter", "MFN"),
    def("MFN", Some(Gender), "Gender unspecified (masculine, feminine or neuter)"),
    // Animacy
    covered("Anim", Animacy, "Animate", "AnIn"),
    covered("Inan", Animacy, "Inanimate", "AnIn"),
    def("AnIn", Some(Animacy), "Animacy unspecified (animate or inanimate)"),
    // Number
    covered("Sg", Number, "Singular", "SgPl"),
    covered("Pl", Number, "Plural", "SgPl"),
    def("SgPl", Some(Number), "Number unspecified (singular or plural)"),
    // Case
    def("Nom", Some(Case), "Nominative case"),
    def("Acc", Some(Case), "Accusative case"),
    def("Gen", Some(Case), "Genitive case"),
    def("Gen2", Some(Case), "Second genitive (partitive) case"),
    def("Loc", Some(Case), "Locative (prepositional) case"),
    def("Loc2", Some(Case), "Second locative case"),
    def("Dat", Some(Case), "Dative case"),
    def("Ins", Some(Case), "Instrumental case"),
    def("Voc", Some(Case), "Vocative case"),
    def("Count", Some(Case), "Count form (after numerals 2-4)"),
    // Verbal categories
    def("Impf", Some(Aspect), "Imperfective aspect"),
    def("Perf", Some(Aspect), "Perfective aspect"),
    def("TV", Some(Transitivity), "Transitive verb"),
    def("IV", Some(Transitivity), "Intransitive verb"),
    def("Prs", Some(Tense), "Present tense"),
    def("Pst", Some(Tense), "Past tense"),
    def("Fut", Some(Tense), "Future tense"),
    def("Inf", Some(Mood), "Infinitive"),
    def("Imp", Some(Mood), "Imperative"),
    def("Cond", Some(Mood), "Conditional"),
    def("Sg1", Some(Person), "First person singular"),
    def("Sg2", Some(Person), "Second person singular"),
    def("Sg3", Some(Person), "Third person singular"),
    def("Pl1", Some(Person), "First person plural"),
    def("Pl2", Some(Person), "Second person plural"),
    def("Pl3", Some(Person), "Third person plural"),
    def("Act", Some(Voice), "Active voice"),
    def("Pass", Some(Voice), "Passive voice"),
    def("Impers", Some(Voice), "Impersonal verb"),
    def("PrsAct", Some(Participle), "Present active participle"),
    def("PrsPss", Some(Participle), "Present passive participle"),
    def("PstAct", Some(Participle), "Past active participle"),
    def("PstPss", Some(Participle), "Past passive participle"),
    // Adjectival categories
    def("Pred", Some(Degree), "Short-form (predicative) adjective"),
    def("Cmpar", Some(Degree), "Comparative"),
    def("Sint", Some(Degree), "Synthetic comparative or superlative"),
    def("Superl", Some(Degree), "Superlative"),
    // Pronoun types
    def("Pers", Some(PronounType), "Personal pronoun"),
    def("Dem", Some(PronounType), "Demonstrative pronoun"),
    def("Interr", Some(PronounType), "Interrogative pronoun"),
    def("Rel", Some(PronounType), "Relative pronoun"),
    def("Refl", Some(PronounType), "Reflexive pronoun"),
    def("Recip", Some(PronounType), "Reciprocal pronoun"),
    def("Neg", Some(PronounType), "Negative pronoun"),
    def("Indef", Some(PronounType), "Indefinite pronoun"),
    def("Def", Some(PronounType), "Definite pronoun"),
    def("Coll", Some(PronounType), "Collective numeral"),
    // Derivation
    def("Der", Some(Derivation), "Derived form"),
    def("Der/Dimin", Some(Derivation), "Derived diminutive"),
    def("Der/Adv", Some(Derivation), "Derived adverb (verbal adverb)"),
    def("Der/Ger", Some(Derivation), "Derived gerund"),
    def("Der/PrsAct", Some(Derivation), "Derived present active participle"),
    def("Der/PrsPss", Some(Derivation), "Derived present passive participle"),
    def("Der/PstAct", Some(Derivation), "Derived past active participle"),
    def("Der/PstPss", Some(Derivation), "Derived past passive participle"),
    def("Ord", Some(Derivation), "Ordinal numeral"),
    // Semantics
    def("Prop", Some(Semantic), "Proper noun"),
    def("Sem/Ant", Some(Semantic), "Given name"),
    def("Sem/Sur", Some(Semantic), "Surname"),
    def("Sem/Pat", Some(Semantic), "Patronymic"),
    def("Sem/Geo", Some(Semantic), "Geographical name"),
    def("Sem/Org", Some(Semantic), "Organization name"),
    // Usage
    def("Fac", Some(Usage), "Facultative (optional) stress position"),
    def("Leng", Some(Usage), "Lengthened form"),
    def("Use/NG", Some(Usage), "Analyzed but not generated"),
    def("Use/Obs", Some(Usage), "Obsolete"),
    def("Use/Marg", Some(Usage), "Marginal usage"),
    def("Use/Prb", Some(Usage), "Problematic usage"),
    // Errors
    def("Err/Orth", Some(Error), "Orthographic error"),
    def("Err/Misspell", Some(Error), "Misspelling"),
    def("Err/L2_a2o", Some(Error), "L2 error: unstressed о written as а"),
    def("Err/L2_e2i", Some(Error), "L2 error: unstressed е written as и"),
    def("Err/L2_e2je", Some(Error), "L2 error: е written as йе"),
    def("Err/L2_FV", Some(Error), "L2 error: fleeting vowel retained or omitted"),
    def("Err/L2_H2S", Some(Error), "L2 error: hard ending instead of soft"),
    def("Err/L2_i2j", Some(Error), "L2 error: и written instead of й"),
    def("Err/L2_ii", Some(Error), "L2 error: -ии ending written as -ие"),
    def("Err/L2_Ikn", Some(Error), "L2 error: ы written after к, г or х"),
    def("Err/L2_NoGem", Some(Error), "L2 error: missing double consonant"),
    def("Err/L2_o2a", Some(Error), "L2 error: unstressed а written as о"),
    def("Err/L2_Pal", Some(Error), "L2 error: missing palatalization mark"),
    def("Err/L2_prijti", Some(Error), "L2 error: прийти written as прийди"),
    def("Err/L2_sh2shch", Some(Error), "L2 error: ш written instead of щ"),
    def("Err/L2_y2i", Some(Error), "L2 error: и written instead of ы"),
];

static REGISTRY: LazyLock<HashMap<&'static str, Tag>> = LazyLock::new(|| {
    TAG_DEFS
        .iter()
        .map(|def| (def.name, Tag(def)))
        .collect()
});

/// An atomic grammatical or semantic label.
///
/// Identity is the tag name: two handles with the same name compare equal.
#[derive(Clone, Copy)]
pub struct Tag(&'static TagDef);

impl Tag {
    /// Look up an interned tag by name.
    pub fn from_name(name: &str) -> Option<Tag> {
        REGISTRY.get(name).copied()
    }

    /// Like [`Tag::from_name`], failing with [`UdarError::UnknownTag`].
    pub fn parse(name: &str) -> Result<Tag> {
        Self::from_name(name).ok_or_else(|| UdarError::UnknownTag(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        self.0.name
    }

    pub fn feature_class(self) -> Option<FeatureClass> {
        self.0.class
    }

    pub fn description(self) -> &'static str {
        self.0.description
    }

    /// Whether this tag marks a pattern typical of second-language learners.
    pub fn is_learner_error(self) -> bool {
        self.0.name.starts_with("Err/L2")
    }

    /// Whether this tag marks any kind of error.
    pub fn is_error(self) -> bool {
        self.0.name.starts_with("Err/")
    }

    /// The underspecified tag (e.g. `MFN` for `Msc`) that also counts as
    /// carrying this tag.
    pub fn cover(self) -> Option<Tag> {
        self.0.cover.and_then(Tag::from_name)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0.name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.name)
    }
}

/// Description of a tag from the registry.
pub fn tag_info(name: &str) -> Result<&'static str> {
    Tag::parse(name).map(Tag::description)
}

/// All registered tags in registry order.
pub fn all_tags() -> impl Iterator<Item = Tag> {
    TAG_DEFS.iter().map(Tag)
}
