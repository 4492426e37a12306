// Corpus frequencies for the `freq` stress selection.
//
// A table of `key<TAB>count` rows. The key kind follows its shape:
//
//   слово+N+Neu+Inan+Sg+Gen   a full reading (lemma and tags)
//   слово                     a lemma
//   +N+Neu+Inan+Sg+Gen        a tag sequence of any lemma
//
// Selection prefers the full reading count, then the lemma count, then
// the tag sequence count. Lines starting with `#` and blank lines are
// ignored.

use std::path::Path;

use hashbrown::HashMap;
use tracing::debug;
use udar_core::reading::Reading;
use udar_core::{Result, UdarError};

#[derive(Debug, Clone, Default)]
pub struct StressFrequencies {
    readings: HashMap<String, u64>,
    lemmas: HashMap<String, u64>,
    tag_sequences: HashMap<String, u64>,
}

impl StressFrequencies {
    /// Parse a frequency table. Repeated keys add up.
    ///
    /// Fails with [`UdarError::MalformedStream`] on a row without a count or
    /// with a count that is not a non-negative integer.
    pub fn from_tsv(text: &str) -> Result<Self> {
        let mut table = Self::default();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let malformed = |reason: String| UdarError::MalformedStream {
                line: index + 1,
                reason,
            };
            let (key, count) = line
                .split_once('\t')
                .ok_or_else(|| malformed(format!("expected key and count columns in {line:?}")))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(malformed("empty key".into()));
            }
            let count: u64 = count
                .trim()
                .parse()
                .map_err(|_| malformed(format!("invalid count {:?}", count.trim())))?;
            let bucket = if key.starts_with('+') {
                &mut table.tag_sequences
            } else if key.contains('+') {
                &mut table.readings
            } else {
                &mut table.lemmas
            };
            *bucket.entry(key.to_string()).or_default() += count;
        }
        debug!(
            readings = table.readings.len(),
            lemmas = table.lemmas.len(),
            tag_sequences = table.tag_sequences.len(),
            "loaded stress frequencies"
        );
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| UdarError::unavailable(path.display().to_string(), e))?;
        Self::from_tsv(&text)
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty() && self.lemmas.is_empty() && self.tag_sequences.is_empty()
    }

    pub fn reading_count(&self, reading: &Reading) -> u64 {
        self.readings
            .get(&reading.hfst_str_without_l2())
            .copied()
            .unwrap_or(0)
    }

    /// Count of the lemma of the head sub-reading.
    pub fn lemma_count(&self, reading: &Reading) -> u64 {
        self.lemmas.get(reading.lemma()).copied().unwrap_or(0)
    }

    /// Count of the head's tags, written `+T1+T2...`.
    pub fn tag_sequence_count(&self, reading: &Reading) -> u64 {
        let key: String = reading
            .tags()
            .iter()
            .filter(|t| !t.is_learner_error())
            .map(|t| format!("+{}", t.name()))
            .collect();
        self.tag_sequences.get(&key).copied().unwrap_or(0)
    }

    /// The most frequent of `readings`: the first level with any nonzero
    /// count decides, the first of equal counts wins. `None` when nothing
    /// in the table matches.
    pub fn most_frequent<'r>(&self, readings: &'r [Reading]) -> Option<&'r Reading> {
        let levels: [&dyn Fn(&Reading) -> u64; 3] = [
            &|r| self.reading_count(r),
            &|r| self.lemma_count(r),
            &|r| self.tag_sequence_count(r),
        ];
        for count in levels {
            let mut best: Option<(&Reading, u64)> = None;
            for reading in readings {
                let n = count(reading);
                if n > 0 && best.is_none_or(|(_, b)| n > b) {
                    best = Some((reading, n));
                }
            }
            if let Some((reading, _)) = best {
                return Some(reading);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
# key\tcount
замок+N+Msc+Inan+Sg+Nom\t12
замо́к\t1
замок\t40
+N+Neu+Inan+Pl+Nom\t7
+N+Neu+Inan+Sg+Gen\t3
+N+Neu+Inan+Pl+Nom\t2
";

    fn reading(analysis: &str) -> Reading {
        Reading::parse(analysis, 1.0).unwrap().unwrap()
    }

    #[test]
    fn keys_are_sorted_by_shape() {
        let table = StressFrequencies::from_tsv(TABLE).unwrap();
        let r = reading("замок+N+Msc+Inan+Sg+Nom");
        assert_eq!(table.reading_count(&r), 12);
        assert_eq!(table.lemma_count(&r), 40);
        assert_eq!(table.tag_sequence_count(&reading("слово+N+Neu+Inan+Pl+Nom")), 9);
        assert!(!table.is_empty());
    }

    #[test]
    fn full_reading_beats_lemma_beats_tags() {
        let table = StressFrequencies::from_tsv(TABLE).unwrap();
        let readings = [
            reading("замок+N+Msc+Inan+Sg+Acc"),
            reading("замок+N+Msc+Inan+Sg+Nom"),
        ];
        assert_eq!(table.most_frequent(&readings), Some(&readings[1]));

        let readings = [reading("слово+N+Neu+Inan+Sg+Gen"), reading("слово+N+Neu+Inan+Pl+Nom")];
        assert_eq!(table.most_frequent(&readings), Some(&readings[1]));

        let readings = [reading("мы+Pron+Pers+Pl1+Nom")];
        assert_eq!(table.most_frequent(&readings), None);
    }

    #[test]
    fn malformed_rows() {
        let err = StressFrequencies::from_tsv("слово\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedStream { line: 1, .. }));
        let err = StressFrequencies::from_tsv("# c\nслово\tmany\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedStream { line: 2, .. }));
        let err = StressFrequencies::from_tsv("\t4\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedStream { line: 1, .. }));
    }
}
