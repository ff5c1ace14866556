//! Data models for vocabulary words and their learning statistics.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Upper bound for the mastery scale. Mastery always stays in `0..=MAX_MASTERY`.
pub const MAX_MASTERY: u8 = 10;

/// One meaning of a word. `definition_cn` is the text used as the quiz answer;
/// everything else is supplementary display material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sense {
    #[serde(default)]
    pub definition_cn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_en: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_note: Option<String>,
}

impl Sense {
    pub fn new(definition_cn: String) -> Self {
        Self {
            definition_cn,
            definition_en: None,
            examples: Vec::new(),
            cycle_note: None,
        }
    }
}

/// Pronunciation metadata. `tts` is kept for export compatibility with the
/// original data format; this app renders the IPA instead of speaking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pronunciation {
    #[serde(default)]
    pub ipa: Option<String>,
    #[serde(default = "default_tts")]
    pub tts: bool,
}

fn default_tts() -> bool {
    true
}

impl Default for Pronunciation {
    fn default() -> Self {
        Self {
            ipa: None,
            tts: true,
        }
    }
}

/// Per-word learning state. `seen`/`correct`/`wrong` only ever grow;
/// `mastery` moves one step per answer, saturating at the scale bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordStats {
    #[serde(default)]
    pub seen: u32,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub wrong: u32,
    #[serde(default)]
    pub last_seen: Option<DateTime<Local>>,
    #[serde(default)]
    pub mastery: u8,
}

impl WordStats {
    /// Apply one quiz answer. Exactly one call per answered round.
    pub fn record_answer(&mut self, correct: bool) {
        self.seen += 1;
        self.last_seen = Some(Local::now());
        if correct {
            self.correct += 1;
            self.mastery = (self.mastery + 1).min(MAX_MASTERY);
        } else {
            self.wrong += 1;
            self.mastery = self.mastery.saturating_sub(1);
        }
    }
}

/// A vocabulary entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    #[serde(default)]
    pub id: String,
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub core_sense: usize,
    #[serde(default)]
    pub senses: Vec<Sense>,
    #[serde(default)]
    pub pronunciation: Pronunciation,
    #[serde(default)]
    pub stats: WordStats,
}

impl Word {
    pub fn new(word: String, senses: Vec<Sense>) -> Self {
        Self {
            id: normalize_id(&word),
            word,
            pos: None,
            tags: Vec::new(),
            core_sense: 0,
            senses,
            pronunciation: Pronunciation::default(),
            stats: WordStats::default(),
        }
    }

    /// The single defaulting point applied at every entry path (seed, import,
    /// manual save): derive a missing id from the word text and clamp mastery
    /// back into range. Serde defaults cover absent stats/pronunciation/tags.
    pub fn normalize(&mut self) {
        if self.id.is_empty() {
            self.id = normalize_id(&self.word);
        }
        if self.stats.mastery > MAX_MASTERY {
            self.stats.mastery = MAX_MASTERY;
        }
    }

    pub fn is_unseen(&self) -> bool {
        self.stats.seen == 0
    }

    /// Definition text used as the quiz answer: the core sense, falling back
    /// to the first sense when the core index is out of range or its
    /// definition is empty.
    pub fn quiz_definition(&self) -> Option<&str> {
        self.senses
            .get(self.core_sense)
            .map(|s| s.definition_cn.as_str())
            .filter(|d| !d.is_empty())
            .or_else(|| {
                self.senses
                    .first()
                    .map(|s| s.definition_cn.as_str())
                    .filter(|d| !d.is_empty())
            })
    }

    /// Context sentence shown above the quiz options: the first example of
    /// the quizzed sense, if any.
    pub fn context_sentence(&self) -> Option<&str> {
        let sense = self
            .senses
            .get(self.core_sense)
            .or_else(|| self.senses.first())?;
        sense.examples.first().map(String::as_str)
    }

    pub fn shares_tag_with(&self, other: &Word) -> bool {
        self.tags.iter().any(|t| other.tags.contains(t))
    }
}

/// Derive a stable id from the word text: trim, lowercase, whitespace runs
/// become underscores, everything outside `[a-z0-9_]` is stripped.
pub fn normalize_id(word: &str) -> String {
    word.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Sorted unique tags across the library, for the tag filter.
pub fn all_tags(words: &[Word]) -> Vec<String> {
    let mut tags: Vec<String> = words
        .iter()
        .flat_map(|w| w.tags.iter().cloned())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Aggregate statistics for the whole library.
#[derive(Debug, Default)]
pub struct LibraryStats {
    pub total_words: usize,
    pub unseen: usize,
    pub learning: usize,
    pub solid: usize,
    pub mastered: usize,
    pub total_seen: u32,
    pub total_correct: u32,
    pub total_wrong: u32,
}

impl LibraryStats {
    pub fn gather(words: &[Word]) -> Self {
        let mut stats = Self {
            total_words: words.len(),
            ..Default::default()
        };

        for w in words {
            if w.is_unseen() {
                stats.unseen += 1;
            } else if w.stats.mastery < 5 {
                stats.learning += 1;
            } else if w.stats.mastery < MAX_MASTERY {
                stats.solid += 1;
            } else {
                stats.mastered += 1;
            }

            stats.total_seen += w.stats.seen;
            stats.total_correct += w.stats.correct;
            stats.total_wrong += w.stats.wrong;
        }

        stats
    }

    pub fn accuracy_percent(&self) -> Option<u32> {
        if self.total_seen == 0 {
            return None;
        }
        Some(self.total_correct * 100 / self.total_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_lowercases_and_joins() {
        assert_eq!(normalize_id("Give Up"), "give_up");
        assert_eq!(normalize_id("  look   after  "), "look_after");
    }

    #[test]
    fn normalize_id_strips_punctuation() {
        assert_eq!(normalize_id("don't"), "dont");
        assert_eq!(normalize_id("state-of-the-art"), "stateoftheart");
    }

    #[test]
    fn record_answer_updates_counts_and_mastery() {
        let mut stats = WordStats::default();
        stats.record_answer(true);
        assert_eq!(stats.seen, 1);
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.wrong, 0);
        assert_eq!(stats.mastery, 1);
        assert!(stats.last_seen.is_some());

        stats.record_answer(false);
        assert_eq!(stats.seen, 2);
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.wrong, 1);
        assert_eq!(stats.mastery, 0);
    }

    #[test]
    fn mastery_saturates_at_bounds() {
        let mut stats = WordStats::default();
        for _ in 0..25 {
            stats.record_answer(true);
        }
        assert_eq!(stats.mastery, MAX_MASTERY);

        for _ in 0..25 {
            stats.record_answer(false);
        }
        assert_eq!(stats.mastery, 0);
        assert_eq!(stats.seen, 50);
    }

    #[test]
    fn normalize_fills_missing_id_and_clamps_mastery() {
        let mut w = Word::new("Carry On".to_string(), vec![Sense::new("继续".into())]);
        w.id.clear();
        w.stats.mastery = 99;
        w.normalize();
        assert_eq!(w.id, "carry_on");
        assert_eq!(w.stats.mastery, MAX_MASTERY);
    }

    #[test]
    fn normalize_keeps_explicit_id() {
        let mut w = Word::new("cat".to_string(), vec![Sense::new("猫".into())]);
        w.id = "custom_id".to_string();
        w.normalize();
        assert_eq!(w.id, "custom_id");
    }

    #[test]
    fn quiz_definition_prefers_core_sense() {
        let mut w = Word::new(
            "run".to_string(),
            vec![Sense::new("跑".into()), Sense::new("经营".into())],
        );
        w.core_sense = 1;
        assert_eq!(w.quiz_definition(), Some("经营"));
    }

    #[test]
    fn quiz_definition_falls_back_to_first_sense() {
        let mut w = Word::new(
            "run".to_string(),
            vec![Sense::new("跑".into()), Sense::new(String::new())],
        );
        w.core_sense = 1; // core sense has an empty definition
        assert_eq!(w.quiz_definition(), Some("跑"));

        w.core_sense = 7; // out of range
        assert_eq!(w.quiz_definition(), Some("跑"));
    }

    #[test]
    fn quiz_definition_none_without_senses() {
        let w = Word::new("bare".to_string(), Vec::new());
        assert_eq!(w.quiz_definition(), None);
    }

    #[test]
    fn all_tags_sorted_unique() {
        let mut a = Word::new("a".into(), vec![Sense::new("甲".into())]);
        a.tags = vec!["animal".into(), "pet".into()];
        let mut b = Word::new("b".into(), vec![Sense::new("乙".into())]);
        b.tags = vec!["animal".into()];
        assert_eq!(
            all_tags(&[a, b]),
            vec!["animal".to_string(), "pet".to_string()]
        );
    }

    #[test]
    fn word_roundtrips_through_json_with_defaults() {
        let json = r#"{"word":"cat","senses":[{"definition_cn":"猫"}]}"#;
        let mut w: Word = serde_json::from_str(json).unwrap();
        w.normalize();
        assert_eq!(w.id, "cat");
        assert_eq!(w.core_sense, 0);
        assert!(w.pronunciation.tts);
        assert!(w.pronunciation.ipa.is_none());
        assert_eq!(w.stats.seen, 0);
    }
}
