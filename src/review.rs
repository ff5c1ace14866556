//! Review selection and multiple-choice option building.
//!
//! Both operations are pure functions over the in-memory word list handed in
//! by the caller: they never touch storage and never mutate the pool. All
//! randomness flows through the injected `Rng`, so tests drive them with a
//! seeded generator.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Word, WordStats};

/// Shown as the answer when a target has no usable definition text. Store
/// validation keeps such words out of manual entry, so this only surfaces
/// for degenerate imported data.
const EMPTY_DEFINITION: &str = "—";

/// Deterministic part of the review priority: wrong answers weigh most,
/// low mastery moderately, and never-seen words get a flat boost so new
/// vocabulary surfaces promptly.
pub fn base_score(stats: &WordStats) -> f64 {
    let wrong_boost = f64::from(stats.wrong) * 3.0;
    let low_mastery_boost = f64::from(5u8.saturating_sub(stats.mastery)) * 2.0;
    let unseen_boost = if stats.seen == 0 { 6.0 } else { 0.0 };
    wrong_boost + low_mastery_boost + unseen_boost
}

/// Full review score: base score plus a uniform `[0, 1)` jitter that breaks
/// ties and varies the rotation among equally-scored words.
pub fn review_score<R: Rng + ?Sized>(word: &Word, rng: &mut R) -> f64 {
    base_score(&word.stats) + rng.random::<f64>()
}

/// Pick the next word to quiz: the highest review score across the pool.
/// Returns `None` on an empty pool; callers surface the empty-library state
/// instead of calling this.
pub fn select_next<'a, R: Rng + ?Sized>(words: &'a [Word], rng: &mut R) -> Option<&'a Word> {
    words
        .iter()
        .map(|w| (review_score(w, rng), w))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, w)| w)
}

/// One displayed answer choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOption {
    pub text: String,
    pub is_correct: bool,
}

/// A dealt quiz round: the correct definition plus the shuffled option list.
#[derive(Debug, Clone)]
pub struct QuizRound {
    pub correct: String,
    pub options: Vec<QuizOption>,
}

/// Build the answer set for `target` from the full `pool` (which includes the
/// target): the correct definition plus up to `n - 1` unique distractor
/// definitions, preferring words that share a tag with the target. Distractor
/// candidates are compared by definition text, so two words with identical
/// definitions collapse into one option. Small pools yield fewer options
/// rather than padding or failing.
pub fn build_options<R: Rng + ?Sized>(
    target: &Word,
    pool: &[Word],
    n: usize,
    rng: &mut R,
) -> QuizRound {
    let correct = target
        .quiz_definition()
        .unwrap_or(EMPTY_DEFINITION)
        .to_string();

    let same_tag: Vec<&str> = pool
        .iter()
        .filter(|w| w.id != target.id && w.shares_tag_with(target))
        .filter_map(|w| w.quiz_definition())
        .collect();
    let any: Vec<&str> = pool
        .iter()
        .filter(|w| w.id != target.id)
        .filter_map(|w| w.quiz_definition())
        .collect();

    let wanted = n.saturating_sub(1);

    // Same-tag candidates are exhausted first; the broad pool is appended
    // only when they cannot fill the round on their own.
    let mut source = same_tag;
    if source.len() < wanted {
        source.extend(any);
    }
    source.shuffle(rng);

    let mut distractors: Vec<&str> = Vec::with_capacity(wanted);
    for text in source {
        if distractors.len() >= wanted {
            break;
        }
        if text == correct || distractors.contains(&text) {
            continue;
        }
        distractors.push(text);
    }

    let mut texts: Vec<String> = Vec::with_capacity(distractors.len() + 1);
    texts.push(correct.clone());
    texts.extend(distractors.into_iter().map(str::to_string));
    texts.shuffle(rng);

    let options = texts
        .into_iter()
        .map(|text| QuizOption {
            is_correct: text == correct,
            text,
        })
        .collect();

    QuizRound { correct, options }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sense;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn word(id: &str, def: &str, tags: &[&str]) -> Word {
        let mut w = Word::new(id.to_string(), vec![Sense::new(def.to_string())]);
        w.tags = tags.iter().map(|t| t.to_string()).collect();
        w
    }

    fn with_stats(mut w: Word, seen: u32, wrong: u32, mastery: u8) -> Word {
        w.stats.seen = seen;
        w.stats.correct = seen.saturating_sub(wrong);
        w.stats.wrong = wrong;
        w.stats.mastery = mastery;
        w
    }

    #[test]
    fn selector_returns_member_of_input() {
        let pool = vec![
            word("alpha", "甲", &[]),
            word("beta", "乙", &[]),
            word("gamma", "丙", &[]),
        ];
        let mut rng = rng();
        for _ in 0..50 {
            let picked = select_next(&pool, &mut rng).unwrap();
            assert!(pool.iter().any(|w| w.id == picked.id));
        }
    }

    #[test]
    fn selector_none_on_empty_pool() {
        assert!(select_next(&[], &mut rng()).is_none());
    }

    #[test]
    fn base_score_monotone_in_wrong() {
        let more_wrong = with_stats(word("a", "甲", &[]), 10, 7, 3).stats;
        let less_wrong = with_stats(word("b", "乙", &[]), 10, 2, 3).stats;
        assert!(base_score(&more_wrong) >= base_score(&less_wrong));
        assert_eq!(base_score(&more_wrong) - base_score(&less_wrong), 15.0);
    }

    #[test]
    fn unseen_boost_is_exactly_six() {
        let unseen = with_stats(word("a", "甲", &[]), 0, 0, 3).stats;
        let seen_once = with_stats(word("b", "乙", &[]), 1, 0, 3).stats;
        assert_eq!(base_score(&unseen) - base_score(&seen_once), 6.0);
    }

    #[test]
    fn jitter_stays_below_one() {
        let w = with_stats(word("a", "甲", &[]), 3, 1, 4);
        let base = base_score(&w.stats);
        let mut rng = rng();
        for _ in 0..200 {
            let s = review_score(&w, &mut rng);
            assert!(s >= base && s < base + 1.0);
        }
    }

    #[test]
    fn struggling_word_dominates_selection() {
        // score ≈ 12 + U for cat vs ≈ 0 + U for dog
        let cat = with_stats(word("cat", "猫", &["animal"]), 5, 4, 1);
        let dog = with_stats(word("dog", "狗", &["animal"]), 1, 0, 8);
        let pool = vec![cat, dog];

        let mut rng = rng();
        let mut cat_picked = 0;
        for _ in 0..1000 {
            if select_next(&pool, &mut rng).unwrap().id == "cat" {
                cat_picked += 1;
            }
        }
        assert!(cat_picked > 950, "cat picked only {cat_picked}/1000 times");
    }

    #[test]
    fn exactly_one_correct_option_with_target_definition() {
        let target = word("cat", "猫", &["animal"]);
        let pool = vec![
            target.clone(),
            word("dog", "狗", &["animal"]),
            word("fox", "狐狸", &["animal"]),
            word("ant", "蚂蚁", &["animal"]),
        ];
        let round = build_options(&target, &pool, 4, &mut rng());
        let correct: Vec<_> = round.options.iter().filter(|o| o.is_correct).collect();
        assert_eq!(correct.len(), 1);
        assert_eq!(correct[0].text, "猫");
        assert_eq!(round.correct, "猫");
        assert_eq!(round.options.len(), 4);
    }

    #[test]
    fn option_texts_are_unique_despite_duplicate_definitions() {
        let target = word("cat", "猫", &[]);
        // Three distinct words sharing one definition text collapse into a
        // single distractor.
        let pool = vec![
            target.clone(),
            word("hound", "狗", &[]),
            word("dog", "狗", &[]),
            word("puppy", "狗", &[]),
            word("fox", "狐狸", &[]),
        ];
        let round = build_options(&target, &pool, 4, &mut rng());
        let mut texts: Vec<&str> = round.options.iter().map(|o| o.text.as_str()).collect();
        texts.sort_unstable();
        let before = texts.len();
        texts.dedup();
        assert_eq!(texts.len(), before, "duplicate option text returned");
        assert_eq!(round.options.len(), 3); // 猫, 狗, 狐狸
    }

    #[test]
    fn single_word_pool_degrades_to_one_option() {
        let target = word("cat", "猫", &["animal"]);
        let pool = vec![target.clone()];
        let round = build_options(&target, &pool, 4, &mut rng());
        assert_eq!(round.options.len(), 1);
        assert!(round.options[0].is_correct);
    }

    #[test]
    fn small_pool_returns_fewer_options_without_padding() {
        let target = word("cat", "猫", &[]);
        let pool = vec![target.clone(), word("dog", "狗", &[])];
        let round = build_options(&target, &pool, 4, &mut rng());
        assert_eq!(round.options.len(), 2);
    }

    #[test]
    fn same_tag_distractors_preferred_when_sufficient() {
        let target = word("cat", "猫", &["animal"]);
        let tagged = ["狗", "狐狸", "蚂蚁"];
        let untagged = ["跑", "经营", "想法", "自由", "蓝色"];

        let mut pool = vec![target.clone()];
        for (i, def) in tagged.iter().enumerate() {
            pool.push(word(&format!("t{i}"), def, &["animal"]));
        }
        for (i, def) in untagged.iter().enumerate() {
            pool.push(word(&format!("u{i}"), def, &[]));
        }

        let mut rng = rng();
        for _ in 0..200 {
            let round = build_options(&target, &pool, 4, &mut rng);
            for opt in round.options.iter().filter(|o| !o.is_correct) {
                assert!(
                    tagged.contains(&opt.text.as_str()),
                    "untagged distractor {:?} leaked into a round with enough \
                     same-tag candidates",
                    opt.text
                );
            }
        }
    }

    #[test]
    fn pool_broadens_when_same_tag_candidates_run_out() {
        let target = word("cat", "猫", &["animal"]);
        let pool = vec![
            target.clone(),
            word("dog", "狗", &["animal"]),
            word("idea", "想法", &[]),
            word("blue", "蓝色", &[]),
        ];
        let round = build_options(&target, &pool, 4, &mut rng());
        assert_eq!(round.options.len(), 4);
        let texts: Vec<&str> = round.options.iter().map(|o| o.text.as_str()).collect();
        assert!(texts.contains(&"狗"));
        assert!(texts.contains(&"想法"));
        assert!(texts.contains(&"蓝色"));
    }

    #[test]
    fn target_without_definition_gets_placeholder() {
        let target = Word::new("bare".to_string(), vec![Sense::new(String::new())]);
        let pool = vec![target.clone(), word("dog", "狗", &[])];
        let round = build_options(&target, &pool, 4, &mut rng());
        assert_eq!(round.correct, "—");
        assert!(round.options.iter().any(|o| o.is_correct));
    }

    #[test]
    fn distractor_matching_correct_text_is_skipped() {
        let target = word("cat", "猫", &[]);
        let pool = vec![
            target.clone(),
            word("kitty", "猫", &[]), // same definition as the answer
            word("dog", "狗", &[]),
        ];
        let round = build_options(&target, &pool, 4, &mut rng());
        assert_eq!(
            round.options.iter().filter(|o| o.text == "猫").count(),
            1,
            "answer text must appear exactly once"
        );
    }
}
