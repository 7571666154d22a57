use std::cmp::Ordering;
use std::collections::HashSet;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;

use crate::db::operations::characters::{self, RankedCandidate};
use crate::db::DatabaseProxy;
use crate::error::{ReviewError, ReviewResult};
use crate::types::{Locale, Script, Skill};

pub const DEFAULT_TEST_SIZE: i64 = 10;
pub const MAX_TEST_SIZE: i64 = 100;
pub const DISTRACTOR_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestRequest {
    pub script: Script,
    pub skill: Skill,
    pub locale: Locale,
    pub count: Option<i64>,
}

/// One question of a character test.
///
/// Reading items show `reading` and ask for `glyph` among `options`;
/// listening items play `audio` instead. Writing items show `glyph` and expect
/// `reading`, so `distractors` and `options` stay empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterTestItem {
    pub character_id: i64,
    pub script: Script,
    pub skill: Skill,
    pub glyph: String,
    pub reading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    pub distractors: Vec<String>,
    pub options: Vec<String>,
    pub previously_tested: bool,
}

pub fn resolve_test_size(count: Option<i64>) -> ReviewResult<usize> {
    let size = count.unwrap_or(DEFAULT_TEST_SIZE);
    if size <= 0 {
        return Err(ReviewError::validation(format!(
            "count must be a positive number, got {size}"
        )));
    }
    if size > MAX_TEST_SIZE {
        return Err(ReviewError::validation(format!(
            "count must not exceed {MAX_TEST_SIZE}, got {size}"
        )));
    }
    Ok(size as usize)
}

/// Never-tested characters first, then the weakest ones. Ties and the order
/// inside the untested group are random.
pub fn rank_candidates<R: Rng + ?Sized>(
    candidates: Vec<RankedCandidate>,
    count: usize,
    rng: &mut R,
) -> Vec<RankedCandidate> {
    let (mut untested, mut tested): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|c| c.score.is_none());

    untested.shuffle(rng);
    if untested.len() >= count {
        untested.truncate(count);
        return untested;
    }

    // shuffle first so the stable sort leaves equal scores in random order
    tested.shuffle(rng);
    tested.sort_by(|a, b| {
        let left = a.score.unwrap_or(0.0);
        let right = b.score.unwrap_or(0.0);
        left.partial_cmp(&right).unwrap_or(Ordering::Equal)
    });

    let remaining = count - untested.len();
    untested.extend(tested.into_iter().take(remaining));
    untested
}

/// Up to `amount` distinct glyphs from `pool`, none equal to `correct`.
pub fn pick_distractors<R: Rng + ?Sized>(
    correct: &str,
    pool: &[&str],
    amount: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let eligible: Vec<&str> = pool
        .iter()
        .copied()
        .filter(|glyph| *glyph != correct && seen.insert(*glyph))
        .collect();

    eligible
        .choose_multiple(rng, amount)
        .map(|glyph| glyph.to_string())
        .collect()
}

fn to_item<R: Rng + ?Sized>(
    candidate: &RankedCandidate,
    request: &TestRequest,
    glyph_pool: &[&str],
    rng: &mut R,
) -> CharacterTestItem {
    let character = &candidate.character;
    let glyph = character.glyph(request.script).to_string();

    let (distractors, options) = if request.skill.uses_distractors() {
        let distractors = pick_distractors(&glyph, glyph_pool, DISTRACTOR_COUNT, rng);
        let mut options = distractors.clone();
        options.push(glyph.clone());
        options.shuffle(rng);
        (distractors, options)
    } else {
        (Vec::new(), Vec::new())
    };

    CharacterTestItem {
        character_id: character.id,
        script: request.script,
        skill: request.skill,
        reading: character.reading(request.locale).to_string(),
        audio: match request.skill {
            Skill::Listening => character.audio.clone(),
            _ => None,
        },
        glyph,
        distractors,
        options,
        previously_tested: candidate.score.is_some(),
    }
}

pub async fn build_test(
    proxy: &DatabaseProxy,
    user_id: &str,
    request: TestRequest,
) -> ReviewResult<Vec<CharacterTestItem>> {
    let size = resolve_test_size(request.count)?;

    let candidates =
        characters::list_ranked_candidates(proxy.pool(), user_id, request.script, request.skill)
            .await?;

    let glyphs: Vec<String> = candidates
        .iter()
        .map(|c| c.character.glyph(request.script).to_string())
        .collect();
    let glyph_pool: Vec<&str> = glyphs.iter().map(String::as_str).collect();

    let mut rng = rand::rng();
    let ranked = rank_candidates(candidates, size, &mut rng);
    let items: Vec<CharacterTestItem> = ranked
        .iter()
        .map(|candidate| to_item(candidate, &request, &glyph_pool, &mut rng))
        .collect();

    tracing::info!(
        user_id,
        script = %request.script,
        skill = %request.skill,
        requested = size,
        returned = items.len(),
        untested = items.iter().filter(|i| !i.previously_tested).count(),
        "character test built"
    );

    Ok(items)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::db::operations::characters::Character;

    fn candidate(id: i64, score: Option<f64>) -> RankedCandidate {
        RankedCandidate {
            character: Character {
                id,
                consonant: String::new(),
                vowel: String::new(),
                hiragana: format!("h{id}"),
                katakana: format!("k{id}"),
                reading_en: format!("r{id}"),
                reading_ru: format!("р{id}"),
                audio: None,
            },
            score,
        }
    }

    #[test]
    fn test_resolve_test_size() {
        assert_eq!(resolve_test_size(None).unwrap(), 10);
        assert_eq!(resolve_test_size(Some(3)).unwrap(), 3);
        assert!(resolve_test_size(Some(0)).unwrap_err().is_validation());
        assert!(resolve_test_size(Some(-4)).unwrap_err().is_validation());
        assert!(resolve_test_size(Some(101)).is_err());
    }

    #[test]
    fn test_untested_first_then_weakest() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates = vec![
            candidate(1, Some(0.9)),
            candidate(2, None),
            candidate(3, Some(0.1)),
            candidate(4, Some(0.5)),
            candidate(5, None),
        ];

        let ranked = rank_candidates(candidates, 4, &mut rng);
        let ids: Vec<i64> = ranked.iter().map(|c| c.character.id).collect();

        assert_eq!(ids.len(), 4);
        let head: HashSet<i64> = ids[..2].iter().copied().collect();
        assert_eq!(head, HashSet::from([2, 5]));
        assert_eq!(&ids[2..], &[3, 4]);
    }

    #[test]
    fn test_rank_only_untested_when_enough() {
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = vec![candidate(1, Some(0.0)), candidate(2, None), candidate(3, None)];
        let ranked = rank_candidates(candidates, 2, &mut rng);
        assert!(ranked.iter().all(|c| c.score.is_none()));
    }

    #[test]
    fn test_rank_returns_fewer_when_pool_is_small() {
        let mut rng = StdRng::seed_from_u64(3);
        let ranked = rank_candidates(vec![candidate(1, Some(0.2))], 10, &mut rng);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_tied_scores_are_randomised() {
        let mut orders = HashSet::new();
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let candidates = (1..=4).map(|id| candidate(id, Some(0.3))).collect();
            let ranked = rank_candidates(candidates, 4, &mut rng);
            orders.insert(ranked.iter().map(|c| c.character.id).collect::<Vec<_>>());
        }
        assert!(orders.len() > 1);
    }

    #[test]
    fn test_distractors_exclude_correct_and_repeat() {
        let pool = ["あ", "い", "う", "あ", "い", "え"];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = pick_distractors("あ", &pool, 2, &mut rng);
            assert_eq!(picked.len(), 2);
            assert!(!picked.iter().any(|g| g == "あ"));
            assert_ne!(picked[0], picked[1]);
        }
    }

    #[test]
    fn test_distractors_with_tiny_pool() {
        let mut rng = StdRng::seed_from_u64(0);
        let picked = pick_distractors("あ", &["あ", "い"], 2, &mut rng);
        assert_eq!(picked, vec!["い".to_string()]);
    }

    #[test]
    fn test_writing_item_has_no_options() {
        let mut rng = StdRng::seed_from_u64(0);
        let request = TestRequest {
            script: Script::Katakana,
            skill: Skill::Writing,
            locale: Locale::En,
            count: None,
        };
        let item = to_item(&candidate(9, None), &request, &["k1", "k2", "k9"], &mut rng);
        assert_eq!(item.glyph, "k9");
        assert_eq!(item.reading, "r9");
        assert!(item.distractors.is_empty());
        assert!(item.options.is_empty());
    }

    #[test]
    fn test_reading_item_options_contain_answer() {
        let mut rng = StdRng::seed_from_u64(0);
        let request = TestRequest {
            script: Script::Hiragana,
            skill: Skill::Reading,
            locale: Locale::Ru,
            count: None,
        };
        let item = to_item(&candidate(1, Some(0.4)), &request, &["h1", "h2", "h3", "h4"], &mut rng);
        assert_eq!(item.options.len(), 3);
        assert!(item.options.contains(&"h1".to_string()));
        assert_eq!(item.reading, "р1");
        assert!(item.previously_tested);
    }
}
