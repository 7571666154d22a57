use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::operations::vocabulary::{
    self, next_appearance, validate_period, ScheduledReview, TierPeriods, VocabularyItem,
    MAX_BATCH_SIZE,
};
use crate::db::DatabaseProxy;
use crate::error::{ReviewError, ReviewResult};
use crate::types::{DifficultyTier, Locale};

pub const MIN_SESSION_COUNT: i64 = 10;
pub const MAX_SESSION_COUNT: i64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRequest {
    pub new_count: i64,
    pub old_count: i64,
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyCard {
    pub id: i64,
    pub text: String,
    pub phonetic: String,
    pub translation: String,
    pub example: String,
    pub example_translation: String,
    pub periods: TierPeriods,
    pub due: bool,
}

impl VocabularyCard {
    pub fn localize(item: &VocabularyItem, locale: Locale, due: bool) -> Self {
        Self {
            id: item.id,
            text: item.text.clone(),
            phonetic: item.phonetic.clone(),
            translation: item.translations.get(locale).to_string(),
            example: item.example.clone(),
            example_translation: item.example_translations.get(locale).to_string(),
            periods: item.periods,
            due,
        }
    }
}

/// A reviewed word as submitted by the client. `period` wins over
/// `difficulty`; a present `period` of 0 is rejected rather than ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordResultInput {
    #[serde(alias = "wordId")]
    pub id: i64,
    #[serde(default)]
    pub period: Option<i64>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledWord {
    pub word_id: i64,
    pub period_days: i64,
    pub next_appearance: NaiveDate,
}

#[derive(Debug, Clone, Copy)]
enum PeriodSource {
    Days(i64),
    Tier(DifficultyTier),
}

pub fn validate_session_counts(new_count: i64, old_count: i64) -> ReviewResult<()> {
    for (name, value) in [("newCount", new_count), ("oldCount", old_count)] {
        if !(MIN_SESSION_COUNT..=MAX_SESSION_COUNT).contains(&value) {
            return Err(ReviewError::validation(format!(
                "{name} must be between {MIN_SESSION_COUNT} and {MAX_SESSION_COUNT}, got {value}"
            )));
        }
    }
    Ok(())
}

/// Due words first (most overdue first), then fresh words topping the
/// session up to `new_count + old_count`.
pub async fn build_session(
    proxy: &DatabaseProxy,
    user_id: &str,
    request: SessionRequest,
    today: NaiveDate,
) -> ReviewResult<Vec<VocabularyCard>> {
    validate_session_counts(request.new_count, request.old_count)?;

    let pool = proxy.pool();
    let due_ids = vocabulary::get_due(pool, user_id, request.old_count, today).await?;
    let due_count = i64::try_from(due_ids.len()).unwrap_or(request.old_count);
    let fresh_target = request.new_count + (request.old_count - due_count).max(0);
    let fresh_ids =
        vocabulary::select_fresh_word_ids(pool, user_id, &due_ids, fresh_target).await?;

    let due_set: HashSet<i64> = due_ids.iter().copied().collect();
    let mut seen = HashSet::with_capacity(due_ids.len() + fresh_ids.len());
    let ordered: Vec<i64> = due_ids
        .iter()
        .chain(fresh_ids.iter())
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let items: HashMap<i64, VocabularyItem> = vocabulary::get_words_by_ids(pool, &ordered)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    let cards: Vec<VocabularyCard> = ordered
        .iter()
        .filter_map(|id| items.get(id))
        .map(|item| VocabularyCard::localize(item, request.locale, due_set.contains(&item.id)))
        .collect();

    tracing::info!(
        user_id,
        due = due_ids.len(),
        fresh = fresh_ids.len(),
        locale = %request.locale,
        "vocabulary session built"
    );

    Ok(cards)
}

/// Resolves every result to a concrete period and reschedules the batch.
pub async fn submit_word_results(
    proxy: &DatabaseProxy,
    user_id: &str,
    results: &[WordResultInput],
    today: NaiveDate,
) -> ReviewResult<Vec<ScheduledWord>> {
    if results.is_empty() {
        return Err(ReviewError::validation("results must be a non-empty array"));
    }
    if results.len() > MAX_BATCH_SIZE {
        return Err(ReviewError::validation(format!(
            "results exceed maximum batch size of {MAX_BATCH_SIZE}"
        )));
    }

    let mut requested = Vec::with_capacity(results.len());
    for result in results {
        let tier = result
            .difficulty
            .as_deref()
            .map(str::parse::<DifficultyTier>)
            .transpose()?;
        let source = match (result.period, tier) {
            (Some(period), _) => {
                validate_period(result.id, period)?;
                PeriodSource::Days(period)
            }
            (None, Some(tier)) => PeriodSource::Tier(tier),
            (None, None) => {
                return Err(ReviewError::validation(format!(
                    "word {} needs either a period or a difficulty",
                    result.id
                )))
            }
        };
        requested.push((result.id, source));
    }

    let mut unique_ids: Vec<i64> = requested.iter().map(|(id, _)| *id).collect();
    unique_ids.sort_unstable();
    unique_ids.dedup();

    let words: HashMap<i64, TierPeriods> = vocabulary::get_words_by_ids(proxy.pool(), &unique_ids)
        .await?
        .into_iter()
        .map(|item| (item.id, item.periods))
        .collect();
    let missing: Vec<i64> = unique_ids
        .iter()
        .copied()
        .filter(|id| !words.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(ReviewError::not_found(format!("unknown word ids: {missing:?}")));
    }

    // last result for a word wins, first-seen order is kept
    let mut order: Vec<i64> = Vec::new();
    let mut periods: HashMap<i64, i64> = HashMap::new();
    for (word_id, source) in requested {
        let days = match source {
            PeriodSource::Days(days) => days,
            PeriodSource::Tier(tier) => words[&word_id].get(tier),
        };
        if periods.insert(word_id, days).is_none() {
            order.push(word_id);
        }
    }

    let batch: Vec<ScheduledReview> = order
        .iter()
        .map(|word_id| ScheduledReview {
            word_id: *word_id,
            period_days: periods[word_id],
        })
        .collect();

    vocabulary::upsert_results(proxy.pool(), user_id, &batch, today).await?;

    let scheduled = batch
        .iter()
        .map(|review| {
            Ok(ScheduledWord {
                word_id: review.word_id,
                period_days: review.period_days,
                next_appearance: next_appearance(today, review.period_days)?,
            })
        })
        .collect::<ReviewResult<Vec<_>>>()?;

    tracing::info!(user_id, words = scheduled.len(), "vocabulary results recorded");
    Ok(scheduled)
}
