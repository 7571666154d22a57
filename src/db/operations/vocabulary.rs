use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::error::{ReviewError, ReviewResult};
use crate::types::{DifficultyTier, Locale};

pub const MIN_PERIOD_DAYS: i64 = 1;
pub const MAX_PERIOD_DAYS: i64 = 30;
pub const MAX_BATCH_SIZE: usize = 500;

const WORD_COLUMNS: &str = r#""id","text","phonetic","translationEn","translationRu","translationDe",
  "example","exampleEn","exampleRu","exampleDe",
  "periodEasy","periodNormal","periodHard","periodExtraHard""#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyReviewRecord {
    pub user_id: String,
    pub word_id: i64,
    pub next_appearance: NaiveDate,
    pub created_on: NaiveDate,
}

/// One reviewed word and the number of days until it is due again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledReview {
    pub word_id: i64,
    pub period_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText {
    pub en: String,
    pub ru: String,
    pub de: String,
}

impl LocalizedText {
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Ru => &self.ru,
            Locale::De => &self.de,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPeriods {
    pub easy: i64,
    pub normal: i64,
    pub hard: i64,
    pub extra_hard: i64,
}

impl TierPeriods {
    pub fn get(&self, tier: DifficultyTier) -> i64 {
        match tier {
            DifficultyTier::Easy => self.easy,
            DifficultyTier::Normal => self.normal,
            DifficultyTier::Hard => self.hard,
            DifficultyTier::ExtraHard => self.extra_hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyItem {
    pub id: i64,
    pub text: String,
    pub phonetic: String,
    pub translations: LocalizedText,
    pub example: String,
    pub example_translations: LocalizedText,
    pub periods: TierPeriods,
}

pub fn validate_period(word_id: i64, period: i64) -> ReviewResult<()> {
    if !(MIN_PERIOD_DAYS..=MAX_PERIOD_DAYS).contains(&period) {
        return Err(ReviewError::validation(format!(
            "period for word {word_id} must be between {MIN_PERIOD_DAYS} and {MAX_PERIOD_DAYS} days, got {period}"
        )));
    }
    Ok(())
}

pub fn next_appearance(today: NaiveDate, period_days: i64) -> ReviewResult<NaiveDate> {
    let days = u64::try_from(period_days)
        .map_err(|_| ReviewError::validation(format!("negative period {period_days}")))?;
    today
        .checked_add_days(Days::new(days))
        .ok_or_else(|| ReviewError::validation(format!("period {period_days} overflows the calendar")))
}

/// Word ids due on or before `today`, most overdue first.
pub async fn get_due(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    today: NaiveDate,
) -> ReviewResult<Vec<i64>> {
    if limit <= 0 {
        return Ok(Vec::new());
    }

    let ids = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT "wordId" FROM "vocabulary_reviews"
        WHERE "userId" = ? AND "nextAppearance" <= ?
        ORDER BY "nextAppearance" ASC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(today)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Sets `nextAppearance = today + period` for every result in one transaction.
pub async fn upsert_results(
    pool: &SqlitePool,
    user_id: &str,
    results: &[ScheduledReview],
    today: NaiveDate,
) -> ReviewResult<u64> {
    if results.is_empty() {
        return Err(ReviewError::validation("results must be a non-empty array"));
    }
    if results.len() > MAX_BATCH_SIZE {
        return Err(ReviewError::validation(format!(
            "results exceed maximum batch size of {MAX_BATCH_SIZE}"
        )));
    }

    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        validate_period(result.word_id, result.period_days)?;
        rows.push((result.word_id, next_appearance(today, result.period_days)?));
    }

    let now = Utc::now().naive_utc();
    let mut qb = QueryBuilder::<Sqlite>::new(
        r#"INSERT INTO "vocabulary_reviews" ("userId","wordId","nextAppearance","createdOn","updatedAt") "#,
    );
    qb.push_values(rows.iter(), |mut row, (word_id, next)| {
        row.push_bind(user_id.to_string())
            .push_bind(*word_id)
            .push_bind(*next)
            .push_bind(today)
            .push_bind(now);
    });
    qb.push(
        r#" ON CONFLICT ("userId","wordId") DO UPDATE SET
            "nextAppearance" = excluded."nextAppearance",
            "updatedAt" = excluded."updatedAt""#,
    );

    let mut tx = pool.begin().await?;
    let affected = qb.build().execute(&mut *tx).await?.rows_affected();
    tx.commit().await?;

    tracing::debug!(user_id, rows = affected, "vocabulary review records upserted");
    Ok(affected)
}

/// Up to `count` word ids outside `exclude`: never-reviewed words first, then
/// the remaining words, each group in random order.
pub async fn select_fresh_word_ids(
    pool: &SqlitePool,
    user_id: &str,
    exclude: &[i64],
    count: i64,
) -> ReviewResult<Vec<i64>> {
    if count <= 0 {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        r#"SELECT w."id" FROM "words" w
        LEFT JOIN "vocabulary_reviews" r ON r."wordId" = w."id" AND r."userId" = "#,
    );
    qb.push_bind(user_id.to_string());
    if !exclude.is_empty() {
        qb.push(r#" WHERE w."id" NOT IN ("#);
        let mut sep = qb.separated(", ");
        for id in exclude {
            sep.push_bind(*id);
        }
        sep.push_unseparated(")");
    }
    qb.push(r#" ORDER BY (r."wordId" IS NOT NULL) ASC, RANDOM() LIMIT "#);
    qb.push_bind(count);

    let ids = qb.build_query_scalar::<i64>().fetch_all(pool).await?;
    Ok(ids)
}

/// Loads the requested words in storage order; missing ids are skipped.
pub async fn get_words_by_ids(pool: &SqlitePool, ids: &[i64]) -> ReviewResult<Vec<VocabularyItem>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
    qb.push(WORD_COLUMNS);
    qb.push(r#" FROM "words" WHERE "id" IN ("#);
    {
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
    }
    qb.push(")");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter()
        .map(|row| map_word_row(row).map_err(ReviewError::from))
        .collect()
}

pub async fn get_word(pool: &SqlitePool, id: i64) -> ReviewResult<Option<VocabularyItem>> {
    let sql = format!(r#"SELECT {WORD_COLUMNS} FROM "words" WHERE "id" = ? LIMIT 1"#);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.map(|row| map_word_row(&row).map_err(ReviewError::from))
        .transpose()
}

pub async fn get_review_record(
    pool: &SqlitePool,
    user_id: &str,
    word_id: i64,
) -> ReviewResult<Option<VocabularyReviewRecord>> {
    let row = sqlx::query(
        r#"
        SELECT "userId","wordId","nextAppearance","createdOn"
        FROM "vocabulary_reviews"
        WHERE "userId" = ? AND "wordId" = ?
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(word_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    Ok(Some(VocabularyReviewRecord {
        user_id: row.try_get("userId")?,
        word_id: row.try_get("wordId")?,
        next_appearance: row.try_get("nextAppearance")?,
        created_on: row.try_get("createdOn")?,
    }))
}

fn map_word_row(row: &SqliteRow) -> Result<VocabularyItem, sqlx::Error> {
    Ok(VocabularyItem {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        phonetic: row.try_get("phonetic")?,
        translations: LocalizedText {
            en: row.try_get("translationEn")?,
            ru: row.try_get("translationRu")?,
            de: row.try_get("translationDe")?,
        },
        example: row.try_get("example")?,
        example_translations: LocalizedText {
            en: row.try_get("exampleEn")?,
            ru: row.try_get("exampleRu")?,
            de: row.try_get("exampleDe")?,
        },
        periods: TierPeriods {
            easy: row.try_get("periodEasy")?,
            normal: row.try_get("periodNormal")?,
            hard: row.try_get("periodHard")?,
            extra_hard: row.try_get("periodExtraHard")?,
        },
    })
}
