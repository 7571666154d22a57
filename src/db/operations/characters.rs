use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::error::{ReviewError, ReviewResult};
use crate::types::{Locale, Script, Skill};

pub const MAX_BATCH_SIZE: usize = 500;
pub const DECAY_STEP: f64 = 0.01;

const CHARACTER_COLUMNS: &str =
    r#"c."id",c."consonant",c."vowel",c."hiragana",c."katakana",c."readingEn",c."readingRu",c."audio""#;

const SCORE_COLUMNS: [&str; 6] = [
    "hiraganaReading",
    "hiraganaWriting",
    "hiraganaListening",
    "katakanaReading",
    "katakanaWriting",
    "katakanaListening",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: i64,
    pub consonant: String,
    pub vowel: String,
    pub hiragana: String,
    pub katakana: String,
    pub reading_en: String,
    pub reading_ru: String,
    pub audio: Option<String>,
}

impl Character {
    pub fn glyph(&self, script: Script) -> &str {
        match script {
            Script::Hiragana => &self.hiragana,
            Script::Katakana => &self.katakana,
        }
    }

    pub fn reading(&self, locale: Locale) -> &str {
        match locale.for_characters() {
            Locale::Ru => &self.reading_ru,
            _ => &self.reading_en,
        }
    }

    pub fn has_audio(&self) -> bool {
        self.audio.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

/// The six per-character scores. `None` means the pair was never tested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryScores {
    pub hiragana_reading: Option<f64>,
    pub hiragana_writing: Option<f64>,
    pub hiragana_listening: Option<f64>,
    pub katakana_reading: Option<f64>,
    pub katakana_writing: Option<f64>,
    pub katakana_listening: Option<f64>,
}

impl MasteryScores {
    fn slot(&mut self, script: Script, skill: Skill) -> &mut Option<f64> {
        match (script, skill) {
            (Script::Hiragana, Skill::Reading) => &mut self.hiragana_reading,
            (Script::Hiragana, Skill::Writing) => &mut self.hiragana_writing,
            (Script::Hiragana, Skill::Listening) => &mut self.hiragana_listening,
            (Script::Katakana, Skill::Reading) => &mut self.katakana_reading,
            (Script::Katakana, Skill::Writing) => &mut self.katakana_writing,
            (Script::Katakana, Skill::Listening) => &mut self.katakana_listening,
        }
    }

    pub fn get(&self, script: Script, skill: Skill) -> Option<f64> {
        match (script, skill) {
            (Script::Hiragana, Skill::Reading) => self.hiragana_reading,
            (Script::Hiragana, Skill::Writing) => self.hiragana_writing,
            (Script::Hiragana, Skill::Listening) => self.hiragana_listening,
            (Script::Katakana, Skill::Reading) => self.katakana_reading,
            (Script::Katakana, Skill::Writing) => self.katakana_writing,
            (Script::Katakana, Skill::Listening) => self.katakana_listening,
        }
    }

    /// Score with "never tested" read as zero.
    pub fn score(&self, script: Script, skill: Skill) -> f64 {
        self.get(script, skill).unwrap_or(0.0)
    }

    pub fn set(&mut self, script: Script, skill: Skill, value: f64) {
        *self.slot(script, skill) = Some(clamp_score(value));
    }

    fn as_array(&self) -> [Option<f64>; 6] {
        [
            self.hiragana_reading,
            self.hiragana_writing,
            self.hiragana_listening,
            self.katakana_reading,
            self.katakana_writing,
            self.katakana_listening,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterMasteryRecord {
    pub user_id: String,
    pub character_id: i64,
    pub scores: MasteryScores,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryHistoryEntry {
    pub character_id: i64,
    pub hiragana: String,
    pub katakana: String,
    pub scores: MasteryScores,
}

/// A character together with the caller's score for one (script, skill) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub character: Character,
    pub score: Option<f64>,
}

pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Column holding the score for one (script, skill) pair.
pub fn mastery_column(script: Script, skill: Skill) -> &'static str {
    match (script, skill) {
        (Script::Hiragana, Skill::Reading) => SCORE_COLUMNS[0],
        (Script::Hiragana, Skill::Writing) => SCORE_COLUMNS[1],
        (Script::Hiragana, Skill::Listening) => SCORE_COLUMNS[2],
        (Script::Katakana, Skill::Reading) => SCORE_COLUMNS[3],
        (Script::Katakana, Skill::Writing) => SCORE_COLUMNS[4],
        (Script::Katakana, Skill::Listening) => SCORE_COLUMNS[5],
    }
}

pub async fn get_character(pool: &SqlitePool, id: i64) -> ReviewResult<Option<Character>> {
    let sql = format!(r#"SELECT {CHARACTER_COLUMNS} FROM "characters" c WHERE c."id" = ? LIMIT 1"#);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.map(|row| map_character_row(&row).map_err(ReviewError::from))
        .transpose()
}

/// Ids from `ids` that exist in the character table.
pub async fn existing_character_ids(pool: &SqlitePool, ids: &[i64]) -> ReviewResult<Vec<i64>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(r#"SELECT "id" FROM "characters" WHERE "id" IN ("#);
    {
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
    }
    qb.push(")");

    Ok(qb.build_query_scalar::<i64>().fetch_all(pool).await?)
}

/// Every character eligible for a test, joined with the user's score for
/// `(script, skill)`. Listening restricts the pool to characters with audio.
pub async fn list_ranked_candidates(
    pool: &SqlitePool,
    user_id: &str,
    script: Script,
    skill: Skill,
) -> ReviewResult<Vec<RankedCandidate>> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
    qb.push(CHARACTER_COLUMNS);
    qb.push(r#", m.""#);
    qb.push(mastery_column(script, skill));
    qb.push(
        r#"" AS "score" FROM "characters" c
        LEFT JOIN "character_mastery" m ON m."characterId" = c."id" AND m."userId" = "#,
    );
    qb.push_bind(user_id.to_string());
    if skill == Skill::Listening {
        qb.push(r#" WHERE c."audio" IS NOT NULL AND TRIM(c."audio") <> ''"#);
    }
    qb.push(r#" ORDER BY c."id" ASC"#);

    let rows = qb.build().fetch_all(pool).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        out.push(RankedCandidate {
            character: map_character_row(row)?,
            score: row.try_get::<Option<f64>, _>("score")?,
        });
    }
    Ok(out)
}

/// Existing records for `character_ids`; ids without a row are absent.
pub async fn get_scores(
    pool: &SqlitePool,
    user_id: &str,
    character_ids: &[i64],
) -> ReviewResult<HashMap<i64, CharacterMasteryRecord>> {
    if character_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        r#"SELECT "userId","characterId","hiraganaReading","hiraganaWriting","hiraganaListening",
          "katakanaReading","katakanaWriting","katakanaListening"
        FROM "character_mastery"
        WHERE "userId" = "#,
    );
    qb.push_bind(user_id.to_string());
    qb.push(r#" AND "characterId" IN ("#);
    {
        let mut sep = qb.separated(", ");
        for id in character_ids {
            sep.push_bind(*id);
        }
    }
    qb.push(")");

    let rows = qb.build().fetch_all(pool).await?;
    let mut out = HashMap::with_capacity(rows.len());
    for row in &rows {
        let record = CharacterMasteryRecord {
            user_id: row.try_get("userId")?,
            character_id: row.try_get("characterId")?,
            scores: map_scores(row)?,
        };
        out.insert(record.character_id, record);
    }
    Ok(out)
}

pub async fn get_user_history(
    pool: &SqlitePool,
    user_id: &str,
) -> ReviewResult<Vec<MasteryHistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT m."characterId", c."hiragana", c."katakana",
          m."hiraganaReading", m."hiraganaWriting", m."hiraganaListening",
          m."katakanaReading", m."katakanaWriting", m."katakanaListening"
        FROM "character_mastery" m
        JOIN "characters" c ON c."id" = m."characterId"
        WHERE m."userId" = ?
        ORDER BY m."characterId" ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        out.push(MasteryHistoryEntry {
            character_id: row.try_get("characterId")?,
            hiragana: row.try_get("hiragana")?,
            katakana: row.try_get("katakana")?,
            scores: map_scores(row)?,
        });
    }
    Ok(out)
}

/// Batched create-or-merge. Fields left as `None` keep their stored value.
pub async fn upsert_mastery(
    pool: &SqlitePool,
    records: &[CharacterMasteryRecord],
) -> ReviewResult<u64> {
    if records.is_empty() {
        return Err(ReviewError::validation("mastery records must be a non-empty array"));
    }
    if records.len() > MAX_BATCH_SIZE {
        return Err(ReviewError::validation(format!(
            "mastery records exceed maximum batch size of {MAX_BATCH_SIZE}"
        )));
    }

    let now = Utc::now().naive_utc();
    let mut qb = QueryBuilder::<Sqlite>::new(r#"INSERT INTO "character_mastery" ("userId","characterId""#);
    for column in SCORE_COLUMNS {
        qb.push(r#",""#);
        qb.push(column);
        qb.push(r#"""#);
    }
    qb.push(r#","createdAt","updatedAt") "#);

    qb.push_values(records.iter(), |mut row, record| {
        row.push_bind(record.user_id.clone())
            .push_bind(record.character_id);
        for score in record.scores.as_array() {
            row.push_bind(score.map(clamp_score));
        }
        row.push_bind(now).push_bind(now);
    });

    qb.push(r#" ON CONFLICT ("userId","characterId") DO UPDATE SET "updatedAt" = excluded."updatedAt""#);
    for column in SCORE_COLUMNS {
        qb.push(r#", ""#);
        qb.push(column);
        qb.push(r#"" = COALESCE(excluded.""#);
        qb.push(column);
        qb.push(r#"", "character_mastery".""#);
        qb.push(column);
        qb.push(r#"")"#);
    }

    let mut tx = pool.begin().await?;
    let affected = qb.build().execute(&mut *tx).await?.rows_affected();
    tx.commit().await?;

    tracing::debug!(rows = affected, "character mastery records upserted");
    Ok(affected)
}

/// Lowers every tested score of `user_id` by [`DECAY_STEP`], floored at zero.
pub async fn decay(pool: &SqlitePool, user_id: &str) -> ReviewResult<u64> {
    let mut qb = QueryBuilder::<Sqlite>::new(r#"UPDATE "character_mastery" SET "updatedAt" = "#);
    qb.push_bind(Utc::now().naive_utc());
    for column in SCORE_COLUMNS {
        // multi-argument MAX yields NULL for NULL input, so untested stays untested
        qb.push(r#", ""#);
        qb.push(column);
        qb.push(r#"" = MAX(0.0, ""#);
        qb.push(column);
        qb.push(r#"" - "#);
        qb.push_bind(DECAY_STEP);
        qb.push(")");
    }
    qb.push(r#" WHERE "userId" = "#);
    qb.push_bind(user_id.to_string());

    let mut tx = pool.begin().await?;
    let affected = qb.build().execute(&mut *tx).await?.rows_affected();
    tx.commit().await?;

    Ok(affected)
}

fn map_character_row(row: &SqliteRow) -> Result<Character, sqlx::Error> {
    Ok(Character {
        id: row.try_get("id")?,
        consonant: row.try_get("consonant")?,
        vowel: row.try_get("vowel")?,
        hiragana: row.try_get("hiragana")?,
        katakana: row.try_get("katakana")?,
        reading_en: row.try_get("readingEn")?,
        reading_ru: row.try_get("readingRu")?,
        audio: row.try_get("audio")?,
    })
}

fn map_scores(row: &SqliteRow) -> Result<MasteryScores, sqlx::Error> {
    Ok(MasteryScores {
        hiragana_reading: row.try_get("hiraganaReading")?,
        hiragana_writing: row.try_get("hiraganaWriting")?,
        hiragana_listening: row.try_get("hiraganaListening")?,
        katakana_reading: row.try_get("katakanaReading")?,
        katakana_writing: row.try_get("katakanaWriting")?,
        katakana_listening: row.try_get("katakanaListening")?,
    })
}
