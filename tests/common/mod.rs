#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use tempfile::TempDir;

use kotoba_review::db::DatabaseProxy;
use kotoba_review::services::test_results::IngestionPolicy;
use kotoba_review::state::AppState;

pub const MAINTENANCE_TOKEN: &str = "test-maintenance-token";

pub struct TestStore {
    pub proxy: Arc<DatabaseProxy>,
    _dir: TempDir,
}

impl TestStore {
    pub fn proxy(&self) -> &DatabaseProxy {
        &self.proxy
    }
}

pub async fn create_store() -> TestStore {
    let dir = TempDir::new().expect("failed to create temp dir");
    let proxy = DatabaseProxy::connect(dir.path().join("review.db"))
        .await
        .expect("failed to open store");
    TestStore {
        proxy: Arc::new(proxy),
        _dir: dir,
    }
}

pub async fn create_seeded_store() -> TestStore {
    let store = create_store().await;
    kotoba_review::seed::seed_content(store.proxy())
        .await
        .expect("seed failed");
    store
}

pub fn create_test_app(store: &TestStore) -> Router {
    let state = AppState::new(Arc::clone(&store.proxy), IngestionPolicy::default())
        .with_maintenance_token(Some(MAINTENANCE_TOKEN.to_string()));
    kotoba_review::create_app(state)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Inserts words `1..=count` with tier periods 7/3/2/1.
pub async fn insert_words(proxy: &DatabaseProxy, count: i64) {
    for id in 1..=count {
        sqlx::query(
            r#"
            INSERT INTO "words"
              ("id","text","phonetic","translationEn","translationRu","translationDe",
               "example","exampleEn","exampleRu","exampleDe",
               "periodEasy","periodNormal","periodHard","periodExtraHard")
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 7, 3, 2, 1)
            "#,
        )
        .bind(id)
        .bind(format!("語{id}"))
        .bind(format!("ご{id}"))
        .bind(format!("word {id}"))
        .bind(format!("слово {id}"))
        .bind(format!("Wort {id}"))
        .bind(format!("例{id}"))
        .bind(format!("example {id}"))
        .bind(format!("пример {id}"))
        .bind(format!("Beispiel {id}"))
        .execute(proxy.pool())
        .await
        .expect("insert word");
    }
}

pub async fn insert_character(
    proxy: &DatabaseProxy,
    id: i64,
    hiragana: &str,
    katakana: &str,
    audio: Option<&str>,
) {
    sqlx::query(
        r#"
        INSERT INTO "characters"
          ("id","consonant","vowel","hiragana","katakana","readingEn","readingRu","audio")
        VALUES (?, '', '', ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(hiragana)
    .bind(katakana)
    .bind(format!("r{id}"))
    .bind(format!("р{id}"))
    .bind(audio)
    .execute(proxy.pool())
    .await
    .expect("insert character");
}

pub async fn count_rows(proxy: &DatabaseProxy, table: &str) -> i64 {
    let sql = format!(r#"SELECT COUNT(*) FROM "{table}""#);
    sqlx::query_scalar(&sql)
        .fetch_one(proxy.pool())
        .await
        .expect("count rows")
}
