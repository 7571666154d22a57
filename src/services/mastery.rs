use serde::Serialize;

use crate::db::operations::characters::{self, MasteryHistoryEntry};
use crate::db::DatabaseProxy;
use crate::error::ReviewResult;
use crate::types::{Script, Skill};

/// History row with untested pairs reported as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryHistoryView {
    pub character_id: i64,
    pub hiragana: String,
    pub katakana: String,
    pub hiragana_reading: f64,
    pub hiragana_writing: f64,
    pub hiragana_listening: f64,
    pub katakana_reading: f64,
    pub katakana_writing: f64,
    pub katakana_listening: f64,
}

impl From<MasteryHistoryEntry> for MasteryHistoryView {
    fn from(entry: MasteryHistoryEntry) -> Self {
        let s = entry.scores;
        Self {
            character_id: entry.character_id,
            hiragana: entry.hiragana,
            katakana: entry.katakana,
            hiragana_reading: s.score(Script::Hiragana, Skill::Reading),
            hiragana_writing: s.score(Script::Hiragana, Skill::Writing),
            hiragana_listening: s.score(Script::Hiragana, Skill::Listening),
            katakana_reading: s.score(Script::Katakana, Skill::Reading),
            katakana_writing: s.score(Script::Katakana, Skill::Writing),
            katakana_listening: s.score(Script::Katakana, Skill::Listening),
        }
    }
}

pub async fn user_history(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> ReviewResult<Vec<MasteryHistoryView>> {
    let entries = characters::get_user_history(proxy.pool(), user_id).await?;
    Ok(entries.into_iter().map(MasteryHistoryView::from).collect())
}
