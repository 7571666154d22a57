use serde::Serialize;

use crate::db::operations::{characters, vocabulary};
use crate::db::DatabaseProxy;
use crate::error::{ReviewError, ReviewResult};
use crate::services::vocabulary_session::VocabularyCard;
use crate::types::Locale;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterView {
    pub id: i64,
    pub consonant: String,
    pub vowel: String,
    pub hiragana: String,
    pub katakana: String,
    pub reading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

pub async fn get_word(proxy: &DatabaseProxy, id: i64, locale: Locale) -> ReviewResult<VocabularyCard> {
    let item = vocabulary::get_word(proxy.pool(), id)
        .await?
        .ok_or_else(|| ReviewError::not_found(format!("word {id} does not exist")))?;
    Ok(VocabularyCard::localize(&item, locale, false))
}

pub async fn get_character(
    proxy: &DatabaseProxy,
    id: i64,
    locale: Locale,
) -> ReviewResult<CharacterView> {
    let character = characters::get_character(proxy.pool(), id)
        .await?
        .ok_or_else(|| ReviewError::not_found(format!("character {id} does not exist")))?;

    Ok(CharacterView {
        id: character.id,
        reading: character.reading(locale).to_string(),
        consonant: character.consonant,
        vowel: character.vowel,
        hiragana: character.hiragana,
        katakana: character.katakana,
        audio: character.audio,
    })
}
