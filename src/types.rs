//! Closed vocabularies shared by the stores, services and routes.
//!
//! Every value arriving from a caller is parsed through `FromStr`, so an
//! unknown locale, script, skill, tier or flag is rejected as a validation
//! error before any query runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReviewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ru,
    De,
}

impl Locale {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
            Self::De => "de",
        }
    }

    /// Characters carry English and Russian readings only; German falls back
    /// to English. Vocabulary keeps its own German columns.
    pub fn for_characters(self) -> Self {
        match self {
            Self::De => Self::En,
            other => other,
        }
    }
}

impl FromStr for Locale {
    type Err = ReviewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "en" => Ok(Self::En),
            "ru" => Ok(Self::Ru),
            "de" => Ok(Self::De),
            other => Err(ReviewError::validation(format!(
                "unsupported locale '{other}', expected one of en, ru, de"
            ))),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Hiragana,
    Katakana,
}

impl Script {
    pub const ALL: [Script; 2] = [Script::Hiragana, Script::Katakana];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hiragana => "hiragana",
            Self::Katakana => "katakana",
        }
    }
}

impl FromStr for Script {
    type Err = ReviewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hiragana" => Ok(Self::Hiragana),
            "katakana" => Ok(Self::Katakana),
            other => Err(ReviewError::validation(format!(
                "unsupported script '{other}', expected hiragana or katakana"
            ))),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Reading,
    Writing,
    Listening,
}

impl Skill {
    pub const ALL: [Skill; 3] = [Skill::Reading, Skill::Writing, Skill::Listening];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Writing => "writing",
            Self::Listening => "listening",
        }
    }

    /// Reading and listening are multiple choice; writing is open form.
    pub fn uses_distractors(self) -> bool {
        !matches!(self, Self::Writing)
    }
}

impl FromStr for Skill {
    type Err = ReviewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "reading" => Ok(Self::Reading),
            "writing" => Ok(Self::Writing),
            "listening" => Ok(Self::Listening),
            other => Err(ReviewError::validation(format!(
                "unsupported skill '{other}', expected reading, writing or listening"
            ))),
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learner preference about re-queuing an alphabet once it looks learned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatFlag {
    #[default]
    #[serde(rename = "in question")]
    InQuestion,
    #[serde(rename = "ignore")]
    Ignore,
    #[serde(rename = "repeat")]
    Repeat,
}

impl RepeatFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InQuestion => "in question",
            Self::Ignore => "ignore",
            Self::Repeat => "repeat",
        }
    }
}

impl FromStr for RepeatFlag {
    type Err = ReviewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "in question" => Ok(Self::InQuestion),
            "ignore" => Ok(Self::Ignore),
            "repeat" => Ok(Self::Repeat),
            other => Err(ReviewError::validation(format!(
                "unsupported repeat flag '{other}', expected 'in question', 'ignore' or 'repeat'"
            ))),
        }
    }
}

/// The four fixed review tiers of a vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DifficultyTier {
    Easy,
    Normal,
    Hard,
    ExtraHard,
}

impl FromStr for DifficultyTier {
    type Err = ReviewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            "extra-hard" => Ok(Self::ExtraHard),
            other => Err(ReviewError::validation(format!(
                "unsupported difficulty '{other}', expected easy, normal, hard or extra-hard"
            ))),
        }
    }
}
