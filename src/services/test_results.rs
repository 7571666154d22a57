use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::db::operations::characters::{
    self, clamp_score, CharacterMasteryRecord, MasteryScores, MAX_BATCH_SIZE,
};
use crate::db::DatabaseProxy;
use crate::error::{ReviewError, ReviewResult};
use crate::types::{RepeatFlag, Script, Skill};

/// Turns one pass/fail event into a new score.
///
/// [`fold_results`] clamps the output to `[0, 1]` and never lets a pass lower
/// the score nor a failure raise it, whatever the implementation returns.
pub trait ScoreBlend: Send + Sync {
    fn blend(&self, prior: f64, passed: bool) -> f64;
}

/// Moves the score a fixed fraction of the way toward 1 on a pass and toward
/// 0 on a failure.
#[derive(Debug, Clone, Copy)]
pub struct MovingAverageBlend {
    rate: f64,
}

impl MovingAverageBlend {
    /// A non-finite `rate` falls back to the default learning rate.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() {
            rate.clamp(0.0, 1.0)
        } else {
            ScoringConfig::default().learning_rate
        };
        Self { rate }
    }
}

impl ScoreBlend for MovingAverageBlend {
    fn blend(&self, prior: f64, passed: bool) -> f64 {
        let prior = clamp_score(prior);
        let target = if passed { 1.0 } else { 0.0 };
        clamp_score(prior + self.rate * (target - prior))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatContext {
    pub flag: RepeatFlag,
    pub script: Script,
    pub skill: Skill,
    pub attempted: usize,
    pub passed: usize,
    /// Mean of the updated scores of the characters in this submission.
    pub mean_score: f64,
}

/// Decides whether the client should ask the learner to re-queue the alphabet.
pub trait RepeatPolicy: Send + Sync {
    fn ask_for_repeat(&self, ctx: &RepeatContext) -> bool;
}

impl<F> RepeatPolicy for F
where
    F: Fn(&RepeatContext) -> bool + Send + Sync,
{
    fn ask_for_repeat(&self, ctx: &RepeatContext) -> bool {
        self(ctx)
    }
}

/// Asks only while the learner is undecided, after a clean run whose scores
/// reached `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdRepeatPolicy {
    threshold: f64,
}

impl ThresholdRepeatPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl RepeatPolicy for ThresholdRepeatPolicy {
    fn ask_for_repeat(&self, ctx: &RepeatContext) -> bool {
        ctx.flag == RepeatFlag::InQuestion
            && ctx.attempted > 0
            && ctx.passed == ctx.attempted
            && ctx.mean_score >= self.threshold
    }
}

#[derive(Clone)]
pub struct IngestionPolicy {
    pub blend: Arc<dyn ScoreBlend>,
    pub repeat: Arc<dyn RepeatPolicy>,
}

impl IngestionPolicy {
    pub fn new(blend: Arc<dyn ScoreBlend>, repeat: Arc<dyn RepeatPolicy>) -> Self {
        Self { blend, repeat }
    }

    pub fn from_scoring(scoring: ScoringConfig) -> Self {
        Self {
            blend: Arc::new(MovingAverageBlend::new(scoring.learning_rate)),
            repeat: Arc::new(ThresholdRepeatPolicy::new(scoring.repeat_threshold)),
        }
    }
}

impl Default for IngestionPolicy {
    fn default() -> Self {
        Self::from_scoring(ScoringConfig::default())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterResultInput {
    #[serde(alias = "characterId")]
    pub id: i64,
    pub passed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSubmission {
    pub script: String,
    pub skill: String,
    pub results: Vec<CharacterResultInput>,
    #[serde(default)]
    pub repeat_flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreChange {
    pub character_id: i64,
    pub previous: f64,
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub ask_for_repeat: bool,
    pub repeat_flag: RepeatFlag,
    pub updated: Vec<ScoreChange>,
}

struct ParsedSubmission<'a> {
    script: Script,
    skill: Skill,
    flag: RepeatFlag,
    results: &'a [CharacterResultInput],
}

fn parse_submission(submission: &ResultSubmission) -> ReviewResult<ParsedSubmission<'_>> {
    let script: Script = submission.script.parse()?;
    let skill: Skill = submission.skill.parse()?;
    let flag = submission
        .repeat_flag
        .as_deref()
        .map(str::parse::<RepeatFlag>)
        .transpose()?
        .unwrap_or_default();

    if submission.results.is_empty() {
        return Err(ReviewError::validation("results must be a non-empty array"));
    }
    if submission.results.len() > MAX_BATCH_SIZE {
        return Err(ReviewError::validation(format!(
            "results exceed maximum batch size of {MAX_BATCH_SIZE}"
        )));
    }

    Ok(ParsedSubmission {
        script,
        skill,
        flag,
        results: &submission.results,
    })
}

/// Folds the results into one score per character, in submission order.
/// Returns `(character_id, previous, current)` in first-seen order.
pub fn fold_results(
    blend: &dyn ScoreBlend,
    priors: &HashMap<i64, f64>,
    results: &[CharacterResultInput],
) -> Vec<(i64, f64, f64)> {
    let mut order: Vec<i64> = Vec::new();
    let mut current: HashMap<i64, f64> = HashMap::new();

    for result in results {
        let score = current.entry(result.id).or_insert_with(|| {
            order.push(result.id);
            priors.get(&result.id).copied().unwrap_or(0.0)
        });
        *score = directed(*score, blend.blend(*score, result.passed), result.passed);
    }

    order
        .into_iter()
        .map(|id| {
            let previous = priors.get(&id).copied().unwrap_or(0.0);
            (id, previous, current[&id])
        })
        .collect()
}

fn directed(prior: f64, next: f64, passed: bool) -> f64 {
    let prior = clamp_score(prior);
    let next = clamp_score(next);
    if passed {
        next.max(prior)
    } else {
        next.min(prior)
    }
}

pub async fn submit_results(
    proxy: &DatabaseProxy,
    policy: &IngestionPolicy,
    user_id: &str,
    submission: &ResultSubmission,
) -> ReviewResult<SubmitOutcome> {
    let parsed = parse_submission(submission)?;
    let pool = proxy.pool();

    let mut ids: Vec<i64> = parsed.results.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    ids.dedup();

    let existing = characters::existing_character_ids(pool, &ids).await?;
    if existing.len() != ids.len() {
        let missing: Vec<i64> = ids.iter().copied().filter(|id| !existing.contains(id)).collect();
        return Err(ReviewError::not_found(format!("unknown character ids: {missing:?}")));
    }

    let priors: HashMap<i64, f64> = characters::get_scores(pool, user_id, &ids)
        .await?
        .into_iter()
        .map(|(id, record)| (id, record.scores.score(parsed.script, parsed.skill)))
        .collect();

    let folded = fold_results(policy.blend.as_ref(), &priors, parsed.results);

    let records: Vec<CharacterMasteryRecord> = folded
        .iter()
        .map(|(character_id, _, current)| {
            let mut scores = MasteryScores::default();
            scores.set(parsed.script, parsed.skill, *current);
            CharacterMasteryRecord {
                user_id: user_id.to_string(),
                character_id: *character_id,
                scores,
            }
        })
        .collect();
    characters::upsert_mastery(pool, &records).await?;

    let passed = parsed.results.iter().filter(|r| r.passed).count();
    let mean_score = folded.iter().map(|(_, _, current)| current).sum::<f64>() / folded.len() as f64;
    let ctx = RepeatContext {
        flag: parsed.flag,
        script: parsed.script,
        skill: parsed.skill,
        attempted: parsed.results.len(),
        passed,
        mean_score,
    };
    let ask_for_repeat = policy.repeat.ask_for_repeat(&ctx);

    tracing::info!(
        user_id,
        script = %parsed.script,
        skill = %parsed.skill,
        attempted = ctx.attempted,
        passed,
        ask_for_repeat,
        "character results recorded"
    );

    Ok(SubmitOutcome {
        ask_for_repeat,
        repeat_flag: parsed.flag,
        updated: folded
            .into_iter()
            .map(|(character_id, previous, current)| ScoreChange {
                character_id,
                previous,
                current,
            })
            .collect(),
    })
}
