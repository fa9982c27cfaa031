use serde::{Deserialize, Serialize};

use super::{
    models::{PlayerResult, RankedEntry},
    ScoreError,
};

/// Minimum age allowed to play
pub const MIN_AGE: u32 = 18;

/// A numeric field sent either as a JSON number or as a string.
///
/// The game page posts `age` as a string copied from the registration form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(serde_json::Number),
    Text(String),
}

impl LooseNumber {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            LooseNumber::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            LooseNumber::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => n.as_f64(),
            LooseNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Request payload for submitting a finished game
///
/// Every field is optional at the JSON level so a missing one can be
/// reported as "Missing data" instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct SaveScoreRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<LooseNumber>,
    pub score: Option<LooseNumber>,
    pub avg_reaction: Option<LooseNumber>,
}

impl SaveScoreRequest {
    /// Checks the submission and turns it into a timestamped result
    pub fn into_result(self) -> Result<PlayerResult, ScoreError> {
        let (Some(name), Some(phone), Some(age), Some(score), Some(avg_reaction)) =
            (self.name, self.phone, self.age, self.score, self.avg_reaction)
        else {
            return Err(ScoreError::Validation("Missing data".to_string()));
        };

        let name = validate_text("name", &name)?;
        let phone = validate_text("phone", &phone)?;
        let age = validate_age(&age)?;
        let score = score
            .as_u32()
            .ok_or_else(|| ScoreError::Validation("Invalid score".to_string()))?;
        let avg_reaction = avg_reaction
            .as_f64()
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .ok_or_else(|| ScoreError::Validation("Invalid reaction time".to_string()))?;

        Ok(PlayerResult::new(name, phone, age, score, avg_reaction))
    }
}

/// Trims a free-text field and rejects characters that would break the log format
pub fn validate_text(field: &str, value: &str) -> Result<String, ScoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ScoreError::Validation(format!("Missing {}", field)));
    }
    if trimmed.contains(['|', '\n', '\r']) {
        return Err(ScoreError::Validation(format!(
            "Invalid characters in {}",
            field
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_age(age: &LooseNumber) -> Result<u32, ScoreError> {
    match age.as_u32() {
        Some(age) if age >= MIN_AGE => Ok(age),
        Some(_) => Err(ScoreError::Validation(format!(
            "Players must be at least {}",
            MIN_AGE
        ))),
        None => Err(ScoreError::Validation("Invalid age".to_string())),
    }
}

/// Generic status body (`{"status": "success"}`)
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// One completed group on the leaderboard
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardGroup {
    pub group: usize, // 1-based, in completion order
    pub winner: RankedEntry,
    pub players: Vec<RankedEntry>,
}

/// Result already recorded in the current group
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupMemberResponse {
    pub name: String,
    pub score: u32,
    pub avg_reaction: f64,
}

impl From<PlayerResult> for GroupMemberResponse {
    fn from(result: PlayerResult) -> Self {
        Self {
            name: result.name,
            score: result.score,
            avg_reaction: result.avg_reaction_ms,
        }
    }
}
