use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// One finished game attempt as stored in the player log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub name: String,
    pub phone: String,
    pub age: u32,
    pub score: u32,
    pub avg_reaction_ms: f64,
    pub timestamp: NaiveDateTime, // Local wall-clock time, second precision
}

impl PlayerResult {
    /// Creates a result stamped with the current local time
    pub fn new(name: String, phone: String, age: u32, score: u32, avg_reaction_ms: f64) -> Self {
        let now = Local::now().naive_local();
        let now = now.with_nanosecond(0).unwrap_or(now);

        Self {
            name,
            phone,
            age,
            score,
            avg_reaction_ms,
            timestamp: now,
        }
    }
}

/// A group member as it appears in the winners log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub name: String,
    pub phone: String,
    pub age: u32,
    pub score: u32,
    pub reaction_ms: f64,
}

impl From<&PlayerResult> for RankedEntry {
    fn from(result: &PlayerResult) -> Self {
        Self {
            name: result.name.clone(),
            phone: result.phone.clone(),
            age: result.age,
            score: result.score,
            reaction_ms: result.avg_reaction_ms,
        }
    }
}

/// Ranked outcome of one complete group: the winner plus the other members in rank order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub winner: RankedEntry,
    pub players: Vec<RankedEntry>,
}

/// Slot the next player will take in the current group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPosition {
    pub position: usize,
    pub remaining: usize,
}
