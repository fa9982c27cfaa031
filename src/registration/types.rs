use serde::{Deserialize, Serialize};

use crate::config::GameSettings;
use crate::scores::{
    models::GroupPosition,
    types::{validate_age, validate_text, LooseNumber},
    ScoreError,
};

/// Request payload for registering before a game
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<LooseNumber>,
}

/// A player cleared to start a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub phone: String,
    pub age: u32,
}

impl RegistrationRequest {
    pub fn validate(self) -> Result<Registration, ScoreError> {
        let (Some(name), Some(phone), Some(age)) = (self.name, self.phone, self.age) else {
            return Err(ScoreError::Validation("Missing data".to_string()));
        };

        Ok(Registration {
            name: validate_text("name", &name)?,
            phone: validate_text("phone", &phone)?,
            age: validate_age(&age)?,
        })
    }
}

/// Response for a successful registration: who plays, where they land, how the game runs
#[derive(Debug, Serialize, Deserialize)]
pub struct StartGameResponse {
    pub player: Registration,
    pub position: GroupPosition,
    pub settings: GameSettings,
}
