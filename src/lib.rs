// Library crate for the speed challenge score server
// This file exposes the public API for integration tests

pub mod app;
pub mod config;
pub mod registration;
pub mod scores;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use app::router;
pub use config::{AppConfig, GameSettings};
pub use scores::{FileScoreRepository, InMemoryScoreRepository, ScoreRepository, ScoreService};
pub use shared::{AppError, AppState};
