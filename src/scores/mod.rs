// Public API - what other modules can use
pub use errors::ScoreError;
pub use handlers::{current_group, current_position, leaderboard, save_score};
pub use repository::{FileScoreRepository, InMemoryScoreRepository, ScoreRepository};
pub use service::ScoreService;

// Internal modules
pub mod codec;
mod errors;
pub mod grouping;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
