// Public API - what other modules can use
pub use handlers::{game_settings, start_game};

// Internal modules
mod handlers;
mod types;
