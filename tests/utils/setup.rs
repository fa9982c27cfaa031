use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use speed_challenge::{router, AppState, FileScoreRepository, GameSettings, ScoreService};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A server wired to file-backed logs in a temporary data directory
pub struct TestSetup {
    pub data_dir: TempDir,
    pub app_state: AppState,
}

impl TestSetup {
    pub async fn new() -> Self {
        let data_dir = tempfile::tempdir().expect("temp dir should be created");
        let app_state = Self::state_for(&data_dir).await;
        Self {
            data_dir,
            app_state,
        }
    }

    /// Simulates a server restart over the same data directory
    pub async fn restart(&mut self) {
        self.app_state = Self::state_for(&self.data_dir).await;
    }

    async fn state_for(data_dir: &TempDir) -> AppState {
        let repository = FileScoreRepository::open(data_dir.path())
            .await
            .expect("score logs should open");
        AppState::new(
            Arc::new(ScoreService::new(Arc::new(repository))),
            GameSettings::default(),
        )
    }

    pub fn app(&self) -> Router {
        router(self.app_state.clone())
    }

    pub fn players_log(&self) -> String {
        std::fs::read_to_string(self.data_dir.path().join("players.dat")).unwrap()
    }

    pub fn winners_log(&self) -> String {
        std::fs::read_to_string(self.data_dir.path().join("winners.dat")).unwrap()
    }

    pub fn append_to_winners_log(&self, text: &str) {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(self.data_dir.path().join("winners.dat"))
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    pub async fn submit(&self, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/save_score")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }
}

pub fn score_body(name: &str, score: u32, reaction: f64) -> String {
    format!(
        r#"{{"name": "{}", "phone": "0700-{}", "age": "25", "score": {}, "avg_reaction": {}}}"#,
        name, name, score, reaction
    )
}
