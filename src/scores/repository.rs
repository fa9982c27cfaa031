use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, instrument, warn};

use super::{
    codec,
    models::{PlayerResult, WinnerRecord},
    ScoreError,
};

pub const PLAYERS_FILE: &str = "players.dat";
pub const WINNERS_FILE: &str = "winners.dat";

/// Storage for the player log and the winners log.
///
/// Both logs are append-only; every read goes back to storage.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    async fn append_result(&self, result: &PlayerResult) -> Result<(), ScoreError>;
    async fn load_results(&self) -> Result<Vec<PlayerResult>, ScoreError>;
    async fn result_count(&self) -> Result<usize, ScoreError>;

    async fn append_winner_record(&self, record: &WinnerRecord) -> Result<(), ScoreError>;
    /// Number of groups already written to the winners log
    async fn emitted_group_count(&self) -> Result<usize, ScoreError>;
    /// Well-formed winners log blocks, oldest first
    async fn load_winner_records(&self) -> Result<Vec<WinnerRecord>, ScoreError>;
}

/// In-memory implementation of ScoreRepository for development and testing
///
/// Keeps the encoded text of both logs so the same codec runs as with files.
pub struct InMemoryScoreRepository {
    players_log: Mutex<String>,
    winners_log: Mutex<String>,
}

impl Default for InMemoryScoreRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryScoreRepository {
    /// Creates a repository with both logs empty
    pub fn new() -> Self {
        Self::with_logs("", "")
    }

    /// Creates a repository pre-populated with raw log contents
    pub fn with_logs(players_log: &str, winners_log: &str) -> Self {
        Self {
            players_log: Mutex::new(players_log.to_string()),
            winners_log: Mutex::new(winners_log.to_string()),
        }
    }

    /// Raw winners log text (useful for asserting the exact format)
    pub fn winners_log(&self) -> String {
        lock(&self.winners_log).clone()
    }

    /// Raw player log text
    pub fn players_log(&self) -> String {
        lock(&self.players_log).clone()
    }
}

fn lock(log: &Mutex<String>) -> std::sync::MutexGuard<'_, String> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ScoreRepository for InMemoryScoreRepository {
    #[instrument(skip(self, result))]
    async fn append_result(&self, result: &PlayerResult) -> Result<(), ScoreError> {
        debug!(name = %result.name, score = result.score, "Appending result in memory");
        lock(&self.players_log).push_str(&codec::encode_player_line(result));
        Ok(())
    }

    async fn load_results(&self) -> Result<Vec<PlayerResult>, ScoreError> {
        codec::decode_player_log(&lock(&self.players_log))
    }

    async fn result_count(&self) -> Result<usize, ScoreError> {
        Ok(codec::count_player_lines(&lock(&self.players_log)))
    }

    #[instrument(skip(self, record))]
    async fn append_winner_record(&self, record: &WinnerRecord) -> Result<(), ScoreError> {
        debug!(winner = %record.winner.name, "Appending winner record in memory");
        let mut log = lock(&self.winners_log);
        let separator = codec::block_separator(&log);
        log.push_str(separator);
        log.push_str(&codec::encode_winner_block(record));
        Ok(())
    }

    async fn emitted_group_count(&self) -> Result<usize, ScoreError> {
        Ok(codec::count_group_delimiters(&lock(&self.winners_log)))
    }

    async fn load_winner_records(&self) -> Result<Vec<WinnerRecord>, ScoreError> {
        Ok(codec::decode_winner_log(&lock(&self.winners_log)))
    }
}

/// File-backed implementation: `players.dat` and `winners.dat` inside a data directory
pub struct FileScoreRepository {
    players_path: PathBuf,
    winners_path: PathBuf,
}

impl FileScoreRepository {
    /// Uses the two log files inside `data_dir` without touching the filesystem
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            players_path: data_dir.join(PLAYERS_FILE),
            winners_path: data_dir.join(WINNERS_FILE),
        }
    }

    /// Creates the data directory and empty log files if they are missing
    #[instrument(skip_all)]
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, ScoreError> {
        tokio::fs::create_dir_all(data_dir.as_ref()).await.map_err(|e| {
            warn!(error = %e, data_dir = %data_dir.as_ref().display(), "Failed to create data directory");
            ScoreError::Persist(e.to_string())
        })?;

        let repository = Self::new(data_dir);
        for path in [&repository.players_path, &repository.winners_path] {
            append_text(path, "").await?;
        }

        debug!(
            players = %repository.players_path.display(),
            winners = %repository.winners_path.display(),
            "Score logs ready"
        );
        Ok(repository)
    }

    pub fn players_path(&self) -> &Path {
        &self.players_path
    }

    pub fn winners_path(&self) -> &Path {
        &self.winners_path
    }
}

async fn read_text(path: &Path) -> Result<String, ScoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Failed to read log file");
            Err(ScoreError::Persist(e.to_string()))
        }
    }
}

async fn append_text(path: &Path, text: &str) -> Result<(), ScoreError> {
    let result = async {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await
    }
    .await;

    result.map_err(|e| {
        warn!(error = %e, path = %path.display(), "Failed to append to log file");
        ScoreError::Persist(e.to_string())
    })
}

#[async_trait]
impl ScoreRepository for FileScoreRepository {
    #[instrument(skip(self, result))]
    async fn append_result(&self, result: &PlayerResult) -> Result<(), ScoreError> {
        debug!(name = %result.name, score = result.score, "Appending result to player log");
        append_text(&self.players_path, &codec::encode_player_line(result)).await
    }

    #[instrument(skip(self))]
    async fn load_results(&self) -> Result<Vec<PlayerResult>, ScoreError> {
        codec::decode_player_log(&read_text(&self.players_path).await?)
    }

    async fn result_count(&self) -> Result<usize, ScoreError> {
        Ok(codec::count_player_lines(
            &read_text(&self.players_path).await?,
        ))
    }

    #[instrument(skip(self, record))]
    async fn append_winner_record(&self, record: &WinnerRecord) -> Result<(), ScoreError> {
        debug!(winner = %record.winner.name, "Appending winner record to winners log");
        let existing = read_text(&self.winners_path).await?;
        let block = format!(
            "{}{}",
            codec::block_separator(&existing),
            codec::encode_winner_block(record)
        );
        append_text(&self.winners_path, &block).await
    }

    async fn emitted_group_count(&self) -> Result<usize, ScoreError> {
        Ok(codec::count_group_delimiters(
            &read_text(&self.winners_path).await?,
        ))
    }

    #[instrument(skip(self))]
    async fn load_winner_records(&self) -> Result<Vec<WinnerRecord>, ScoreError> {
        Ok(codec::decode_winner_log(
            &read_text(&self.winners_path).await?,
        ))
    }
}
