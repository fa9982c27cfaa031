use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};

use super::{
    grouping::{self, GROUP_SIZE},
    models::{GroupPosition, PlayerResult, WinnerRecord},
    repository::ScoreRepository,
    ScoreError,
};

/// Records results, ranks complete groups and reads the leaderboard
pub struct ScoreService {
    repository: Arc<dyn ScoreRepository>,
    write_lock: AsyncMutex<()>,
}

impl ScoreService {
    pub fn new(repository: Arc<dyn ScoreRepository>) -> Self {
        Self {
            repository,
            write_lock: AsyncMutex::new(()),
        }
    }

    /// Appends a finished game to the player log, then emits any newly completed group.
    ///
    /// Only the append can fail the call; a grouping failure is logged and the
    /// recorded result stays in the log.
    #[instrument(skip(self, result), fields(name = %result.name, score = result.score))]
    pub async fn record_result(&self, result: PlayerResult) -> Result<(), ScoreError> {
        let _guard = self.write_lock.lock().await;

        self.repository.append_result(&result).await?;
        info!(
            avg_reaction_ms = result.avg_reaction_ms,
            "Player result recorded"
        );

        if let Err(e) = self.evaluate_pending_groups().await {
            warn!(error = %e, "Group evaluation failed after recording result");
        }

        Ok(())
    }

    /// Writes a winner record for every complete group not yet in the winners log.
    ///
    /// Returns how many groups were emitted.
    #[instrument(skip(self))]
    pub async fn evaluate_groups(&self) -> Result<usize, ScoreError> {
        let _guard = self.write_lock.lock().await;
        self.evaluate_pending_groups().await
    }

    // Caller must hold `write_lock`.
    async fn evaluate_pending_groups(&self) -> Result<usize, ScoreError> {
        let results = self.repository.load_results().await?;
        let emitted = self.repository.emitted_group_count().await?;
        let complete = grouping::complete_group_count(results.len());

        if emitted > complete {
            warn!(
                emitted,
                complete, "Winners log holds more groups than the player log can form"
            );
            return Ok(0);
        }

        let pending = grouping::pending_groups(&results, emitted);
        for (offset, record) in pending.iter().enumerate() {
            self.repository.append_winner_record(record).await?;
            info!(
                group = emitted + offset + 1,
                winner = %record.winner.name,
                score = record.winner.score,
                reaction_ms = record.winner.reaction_ms,
                "Group completed"
            );
        }

        debug!(emitted, complete, new_groups = pending.len(), "Groups evaluated");
        Ok(pending.len())
    }

    /// Slot the next player will take in the current group
    #[instrument(skip(self))]
    pub async fn current_position(&self) -> Result<GroupPosition, ScoreError> {
        let count = self.repository.result_count().await?;
        Ok(grouping::position_for(count))
    }

    /// Results already recorded in the group that is still filling up
    #[instrument(skip(self))]
    pub async fn current_group_results(&self) -> Result<Vec<PlayerResult>, ScoreError> {
        let mut results = self.repository.load_results().await?;
        let group_start = grouping::group_index(results.len()) * GROUP_SIZE;
        Ok(results.split_off(group_start))
    }

    /// Winner records, most recently completed group first
    #[instrument(skip(self))]
    pub async fn list_winner_groups(&self) -> Result<Vec<WinnerRecord>, ScoreError> {
        let mut records = self.repository.load_winner_records().await?;
        records.reverse();
        debug!(group_count = records.len(), "Winner groups loaded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::repository::InMemoryScoreRepository;
    use async_trait::async_trait;

    fn result(name: &str, score: u32, reaction: f64) -> PlayerResult {
        PlayerResult::new(name.to_string(), "0700".to_string(), 30, score, reaction)
    }

    async fn record_many(service: &ScoreService, count: usize) {
        for i in 0..count {
            service
                .record_result(result(&format!("p{}", i), (i * 10) as u32, 100.0))
                .await
                .unwrap();
        }
    }

    fn setup() -> (Arc<InMemoryScoreRepository>, ScoreService) {
        let repository = Arc::new(InMemoryScoreRepository::new());
        let service = ScoreService::new(repository.clone());
        (repository, service)
    }

    #[tokio::test]
    async fn test_no_group_before_five_results() {
        let (repository, service) = setup();

        record_many(&service, 4).await;

        assert!(repository.winners_log().is_empty());
        assert!(service.list_winner_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fifth_result_completes_group() {
        let (_, service) = setup();

        record_many(&service, 5).await;

        let groups = service.list_winner_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].winner.name, "p4");
        assert_eq!(groups[0].players.len(), 4);
    }

    #[tokio::test]
    async fn test_completed_groups_are_not_emitted_twice() {
        // Regression: earlier versions re-appended every complete group on each submission
        let (repository, service) = setup();

        record_many(&service, 17).await;

        assert_eq!(repository.emitted_group_count().await.unwrap(), 3);
        let winners: Vec<String> = service
            .list_winner_groups()
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.winner.name)
            .collect();
        assert_eq!(winners, vec!["p14", "p9", "p4"]);
    }

    #[tokio::test]
    async fn test_evaluate_groups_is_idempotent() {
        let (repository, service) = setup();
        record_many(&service, 10).await;

        assert_eq!(service.evaluate_groups().await.unwrap(), 0);
        assert_eq!(service.evaluate_groups().await.unwrap(), 0);
        assert_eq!(repository.emitted_group_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_evaluate_groups_catches_up_on_existing_log() {
        let (repository, service) = setup();
        for i in 0..10 {
            repository
                .append_result(&result(&format!("p{}", i), i, 100.0))
                .await
                .unwrap();
        }

        assert_eq!(service.evaluate_groups().await.unwrap(), 2);
        assert_eq!(service.evaluate_groups().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ranking_within_group() {
        let (_, service) = setup();
        let scores = [50, 50, 80, 10, 30];
        let reactions = [200.0, 100.0, 150.0, 300.0, 250.0];
        for (i, (score, reaction)) in scores.iter().zip(reactions).enumerate() {
            service
                .record_result(result(&format!("p{}", i), *score, reaction))
                .await
                .unwrap();
        }

        let group = &service.list_winner_groups().await.unwrap()[0];

        assert_eq!(group.winner.name, "p2");
        assert_eq!(group.players[0].name, "p1");
        assert_eq!(group.players[1].name, "p0");
    }

    #[tokio::test]
    async fn test_position_follows_submissions() {
        let (_, service) = setup();
        let mut observed = Vec::new();
        let mut recorded = 0;

        for target in [0, 1, 4, 5, 6] {
            record_many_from(&service, recorded, target).await;
            recorded = target;
            let position = service.current_position().await.unwrap();
            observed.push((position.position, position.remaining));
        }

        assert_eq!(observed, vec![(1, 4), (2, 3), (5, 0), (1, 4), (2, 3)]);
    }

    async fn record_many_from(service: &ScoreService, from: usize, to: usize) {
        for i in from..to {
            service
                .record_result(result(&format!("p{}", i), 1, 100.0))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_current_group_results() {
        let (_, service) = setup();

        record_many(&service, 7).await;
        let current: Vec<String> = service
            .current_group_results()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(current, vec!["p5", "p6"]);

        record_many_from(&service, 7, 10).await;
        assert!(service.current_group_results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_player_log_does_not_emit() {
        let winners = "Winner: a|Phone: 1|Age: 20|Score: 5|Reaction: 1.0ms\n\
                       Player: b|Phone: 1|Age: 20|Score: 4pts|Reaction: 1.0ms\n\
                       -----\n";
        let repository = Arc::new(InMemoryScoreRepository::with_logs("", winners));
        let service = ScoreService::new(repository.clone());

        record_many(&service, 3).await;

        assert_eq!(repository.emitted_group_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_new_group_after_half_written_winners_block() {
        let half_written = [
            "Winner: half|Phone: 1|Age: 30",
            "Winner: half|Phone: 1|Age: 30|Score: 999|Reaction: 1.0ms\n",
        ];

        for partial in half_written {
            let repository = Arc::new(InMemoryScoreRepository::with_logs("", partial));
            let service = ScoreService::new(repository.clone());

            record_many(&service, 5).await;

            let groups = service.list_winner_groups().await.unwrap();
            assert_eq!(groups.len(), 1, "winners log: {:?}", repository.winners_log());
            assert_eq!(groups[0].winner.name, "p4");
            assert_eq!(groups[0].players.len(), 4);
            assert_eq!(repository.emitted_group_count().await.unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn test_record_result_with_corrupt_player_line() {
        let repository = Arc::new(InMemoryScoreRepository::with_logs("not|a|result\n", ""));
        let service = ScoreService::new(repository.clone());

        service
            .record_result(result("alice", 10, 100.0))
            .await
            .unwrap();

        assert_eq!(repository.result_count().await.unwrap(), 2);
        assert!(repository.players_log().ends_with('\n'));
        assert!(matches!(
            service.evaluate_groups().await,
            Err(ScoreError::Parse(_))
        ));
        assert!(repository.winners_log().is_empty());
    }

    /// Repository whose appends to the winners log always fail
    struct FailingWinnersRepository {
        inner: InMemoryScoreRepository,
    }

    #[async_trait]
    impl ScoreRepository for FailingWinnersRepository {
        async fn append_result(&self, result: &PlayerResult) -> Result<(), ScoreError> {
            self.inner.append_result(result).await
        }
        async fn load_results(&self) -> Result<Vec<PlayerResult>, ScoreError> {
            self.inner.load_results().await
        }
        async fn result_count(&self) -> Result<usize, ScoreError> {
            self.inner.result_count().await
        }
        async fn append_winner_record(&self, _record: &WinnerRecord) -> Result<(), ScoreError> {
            Err(ScoreError::Persist("disk full".to_string()))
        }
        async fn emitted_group_count(&self) -> Result<usize, ScoreError> {
            self.inner.emitted_group_count().await
        }
        async fn load_winner_records(&self) -> Result<Vec<WinnerRecord>, ScoreError> {
            self.inner.load_winner_records().await
        }
    }

    #[tokio::test]
    async fn test_grouping_failure_keeps_recorded_result() {
        let repository = Arc::new(FailingWinnersRepository {
            inner: InMemoryScoreRepository::new(),
        });
        let service = ScoreService::new(repository.clone());

        record_many(&service, 5).await;

        assert_eq!(repository.result_count().await.unwrap(), 5);
        assert!(service.evaluate_groups().await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_submissions_emit_each_group_once() {
        let (repository, service) = setup();
        let service = Arc::new(service);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .record_result(result(&format!("p{}", i), i, 100.0))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repository.result_count().await.unwrap(), 20);
        assert_eq!(repository.emitted_group_count().await.unwrap(), 4);
    }
}
