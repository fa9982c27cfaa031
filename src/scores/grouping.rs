use std::cmp::Ordering;

use super::models::{GroupPosition, PlayerResult, RankedEntry, WinnerRecord};

/// Number of consecutive results that make up one group
pub const GROUP_SIZE: usize = 5;

/// Group the `n`-th result (0-based, arrival order) belongs to
pub fn group_index(n: usize) -> usize {
    n / GROUP_SIZE
}

/// How many complete groups a log of `len` results contains
pub fn complete_group_count(len: usize) -> usize {
    group_index(len)
}

/// Slot the next submission will fill, given `len` results already recorded
pub fn position_for(len: usize) -> GroupPosition {
    let position = len % GROUP_SIZE + 1;
    GroupPosition {
        position,
        remaining: GROUP_SIZE - position,
    }
}

/// Higher score first, then lower average reaction time
pub fn compare_results(a: &PlayerResult, b: &PlayerResult) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.avg_reaction_ms.total_cmp(&b.avg_reaction_ms))
}

/// Ranks a complete group. Entries equal on both keys keep arrival order.
pub fn rank_group(group: &[PlayerResult]) -> Option<WinnerRecord> {
    if group.len() != GROUP_SIZE {
        return None;
    }

    let mut ranked: Vec<&PlayerResult> = group.iter().collect();
    ranked.sort_by(|a, b| compare_results(a, b));

    let mut entries = ranked.into_iter().map(RankedEntry::from);
    let winner = entries.next()?;

    Some(WinnerRecord {
        winner,
        players: entries.collect(),
    })
}

/// Complete groups with index `>= already_emitted`, ranked, in log order
pub fn pending_groups(results: &[PlayerResult], already_emitted: usize) -> Vec<WinnerRecord> {
    results
        .chunks_exact(GROUP_SIZE)
        .skip(already_emitted)
        .filter_map(rank_group)
        .collect()
}
