//! Historical ranking ledger entity
//!
//! Per-member counts of finishing an event at each exact rank. This is the
//! only arena state that outlives a single event.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::member::MemberId;

/// One ledger row: how often `member_id` finished an event at `rank`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoricalRanking {
    pub member_id: MemberId,
    pub rank: i32,
    pub count: i32,
}

/// Sparse finishing-rank -> count map for one member
pub type HistoricalRankCounts = BTreeMap<i32, i32>;

/// Historical rank counts keyed by member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalIndex {
    by_member: HashMap<MemberId, HistoricalRankCounts>,
}

impl HistoricalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = HistoricalRanking>) -> Self {
        let mut index = Self::new();
        for row in rows {
            index.insert(row.member_id, row.rank, row.count);
        }
        index
    }

    pub fn insert(&mut self, member_id: MemberId, rank: i32, count: i32) {
        self.by_member.entry(member_id).or_default().insert(rank, count);
    }

    /// Counts for a member; empty when the member has never finished an event
    pub fn counts_for(&self, member_id: &MemberId) -> Option<&HistoricalRankCounts> {
        self.by_member.get(member_id)
    }
}
