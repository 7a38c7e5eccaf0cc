//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::entities::{
    ArenaCategory, ArenaEvent, ArenaEventId, ArenaEventStatus, ArenaMatch, ArenaMatchId,
    ArenaParticipant, ArenaParticipantId, AttendanceRecord, HistoricalRanking, MemberId,
    NewArenaEvent, NewArenaMatch, NewArenaParticipant, RosterMember,
};
use crate::domain::ports::{
    ArenaEventRepository, ArenaMatchRepository, ArenaParticipantRepository, ArenaStore,
    ArenaTransaction, AttendanceLog, HistoricalRankingRepository, MemberRoster,
};
use crate::error::DomainError;

// ============================================================================
// In-Memory Arena Store
// ============================================================================

/// Everything an arena transaction can see
#[derive(Debug, Clone, Default)]
pub struct ArenaState {
    events: Vec<ArenaEvent>,
    participants: Vec<ArenaParticipant>,
    matches: Vec<ArenaMatch>,
    historical: BTreeMap<(MemberId, i32), i32>,
}

type Faults = Arc<Mutex<HashMap<&'static str, VecDeque<DomainError>>>>;

/// Shared in-memory store. Clones see the same state.
///
/// `lock_event` takes one store-wide lock held until commit or rollback, so
/// transactions that lock an event run one after another.
#[derive(Clone, Default)]
pub struct InMemoryArenaStore {
    state: Arc<RwLock<ArenaState>>,
    faults: Faults,
    begins: Arc<AtomicUsize>,
    commits: Arc<AtomicUsize>,
    event_lock: Arc<AsyncMutex<()>>,
}

impl InMemoryArenaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(self, event: ArenaEvent) -> Self {
        self.state.write().unwrap().events.push(event);
        self
    }

    pub fn with_participant(self, participant: ArenaParticipant) -> Self {
        self.state.write().unwrap().participants.push(participant);
        self
    }

    pub fn with_match(self, arena_match: ArenaMatch) -> Self {
        self.state.write().unwrap().matches.push(arena_match);
        self
    }

    pub fn with_historical(self, row: HistoricalRanking) -> Self {
        self.state
            .write()
            .unwrap()
            .historical
            .insert((row.member_id, row.rank), row.count);
        self
    }

    /// Make the next call of `operation` fail with `error`.
    /// Queuing several errors for one operation fails that many calls in a row.
    pub fn fail_once(self, operation: &'static str, error: DomainError) -> Self {
        self.faults
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(error);
        self
    }

    /// How many transactions have been opened
    pub fn begin_count(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    /// Committed state, for assertions
    pub fn snapshot(&self) -> ArenaState {
        self.state.read().unwrap().clone()
    }
}

impl ArenaState {
    pub fn participant(&self, id: &ArenaParticipantId) -> Option<&ArenaParticipant> {
        self.participants.iter().find(|p| p.id == *id)
    }

    pub fn historical_count(&self, member_id: &MemberId, rank: i32) -> Option<i32> {
        self.historical.get(&(*member_id, rank)).copied()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

fn take_fault(faults: &Faults, operation: &'static str) -> Result<(), DomainError> {
    let mut faults = faults.lock().unwrap();
    match faults.get_mut(operation).and_then(|queue| queue.pop_front()) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[async_trait]
impl ArenaStore for InMemoryArenaStore {
    type Transaction = InMemoryArenaTransaction;

    async fn begin(&self) -> Result<InMemoryArenaTransaction, DomainError> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        take_fault(&self.faults, "begin")?;
        Ok(InMemoryArenaTransaction {
            working: self.state.read().unwrap().clone(),
            seen_commits: self.commits.load(Ordering::SeqCst),
            shared: Arc::clone(&self.state),
            faults: Arc::clone(&self.faults),
            commits: Arc::clone(&self.commits),
            event_lock: Arc::clone(&self.event_lock),
            held: None,
        })
    }
}

/// Works on a private copy of the store until commit
pub struct InMemoryArenaTransaction {
    working: ArenaState,
    seen_commits: usize,
    shared: Arc<RwLock<ArenaState>>,
    faults: Faults,
    commits: Arc<AtomicUsize>,
    event_lock: Arc<AsyncMutex<()>>,
    held: Option<OwnedMutexGuard<()>>,
}

impl InMemoryArenaTransaction {
    fn fault(&self, operation: &'static str) -> Result<(), DomainError> {
        take_fault(&self.faults, operation)
    }

    /// Wait for the store lock. Once it is ours, pick up anything committed
    /// since this transaction began, like a row lock in READ COMMITTED.
    async fn acquire(&mut self) {
        if self.held.is_some() {
            return;
        }
        self.held = Some(Arc::clone(&self.event_lock).lock_owned().await);
        let latest = self.commits.load(Ordering::SeqCst);
        if latest != self.seen_commits {
            self.working = self.shared.read().unwrap().clone();
            self.seen_commits = latest;
        }
    }

    fn participant_mut(
        &mut self,
        id: &ArenaParticipantId,
    ) -> Result<&mut ArenaParticipant, DomainError> {
        self.working
            .participants
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or_else(|| DomainError::Conflict(format!("Participant {} vanished", id)))
    }
}

#[async_trait]
impl ArenaTransaction for InMemoryArenaTransaction {
    async fn commit(self) -> Result<(), DomainError> {
        self.fault("commit")?;
        *self.shared.write().unwrap() = self.working;
        self.commits.fetch_add(1, Ordering::SeqCst);
        drop(self.held);
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.fault("rollback")
    }
}

#[async_trait]
impl ArenaEventRepository for InMemoryArenaTransaction {
    async fn find_event(&mut self, id: &ArenaEventId) -> Result<Option<ArenaEvent>, DomainError> {
        self.fault("find_event")?;
        Ok(self.working.events.iter().find(|e| e.id == *id).cloned())
    }

    async fn lock_event(&mut self, id: &ArenaEventId) -> Result<Option<ArenaEvent>, DomainError> {
        self.fault("lock_event")?;
        self.acquire().await;
        Ok(self.working.events.iter().find(|e| e.id == *id).cloned())
    }

    async fn list_events(
        &mut self,
        category: Option<ArenaCategory>,
    ) -> Result<Vec<ArenaEvent>, DomainError> {
        self.fault("list_events")?;
        let mut events: Vec<ArenaEvent> = self
            .working
            .events
            .iter()
            .filter(|e| category.map_or(true, |c| e.category == c))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(events)
    }

    async fn insert_event(&mut self, event: &NewArenaEvent) -> Result<ArenaEvent, DomainError> {
        self.fault("insert_event")?;
        let created = ArenaEvent {
            id: ArenaEventId::new(),
            date: event.date,
            month: event.month,
            year: event.year,
            category: event.category,
            min_sessions_required: event.min_sessions_required,
            max_rank_diff: event.max_rank_diff,
            challenges_per_participant: event.challenges_per_participant,
            status: event.status,
            created_at: Utc::now(),
        };
        self.working.events.push(created.clone());
        Ok(created)
    }

    async fn update_event_status(
        &mut self,
        id: &ArenaEventId,
        status: ArenaEventStatus,
    ) -> Result<(), DomainError> {
        self.fault("update_event_status")?;
        let event = self
            .working
            .events
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| DomainError::Conflict(format!("Event {} vanished", id)))?;
        event.status = status;
        Ok(())
    }

    async fn delete_event(&mut self, id: &ArenaEventId) -> Result<(), DomainError> {
        self.fault("delete_event")?;
        let before = self.working.events.len();
        self.working.events.retain(|e| e.id != *id);
        if self.working.events.len() == before {
            return Err(DomainError::Conflict(format!("Event {} vanished", id)));
        }
        self.working.participants.retain(|p| p.event_id != *id);
        self.working.matches.retain(|m| m.event_id != *id);
        Ok(())
    }
}

#[async_trait]
impl ArenaParticipantRepository for InMemoryArenaTransaction {
    async fn find_participant(
        &mut self,
        id: &ArenaParticipantId,
    ) -> Result<Option<ArenaParticipant>, DomainError> {
        self.fault("find_participant")?;
        Ok(self.working.participant(id).cloned())
    }

    async fn find_participant_by_member(
        &mut self,
        event_id: &ArenaEventId,
        member_id: &MemberId,
    ) -> Result<Option<ArenaParticipant>, DomainError> {
        self.fault("find_participant_by_member")?;
        Ok(self
            .working
            .participants
            .iter()
            .find(|p| p.event_id == *event_id && p.member_id == *member_id)
            .cloned())
    }

    async fn list_participants(
        &mut self,
        event_id: &ArenaEventId,
    ) -> Result<Vec<ArenaParticipant>, DomainError> {
        self.fault("list_participants")?;
        Ok(self
            .working
            .participants
            .iter()
            .filter(|p| p.event_id == *event_id)
            .cloned()
            .collect())
    }

    async fn insert_participants(
        &mut self,
        participants: &[NewArenaParticipant],
    ) -> Result<Vec<ArenaParticipant>, DomainError> {
        self.fault("insert_participants")?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(participants.len());
        for p in participants {
            let taken = self
                .working
                .participants
                .iter()
                .chain(created.iter())
                .any(|existing: &ArenaParticipant| {
                    existing.event_id == p.event_id && existing.member_id == p.member_id
                });
            if taken {
                return Err(DomainError::Conflict(format!(
                    "Member {} already participates in event {}",
                    p.member_id, p.event_id
                )));
            }
            created.push(ArenaParticipant {
                id: ArenaParticipantId::new(),
                event_id: p.event_id,
                member_id: p.member_id,
                points: p.points,
                rank: None,
                challenges_remaining: p.challenges_remaining,
                wins: 0,
                losses: 0,
                score_for: 0,
                score_against: 0,
                monthly_participation_count: p.monthly_participation_count,
                yearly_participation_count: p.yearly_participation_count,
                created_at: now,
            });
        }
        self.working.participants.extend(created.iter().cloned());
        Ok(created)
    }

    async fn update_participant_stats(
        &mut self,
        participant: &ArenaParticipant,
    ) -> Result<(), DomainError> {
        self.fault("update_participant_stats")?;
        let stored = self.participant_mut(&participant.id)?;
        stored.points = participant.points;
        stored.challenges_remaining = participant.challenges_remaining;
        stored.wins = participant.wins;
        stored.losses = participant.losses;
        stored.score_for = participant.score_for;
        stored.score_against = participant.score_against;
        Ok(())
    }

    async fn update_ranks(
        &mut self,
        ranks: &[(ArenaParticipantId, i32)],
    ) -> Result<(), DomainError> {
        self.fault("update_ranks")?;
        for (id, rank) in ranks {
            self.participant_mut(id)?.rank = Some(*rank);
        }
        Ok(())
    }
}

#[async_trait]
impl ArenaMatchRepository for InMemoryArenaTransaction {
    async fn find_match(&mut self, id: &ArenaMatchId) -> Result<Option<ArenaMatch>, DomainError> {
        self.fault("find_match")?;
        Ok(self.working.matches.iter().find(|m| m.id == *id).cloned())
    }

    async fn find_match_by_pair(
        &mut self,
        challenger_id: &ArenaParticipantId,
        opponent_id: &ArenaParticipantId,
    ) -> Result<Option<ArenaMatch>, DomainError> {
        self.fault("find_match_by_pair")?;
        Ok(self
            .working
            .matches
            .iter()
            .find(|m| m.challenger_id == *challenger_id && m.opponent_id == *opponent_id)
            .cloned())
    }

    async fn list_matches(
        &mut self,
        event_id: &ArenaEventId,
    ) -> Result<Vec<ArenaMatch>, DomainError> {
        self.fault("list_matches")?;
        Ok(self
            .working
            .matches
            .iter()
            .filter(|m| m.event_id == *event_id)
            .cloned()
            .collect())
    }

    async fn insert_match(&mut self, new_match: &NewArenaMatch) -> Result<ArenaMatch, DomainError> {
        self.fault("insert_match")?;
        let duplicate = self.working.matches.iter().any(|m| {
            m.challenger_id == new_match.challenger_id && m.opponent_id == new_match.opponent_id
        });
        if duplicate {
            return Err(DomainError::Conflict(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }
        let created = ArenaMatch {
            id: ArenaMatchId::new(),
            event_id: new_match.event_id,
            challenger_id: new_match.challenger_id,
            opponent_id: new_match.opponent_id,
            outcome: new_match.outcome.clone(),
            created_at: Utc::now(),
        };
        self.working.matches.push(created.clone());
        Ok(created)
    }

    async fn complete_match(&mut self, arena_match: &ArenaMatch) -> Result<(), DomainError> {
        self.fault("complete_match")?;
        let stored = self
            .working
            .matches
            .iter_mut()
            .find(|m| m.id == arena_match.id && m.is_scheduled())
            .ok_or_else(|| {
                DomainError::Conflict(format!("Match {} is no longer scheduled", arena_match.id))
            })?;
        stored.outcome = arena_match.outcome.clone();
        Ok(())
    }

    async fn delete_match(&mut self, id: &ArenaMatchId) -> Result<(), DomainError> {
        self.fault("delete_match")?;
        let before = self.working.matches.len();
        self.working.matches.retain(|m| m.id != *id);
        if self.working.matches.len() == before {
            return Err(DomainError::Conflict(format!("Match {} vanished", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl HistoricalRankingRepository for InMemoryArenaTransaction {
    async fn find_historical_rankings(
        &mut self,
        member_ids: &[MemberId],
    ) -> Result<Vec<HistoricalRanking>, DomainError> {
        self.fault("find_historical_rankings")?;
        Ok(self
            .working
            .historical
            .iter()
            .filter(|((member_id, _), _)| member_ids.contains(member_id))
            .map(|(&(member_id, rank), &count)| HistoricalRanking {
                member_id,
                rank,
                count,
            })
            .collect())
    }

    async fn increment_historical_ranking(
        &mut self,
        member_id: &MemberId,
        rank: i32,
    ) -> Result<(), DomainError> {
        self.fault("increment_historical_ranking")?;
        *self.working.historical.entry((*member_id, rank)).or_insert(0) += 1;
        Ok(())
    }

    async fn decrement_historical_ranking(
        &mut self,
        member_id: &MemberId,
        rank: i32,
    ) -> Result<(), DomainError> {
        self.fault("decrement_historical_ranking")?;
        let key = (*member_id, rank);
        match self.working.historical.get(&key).copied() {
            Some(count) if count > 1 => {
                self.working.historical.insert(key, count - 1);
            }
            Some(_) => {
                self.working.historical.remove(&key);
            }
            None => {}
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Member Roster
// ============================================================================

#[derive(Default)]
pub struct InMemoryMemberRoster {
    members: Arc<RwLock<Vec<RosterMember>>>,
}

impl InMemoryMemberRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, member: RosterMember) -> Self {
        self.members.write().unwrap().push(member);
        self
    }
}

#[async_trait]
impl MemberRoster for InMemoryMemberRoster {
    async fn list_members(&self) -> Result<Vec<RosterMember>, DomainError> {
        Ok(self.members.read().unwrap().clone())
    }
}

// ============================================================================
// In-Memory Attendance Log
// ============================================================================

#[derive(Default)]
pub struct InMemoryAttendanceLog {
    records: Arc<RwLock<Vec<AttendanceRecord>>>,
}

impl InMemoryAttendanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: AttendanceRecord) -> Self {
        self.records.write().unwrap().push(record);
        self
    }
}

#[async_trait]
impl AttendanceLog for InMemoryAttendanceLog {
    async fn find_attendance(
        &self,
        member_ids: &[MemberId],
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .unwrap()
            .iter()
            .filter(|r| member_ids.contains(&r.member_id))
            .filter(|r| r.session_date >= from && r.session_date < until)
            .cloned()
            .collect())
    }
}
