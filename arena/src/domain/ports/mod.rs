//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod collaborators;
pub mod repositories;

pub use collaborators::{AttendanceLog, MemberRoster};
pub use repositories::{
    ArenaEventRepository, ArenaMatchRepository, ArenaParticipantRepository, ArenaStore,
    ArenaTransaction, HistoricalRankingRepository,
};
