//! SeaORM entity models
//!
//! Table mappings used by the PostgreSQL adapters. Domain code never sees
//! these; adapters convert them into `domain::entities` types.

pub mod arena_events;
pub mod arena_historical_rankings;
pub mod arena_matches;
pub mod arena_participants;
pub mod members;
pub mod session_attendances;
pub mod sessions;
