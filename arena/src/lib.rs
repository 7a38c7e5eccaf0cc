//! Ladder Arena
//!
//! Monthly ladder competitions for a club: eligibility seeding, challenge
//! rules, match results, rank recalculation and the historical ranking
//! ledger. Uses hexagonal (ports & adapters) architecture so the ladder
//! rules run unchanged against PostgreSQL or the in-memory test store.

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod entity;
pub mod error;

#[cfg(test)]
mod test_utils;
