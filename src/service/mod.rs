//! Service layer for the role-matchmaker engine
//!
//! This module wraps the queue store and formation engine behind a single
//! lock, with statistics, metrics and logging for every operation.

pub mod matchmaker;

pub use matchmaker::{Matchmaker, MatchmakerStats};
