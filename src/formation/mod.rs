//! Team and match formation
//!
//! This module assembles role-complete teams from the queue store and
//! checks two teams for skill balance before they become a match.

pub mod balance;
pub mod engine;

pub use balance::{average_mmr, balance_gap, is_balanced, BalanceReport};
pub use engine::FormationEngine;
