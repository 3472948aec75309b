//! Adaptive assessment engine behind the CareerCraft guidance portal.
//!
//! Question graphs are loaded from authored documents (or the built-in catalog), administered
//! through stateful sessions that follow branch rules, and scored into recommendation tiers.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
