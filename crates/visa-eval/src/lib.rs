//! Immigration visa evaluation engine: a static visa catalog, per-mode scoring
//! strategies, and the follow-up workflow planner, plus the config, telemetry and
//! error plumbing shared with the HTTP service.

pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod telemetry;
