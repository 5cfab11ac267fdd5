//! Shared sales leaderboard sync engine: persist an editable tabular
//! dataset, detect per-entity total increases across polling ticks, pulse a
//! one-shot notification through a shared snapshot, and derive the ranked
//! color-bucketed chart from the same data.

pub mod access;
pub mod chart;
pub mod config;
pub mod detect;
pub mod engine;
pub mod logging;
pub mod model;
pub mod notify;
pub mod store;
