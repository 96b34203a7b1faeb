//! Skill half-life analytics: loads a workforce skill dataset, filters it by
//! industry, category and metric ranges, and computes the aggregates behind
//! the dashboard views.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod loader;
pub mod logger;
pub mod models;
pub mod report;
pub mod session;
pub mod stats;
