//! Top-level command orchestration.

pub mod backup;
