//! Windowed entropy-injection pipeline.
//!
//! Replaces each value of a time-ordered numeric series with a freshly
//! generated random value whose statistical envelope is derived from a local
//! window of the original series, to study whether externally sourced
//! entropy (atmospheric or quantum-measurement noise) can stand in for a
//! real sequence while preserving its local statistical character.

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod entropy;
pub mod manager;
pub mod stats;
