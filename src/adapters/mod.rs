//! Adapters: infrastructure implementations of the ports.

pub mod api;
pub mod host;
pub mod persistence;
pub mod ui;
