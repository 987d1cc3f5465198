//! Shared server state.

use std::path::PathBuf;

use simulation::Simulation;

/// Handed to every handler via axum's State extractor.
#[derive(Clone)]
pub struct ServerState {
    /// The simulation controller; clones share the same engine.
    pub sim: Simulation,
    /// Default directory for tick-buffer exports.
    pub data_dir: PathBuf,
}

impl ServerState {
    pub fn new(sim: Simulation, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            sim,
            data_dir: data_dir.into(),
        }
    }
}
