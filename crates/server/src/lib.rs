//! HTTP control plane and query surface.
//!
//! Thin axum layer over [`simulation::Simulation`]: read endpoints use the
//! shared engine lock through the controller's snapshot builders, control
//! endpoints take the write path, and `/stream` serves Server-Sent Events.

mod app;
mod error;
mod routes;
mod state;

pub use app::{ServerConfig, create_app, serve};
pub use error::{AppError, AppResult};
pub use state::ServerState;
