//! News events and their generator.
//!
//! News drives the simulation's exogenous shocks: supply and demand events
//! target a single commodity, global and political events move the
//! process-wide sentiment. Generation is Poisson-distributed per tick and
//! deterministic under a fixed seed.

mod events;
mod generator;
mod headlines;

pub use events::{NewsCategory, NewsEvent, NewsSentiment};
pub use generator::{NewsConfig, NewsGenerator};
