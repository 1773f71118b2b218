//! Infrastructure implementations.
//!
//! Contains port trait implementations for collaborators the host does not
//! supply: in-memory world state, the day clock, seeded randomness, and an
//! automatic presenter for headless runs.

pub mod clock;
pub mod memory;
pub mod ports;
pub mod presenter;
pub mod settings;
