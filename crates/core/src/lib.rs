//! Domain types shared by every relay crate.
//!
//! Holds the error taxonomy, the inbound job request and terminal job
//! result, storage reference parsing, and the workflow document helpers
//! used to inject inputs and walk produced outputs.

pub mod error;
pub mod job;
pub mod reference;
pub mod workflow;
