//! Job pipeline: resolve inputs, render the workflow, wait, publish outputs.
//!
//! [`orchestrator::JobOrchestrator`] is the single entry point. It owns the
//! storage and engine dependencies it is constructed with and turns every
//! request into a [`relay_core::job::JobResult`], successful or not.

pub mod config;
pub mod orchestrator;
pub mod template;
