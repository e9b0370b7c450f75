//! Animation Render Orchestrator
//!
//! This library runs animation renders as external Blender processes, one
//! background task per job, and tracks each job's status in an in-memory
//! registry that the HTTP layer queries.

pub mod app_state;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
