pub mod artifacts;
pub mod job_id;
pub mod orchestrator;
pub mod registry;
pub mod renderer;
