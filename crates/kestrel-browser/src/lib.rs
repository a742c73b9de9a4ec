pub mod engine;
pub mod error;
pub mod finder;
pub mod launch;
pub mod orchestrator;
pub mod registry;

pub use engine::{CdpEngine, EngineLauncher, EngineSession, LaunchedEngine, ProcessEngine};
pub use error::{Error, Result};
pub use finder::EngineFinder;
pub use launch::{AUTOMATION_FLAG, LaunchSpec, build_launch_spec};
pub use orchestrator::{LaunchOrchestrator, Launched};
pub use registry::RunningInstanceRegistry;
