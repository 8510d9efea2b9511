pub mod completion;
pub mod config;
pub mod events;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod traits;
