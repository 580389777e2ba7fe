//! CLI command implementations.

mod agents;
mod chat;
mod config;
mod doctor;
mod extract;
mod fitness;
mod serve;

pub use agents::run_agents;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use extract::run_extract;
pub use fitness::run_fitness;
pub use serve::run_serve;
