pub mod command;
pub mod config;
pub mod state;

pub use command::SessionCommand;
pub use config::SessionConfig;
pub use state::{RunOutcome, SessionSnapshot, SessionState};
