pub mod builder;
pub mod controller;
pub mod handle;
pub mod types;
pub mod view;

pub use builder::SessionBuilder;
pub use controller::SessionController;
pub use handle::SessionHandle;
pub use types::{RunOutcome, SessionCommand, SessionConfig, SessionSnapshot, SessionState};
pub use view::{drive_view, SessionView};
