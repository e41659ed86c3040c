pub mod commands;
pub mod controller;
pub mod state;

pub use commands::{TimerAction, TimerActionError};
pub use controller::{TimerController, TimerSnapshot};
pub use state::{RelatedSubject, TimerState, TimerStatus};
