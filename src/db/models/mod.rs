pub mod priority;
pub mod session;
pub mod subject;
pub mod task;

pub use priority::Priority;
pub use session::Session;
pub use subject::{random_gradient, Subject, SUBJECT_CARD_COLORS};
pub use task::Task;
