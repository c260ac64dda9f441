// Settings module
// Loads the workflow configuration from the working directory

#[allow(clippy::module_inception)]
pub mod settings;

pub use settings::{ValueRange, WorkflowSettings};
