pub mod result_set;
pub mod universe;
pub mod snapshot;
pub mod orchestrator;

pub use orchestrator::{Orchestrator, RunReport};
pub use result_set::ResultSet;
