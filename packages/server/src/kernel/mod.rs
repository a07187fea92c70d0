//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::{LogOnlyDispatcher, ServerDeps, TwilioAdapter};
pub use test_dependencies::TestDependencies;
pub use traits::*;
