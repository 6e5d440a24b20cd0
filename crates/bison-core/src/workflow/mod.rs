//! Execution flow: dispatch, the item loop, and what they report

pub mod dispatcher;
pub mod observer;
pub mod orchestrator;
pub mod outcome;
pub mod traits;

pub use observer::{ExecutionEvent, LogObserver, MemoryObserver};
pub use orchestrator::NodeExecutor;
pub use outcome::{DependentStep, DependentStepError, Outcome};
pub use traits::ExecutionObserver;
