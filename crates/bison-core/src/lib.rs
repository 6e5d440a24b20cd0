//! EmailBison Core Library
//!
//! Operation handlers for the EmailBison cold-email API: parameter
//! normalization, request building, dispatch, composite flows and the
//! per-item execution loop.

pub mod clients;
pub mod config;
pub mod constants;
pub mod error;
pub mod params;
pub mod payload;
pub mod resources;
pub mod response;
pub mod services;
pub mod workflow;

pub use clients::{ApiRequest, ApiTransport, EmailBisonClient, HttpMethod};
pub use config::BisonConfig;
pub use error::{BisonError, Result};
pub use params::{IdList, IdListInput, ParameterSource, Params, StaticParameters};
pub use services::{OptionEntry, OptionSource, OptionsService};
pub use workflow::{
    DependentStep, DependentStepError, ExecutionEvent, ExecutionObserver, LogObserver,
    MemoryObserver, NodeExecutor, Outcome,
};

pub use bison_types::{NodeDescription, NodeOperation, OutputItem, Resource};
