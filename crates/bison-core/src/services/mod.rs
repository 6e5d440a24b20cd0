//! Services built on top of the transport

pub mod options;

pub use options::{OptionEntry, OptionSource, OptionsService};
