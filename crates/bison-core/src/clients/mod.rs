//! Client modules for the EmailBison API

pub mod emailbison;
pub mod transport;

pub use emailbison::EmailBisonClient;
pub use transport::{ApiRequest, ApiTransport, HttpMethod};
