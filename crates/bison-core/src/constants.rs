/// Node constants

/// Credential type name the host stores the server URL and token under
pub const CREDENTIAL_NAME: &str = "emailBisonApi";

/// Server used when the credentials do not name one
pub const DEFAULT_SERVER_URL: &str = "https://send.topoffunnel.com";

/// Request timeout applied by the HTTP client
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default page size for "get many" operations when not returning all
pub const DEFAULT_LIMIT: u64 = 50;

/// Upper bound on pages followed when returning all records
pub const MAX_PAGES: u32 = 500;

/// Page size requested by dropdown option loaders
pub const OPTIONS_PAGE_SIZE: u64 = 100;
