/// HTTP statuses treated as transient upstream failures.
pub const RETRYABLE_HTTP_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

pub const DEFAULT_RPC_RETRIES: u32 = 2;
pub const DEFAULT_RPC_INITIAL_BACKOFF_MS: u64 = 500;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_HTTP_MAX_CONNECTIONS: u32 = 12;

/// Environment variable holding the shared provider credential.
pub const SHARED_PROVIDER_CREDENTIAL_ENV: &str = "INFURA_PROJECT_ID";

/// Shared provider URL; `{network}` and `{project_id}` are substituted.
pub const SHARED_PROVIDER_URL_TEMPLATE: &str = "https://{network}.infura.io/v3/{project_id}";

pub const JSONRPC_VERSION: &str = "2.0";
