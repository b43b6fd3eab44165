pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8700;

pub const DEFAULT_SCANNER_HOST: &str = "localhost";
pub const DEFAULT_SCANNER_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_LICENSE_URL: &str = "https://license.scangate.dev";
pub const DEFAULT_LICENSE_TTL_SECS: u64 = 3_600;
pub const DEFAULT_LICENSE_TIMEOUT_SECS: u64 = 5;

/// Request bodies above this size are rejected before parsing.
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 5_000;

pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

pub const DEFAULT_PROFILE: &str = "standard";
