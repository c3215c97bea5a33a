//! Constants for QX
//!
//! Endpoint defaults, retry policy defaults and execution limits.
//! Every option left unset falls back to a value defined here.

// ============================================================================
// Connection Defaults
// ============================================================================

pub mod connection {
    //! Defaults applied when a session is dialed

    use std::time::Duration;

    /// Default QX API endpoint
    pub const DEFAULT_URL: &str = "https://quantumexperience.ng.bluemix.net/api";

    /// Header identifying the calling application
    pub const CLIENT_APPLICATION_HEADER: &str = "x-qx-client-application";

    /// Default value of the client application header
    pub const DEFAULT_CLIENT_APPLICATION: &str = "qx-client-rs";

    /// Number of attempts every request gets
    pub const DEFAULT_RETRIES: usize = 5;

    /// Timeout applied to each HTTP request
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Base delay between counted retries (multiplied by the attempt number)
    pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);
}

// ============================================================================
// Execution Defaults and Limits
// ============================================================================

pub mod execution {
    //! Defaults and limits for experiments and jobs

    use std::time::Duration;

    /// Backend used when none is requested
    pub const DEFAULT_BACKEND: &str = "simulator";

    /// Shots used when none are requested
    pub const DEFAULT_SHOTS: u32 = 1;

    /// Maximum shots a job can be run for
    pub const MAX_SHOTS: u32 = 8192;

    /// Largest accepted seed (10 digits)
    pub const MAX_SEED: u64 = 9_999_999_999;

    /// Maximum time to wait on a job result
    pub const MAX_TIMEOUT: Duration = Duration::from_secs(300);

    /// Prefix of generated experiment names
    pub const DEFAULT_NAME_PREFIX: &str = "Experiment #";

    /// Code type marker sent with every submission
    pub const CODE_TYPE_QASM2: &str = "QASM2";
}

// ============================================================================
// Backend Markers
// ============================================================================

pub mod backend {
    //! Values the server uses to describe devices

    /// Status reported by devices that accept work
    pub const STATUS_ON: &str = "on";

    /// Canonical name of the trivial simulator
    pub const SIMULATOR_DEVICE: &str = "sim_trivial_2";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_limit_is_ten_digits() {
        assert_eq!(execution::MAX_SEED.to_string().len(), 10);
        assert_eq!((execution::MAX_SEED + 1).to_string().len(), 11);
    }

    #[test]
    fn test_connection_defaults() {
        assert_eq!(connection::DEFAULT_RETRIES, 5);
        assert_eq!(connection::DEFAULT_TIMEOUT.as_secs(), 30);
        assert!(connection::DEFAULT_URL.starts_with("https://"));
    }
}
