use std::env;
use std::fmt;

/// Environment variable selecting the runtime mode.
pub const APP_ENV_VAR: &str = "APP_ENV";

/// The only `APP_ENV` value that selects production mode.
pub const PRODUCTION_MARKER: &str = "production";

/// Process-wide runtime mode.
///
/// Read once at startup and passed explicitly to everything that depends on it.
/// Anything other than the exact production marker (including an unset
/// variable) is treated as development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeEnv {
    /// Production: quiet success path, minimal error detail
    Prod,
    /// Development/test: verbose logging, shared client reused across rebuilds
    Dev,
}

impl RuntimeEnv {
    /// Read the mode from `APP_ENV`.
    pub fn from_env() -> Self {
        Self::from_value(env::var(APP_ENV_VAR).ok().as_deref())
    }

    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(PRODUCTION_MARKER) => RuntimeEnv::Prod,
            _ => RuntimeEnv::Dev,
        }
    }

    pub fn is_prod(self) -> bool {
        self == RuntimeEnv::Prod
    }

    pub fn is_dev(self) -> bool {
        self == RuntimeEnv::Dev
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeEnv::Prod => "prod",
            RuntimeEnv::Dev => "dev",
        }
    }
}

impl fmt::Display for RuntimeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_only_exact_marker_selects_prod() {
        assert_eq!(RuntimeEnv::from_value(Some("production")), RuntimeEnv::Prod);
        assert_eq!(RuntimeEnv::from_value(None), RuntimeEnv::Dev);
        assert_eq!(RuntimeEnv::from_value(Some("")), RuntimeEnv::Dev);
        assert_eq!(RuntimeEnv::from_value(Some("development")), RuntimeEnv::Dev);
        assert_eq!(RuntimeEnv::from_value(Some("Production")), RuntimeEnv::Dev);
        assert_eq!(RuntimeEnv::from_value(Some("prod")), RuntimeEnv::Dev);
    }

    #[test]
    #[serial]
    fn test_from_env_reads_app_env() {
        env::set_var(APP_ENV_VAR, "production");
        assert!(RuntimeEnv::from_env().is_prod());

        env::set_var(APP_ENV_VAR, "staging");
        assert!(RuntimeEnv::from_env().is_dev());

        env::remove_var(APP_ENV_VAR);
        assert!(RuntimeEnv::from_env().is_dev());
    }
}
