use std::fmt;

use super::runtime_env::RuntimeEnv;

/// Severity levels the database client is allowed to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `tracing` filter name for this level
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// How much detail goes into rendered database errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    /// `Display` only
    Minimal,
    /// Full `Debug` rendering, including nested sources
    Pretty,
}

impl ErrorFormat {
    pub fn render<E>(self, err: &E) -> String
    where
        E: fmt::Display + fmt::Debug + ?Sized,
    {
        match self {
            ErrorFormat::Minimal => err.to_string(),
            ErrorFormat::Pretty => format!("{err:?}"),
        }
    }
}

/// Construction options for the database client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub log: Vec<LogLevel>,
    pub error_format: ErrorFormat,
}

/// Targets the ORM stack logs under.
const ORM_TARGETS: [&str; 2] = ["sea_orm", "sqlx"];

impl ClientOptions {
    pub fn for_env(env: RuntimeEnv) -> Self {
        match env {
            RuntimeEnv::Prod => Self {
                log: vec![LogLevel::Warn, LogLevel::Error],
                error_format: ErrorFormat::Minimal,
            },
            RuntimeEnv::Dev => Self {
                log: vec![LogLevel::Info, LogLevel::Warn, LogLevel::Error],
                error_format: ErrorFormat::Pretty,
            },
        }
    }

    pub fn logs(&self, level: LogLevel) -> bool {
        self.log.contains(&level)
    }

    /// Per-statement logging is informational, so it follows the `Info` level.
    pub fn statement_logging(&self) -> bool {
        self.logs(LogLevel::Info)
    }

    /// Filter directive restricting the ORM targets to the enabled levels,
    /// e.g. `sea_orm=warn,sqlx=warn`.
    pub fn orm_log_directive(&self) -> String {
        let level = self
            .log
            .iter()
            .min()
            .map(|l| l.as_directive())
            .unwrap_or("off");

        ORM_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn test_prod_options_are_quiet() {
        let opts = ClientOptions::for_env(RuntimeEnv::Prod);
        assert_eq!(opts.log, vec![LogLevel::Warn, LogLevel::Error]);
        assert_eq!(opts.error_format, ErrorFormat::Minimal);
        assert!(!opts.statement_logging());
        assert_eq!(opts.orm_log_directive(), "sea_orm=warn,sqlx=warn");
    }

    #[test]
    fn test_dev_options_are_verbose() {
        let opts = ClientOptions::for_env(RuntimeEnv::Dev);
        assert!(opts.logs(LogLevel::Info));
        assert!(opts.logs(LogLevel::Warn));
        assert!(opts.logs(LogLevel::Error));
        assert_eq!(opts.error_format, ErrorFormat::Pretty);
        assert!(opts.statement_logging());
        assert_eq!(opts.orm_log_directive(), "sea_orm=info,sqlx=info");
    }

    #[test]
    fn test_empty_levels_turn_orm_logging_off() {
        let opts = ClientOptions {
            log: Vec::new(),
            error_format: ErrorFormat::Minimal,
        };
        assert_eq!(opts.orm_log_directive(), "sea_orm=off,sqlx=off");
    }

    #[test]
    fn test_error_format_rendering() {
        let err = DbErr::Custom("boom".to_string());
        assert_eq!(ErrorFormat::Minimal.render(&err), "Custom Error: boom");
        assert_eq!(ErrorFormat::Pretty.render(&err), "Custom(\"boom\")");
    }
}
