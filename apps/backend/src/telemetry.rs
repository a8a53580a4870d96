use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use db_supervisor::config::{ClientOptions, RuntimeEnv};

/// Install the global subscriber. `RUST_LOG` overrides the computed filter.
pub fn init_tracing(env: RuntimeEnv, options: &ClientOptions) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,actix_web=info,{}",
            options.orm_log_directive()
        ))
    });

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    match env {
        RuntimeEnv::Prod => registry.with(fmt_layer.json()).init(),
        RuntimeEnv::Dev => registry.with(fmt_layer).init(),
    }
}
