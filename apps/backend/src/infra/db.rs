use sea_orm::{ConnectOptions, Database};
use tracing::info;

use crate::config::client::ClientOptions;
use crate::config::db::DbSettings;
use crate::config::runtime_env::RuntimeEnv;
use crate::db::client::DbClient;
use crate::error::AppError;

/// Build the database client for `env`.
///
/// The pool connects lazily, so an unreachable server surfaces on the first
/// operation rather than here. Only malformed settings fail construction.
pub async fn build_client(env: RuntimeEnv, settings: &DbSettings) -> Result<DbClient, AppError> {
    settings.validate()?;

    let options = ClientOptions::for_env(env);
    let safe_url = sanitize_db_url(&settings.url);

    let mut opt = ConnectOptions::new(settings.url.clone());
    opt.max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .connect_timeout(settings.connect_timeout())
        .acquire_timeout(settings.connect_timeout())
        .idle_timeout(settings.idle_timeout())
        .sqlx_logging(options.statement_logging())
        .connect_lazy(true);

    let conn = Database::connect(opt).await.map_err(|e| {
        AppError::config(format!("invalid database settings for {safe_url}: {e}"))
    })?;

    info!(
        env = %env,
        url = %safe_url,
        max_connections = settings.max_connections,
        "db_client=built lazy=true"
    );

    Ok(DbClient::new(conn, env, options))
}

/// Mask the password component of a connection URL for logging.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth_part, host_part)) = url.rsplit_once('@') else {
        return url.to_string();
    };
    let Some(scheme_end) = auth_part.find("://") else {
        return url.to_string();
    };

    match auth_part[scheme_end + 3..].find(':') {
        Some(colon) => {
            let user_end = scheme_end + 3 + colon;
            format!("{}:***@{}", &auth_part[..user_end], host_part)
        }
        None => url.to_string(),
    }
}
