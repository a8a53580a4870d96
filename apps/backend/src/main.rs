use actix_web::{web, App, HttpServer};
use db_supervisor::config::{ClientOptions, DbSettings, RuntimeEnv};
use db_supervisor::db::shared_client::ClientRegistry;
use db_supervisor::infra::state::build_state;
use db_supervisor::lifecycle::{drain_or_abort, wait_for_signal, DrainOutcome, ShutdownController};
use db_supervisor::middleware::request_log::RequestLog;
use db_supervisor::routes;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Read once; everything downstream receives it explicitly
    let env = RuntimeEnv::from_env();
    telemetry::init_tracing(env, &ClientOptions::for_env(env));

    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let db_settings = match DbSettings::from_env(env) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_env(env)
        .with_db(db_settings)
        .with_registry(ClientRegistry::global())
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    let Some(client) = app_state.db().cloned() else {
        eprintln!("❌ Application state has no database client");
        std::process::exit(1);
    };
    let shutdown = ShutdownController::new(client);

    info!(env = %env, "Starting backend on http://{}:{}", host, port);

    let data = web::Data::new(app_state);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLog::new(env))
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .disable_signals()
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();
    let on_signal = shutdown.clone();
    actix_web::rt::spawn(async move {
        let signal = match wait_for_signal().await {
            Ok(signal) => signal,
            Err(e) => {
                error!("Failed to install signal handlers: {e}");
                return;
            }
        };

        // Stop accepting and drain in-flight requests before the pool closes
        let drain = on_signal.on_signal_after(signal, handle.stop(true));
        if let DrainOutcome::Interrupted(second) = drain_or_abort(drain, wait_for_signal()).await {
            error!("Received {second} during shutdown, exiting without draining");
            std::process::exit(130);
        }
    });

    let result = server.await;
    shutdown.before_exit().await;
    result
}
