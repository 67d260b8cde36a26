use std::time::Duration;

use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

/// How long in-flight requests get to finish after Ctrl+C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

fn init_logging() {
    // load .env first so RUST_LOG / LOG_FORMAT take effect
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "movies-info", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "movies-info",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "movies-info", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "movies-info", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "movies-info",
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "movie info service starting"
    );

    rt.block_on(async move {
        let mut server_task = tokio::spawn(server::run(cfg));

        let outcome = tokio::select! {
            res = &mut server_task => res,
            _ = tokio::signal::ctrl_c() => {
                info!(service = "movies-info", event = "shutdown_signal", %service_id, pid, "draining connections");
                // open periodic streams never finish on their own; stop waiting after the grace period
                match tokio::time::timeout(SHUTDOWN_GRACE, &mut server_task).await {
                    Ok(res) => res,
                    Err(_) => {
                        warn!(service = "movies-info", event = "shutdown_timeout", "grace period elapsed; exiting");
                        server_task.abort();
                        return std::process::ExitCode::SUCCESS;
                    }
                }
            }
        };

        match outcome {
            Ok(Ok(())) => {
                info!(service = "movies-info", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Ok(Err(e)) => {
                error!(service = "movies-info", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
            Err(e) => {
                error!(service = "movies-info", event = "task_join_error", error = %e, "server task join error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
