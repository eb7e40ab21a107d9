use anyhow::Context;
use clap::Parser;
use solvera::{Application, Config, config::Args, telemetry};
use tokio::signal;
use tracing::{debug, error, info};

/// Resolves on the first of Ctrl+C or (on unix) SIGTERM, the signal the hosting platform sends
/// before stopping a deployment.
async fn wait_for_stop() -> anyhow::Result<&'static str> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).context("installing SIGTERM handler")?;
        tokio::select! {
            result = signal::ctrl_c() => result.map(|_| "ctrl-c").context("listening for Ctrl+C"),
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.context("listening for Ctrl+C")?;
        Ok("ctrl-c")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;
    if args.validate {
        println!("Configuration in {} is valid.", args.config);
        return Ok(());
    }

    solvera::install_crypto_provider();
    telemetry::init_telemetry(config.enable_otel_export)?;
    debug!(?args, "Starting");

    let app = Application::new(config).await?;
    app.serve(async {
        match wait_for_stop().await {
            Ok(reason) => info!(reason, "Stopping, draining open requests"),
            // without signal handling, run until the process is killed
            Err(e) => {
                error!("{e:#}");
                std::future::pending::<()>().await;
            }
        }
    })
    .await
}
