//! Session token authentication service

use std::io::read_to_string;
use std::time::Duration;

use actix_web::{App, HttpServer};
use clap::Parser;
use color_eyre::Result;
use session_core::SessionId;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::config::{Config, LogFormat};
use crate::model::Model;
use crate::opt::{Command, Opt};

mod cleanup;
mod config;
mod model;
mod opt;
mod service;

/// Initializes tracing collection
fn setup_tracing(config: config::Logging) -> Result<()> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let filter_layer = config
        .filters
        .into_iter()
        .fold(filter_layer, |layer, filter| layer.add_directive(filter));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Opt {
        config: mut config_file,
        command,
    } = Opt::parse();

    let config = read_to_string(&mut config_file)?;
    let config: Config = toml::from_str(&config)?;

    setup_tracing(config.logging.clone())?;
    color_eyre::install()?;

    info!(
        config = ?config_file.path().path(),
        "Tracing initialized, setting up a service"
    );

    let model = Model::with_config(config.db.clone(), config.sessions.clone()).await?;

    match command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, model).await?,
        Command::Create => {
            let token = model.sessions().create_session().await?;
            println!("{}", token.expose());
        }
        Command::Validate { token } => {
            let session = model.sessions().validate_token(&token).await?;
            println!("{}", serde_json::to_string_pretty(&session.view())?);
        }
        Command::Revoke { id } => {
            model.sessions().revoke_session(&SessionId::from(id)).await?;
        }
        Command::Purge => {
            let purged = model.sessions().purge_expired().await?;
            println!("{purged}");
        }
    }

    Ok(())
}

/// Hosts the HTTP service until it is stopped
async fn serve(config: Config, model: Model) -> Result<()> {
    let sweep = match config.sessions.cleanup_interval_seconds {
        0 => None,
        secs => Some(cleanup::start_expiration_sweep(
            model.clone(),
            Duration::from_secs(secs),
        )),
    };

    let service_config = service::configure(model);
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(service_config.clone())
    })
    .bind(config.host)?
    .run()
    .await?;

    info!("Service stopped, tearing down");
    if let Some(sweep) = sweep {
        sweep.abort();
    }

    Ok(())
}
