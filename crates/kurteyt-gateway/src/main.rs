mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use kurteyt_gateway::{App, AppState, SharedRepository};
use kurteyt_generator::RandomAlnumGenerator;
use kurteyt_redirector::{Resolver, ResolverConfig};
use kurteyt_shortener::ShortUrlService;
use kurteyt_storage::{DynamoDbRepository, InMemoryRepository, MySqlRepository};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{LogFormatArg, StorageBackendArg, CLI};

fn init_tracing(cli: &CLI) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match cli.log_format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

async fn build_repository(cli: &CLI) -> anyhow::Result<SharedRepository> {
    let repository: SharedRepository = match cli.storage {
        StorageBackendArg::InMemory => {
            warn!("records are kept in memory and lost on shutdown");
            Arc::new(InMemoryRepository::new())
        }
        StorageBackendArg::Mysql => {
            let dsn = cli
                .mysql_dsn
                .as_deref()
                .context("mysql DSN must be set for the mysql backend")?;
            let repository = MySqlRepository::connect(dsn)
                .await
                .context("failed to connect to mysql")?;
            if cli.init_schema {
                repository
                    .ensure_schema()
                    .await
                    .context("failed to create mysql schema")?;
            }
            Arc::new(repository)
        }
        StorageBackendArg::DynamoDb => {
            let table = cli
                .dynamodb_table
                .as_deref()
                .context("table name must be set for the dynamodb backend")?;
            let repository = DynamoDbRepository::connect(
                table,
                cli.dynamodb_region.clone(),
                cli.dynamodb_endpoint.clone(),
            )
            .await;
            if cli.init_schema {
                repository
                    .create_table()
                    .await
                    .context("failed to create dynamodb table")?;
            }
            Arc::new(repository)
        }
    };

    Ok(repository)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CLI::parse();
    init_tracing(&cli);

    info!(
        listen_addr = %cli.listen_addr,
        storage_backend = %cli.storage,
        redirect_status = %cli.redirect_status,
        "starting kurteyt gateway"
    );

    let repository = build_repository(&cli).await?;

    let shortener = ShortUrlService::with_system_clock(
        Arc::clone(&repository),
        RandomAlnumGenerator::new(),
    );
    let resolver = Resolver::new(
        repository,
        ResolverConfig::builder()
            .expired_redirect_url(cli.expired_redirect_url.as_str())
            .redirect_status(cli.redirect_status)
            .cache_max_age(cli.cache_max_age)
            .reserved_prefixes(cli.reserved_prefixes.clone())
            .build(),
    );
    let state = AppState::new(Arc::new(shortener), resolver, cli.public_base_url.as_str());

    let listener = tokio::net::TcpListener::bind(cli.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway is listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("gateway stopped");
    Ok(())
}
