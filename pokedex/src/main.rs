mod config;

use clap::{Args, Parser, Subcommand};
use config::{CommonConfig, Config};
use explorer::{CatalogClient, QueryInputs, UnifiedQuery};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pokedex", about = "Creature catalog service and explorer")]
struct Cli {
    #[arg(long, default_value = "pokedex.yaml")]
    config_file: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the catalog query and admin listeners.
    Catalog,
    /// Resolve a single query against a running catalog and print the view.
    Explore(ExploreArgs),
}

#[derive(Args)]
struct ExploreArgs {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    url: String,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    special: Option<String>,
    #[arg(long = "type")]
    type_name: Option<String>,
    #[arg(long)]
    pokedex: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = explorer::selector::DEFAULT_PAGE_SIZE)]
    page_size: u32,
}

fn init_observability(common: &CommonConfig) -> Option<sentry::ClientInitGuard> {
    let level = common
        .logging
        .as_ref()
        .map(|l| l.level.as_str())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let dsn = common.logging.as_ref().and_then(|l| l.sentry_dsn.clone());
    let guard = dsn.map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    if let Some(metrics_config) = &common.metrics {
        let recorder = metrics_exporter_statsd::StatsdBuilder::from(
            metrics_config.statsd_host.clone(),
            metrics_config.statsd_port,
        )
        .build(Some(metrics_config.prefix.as_str()));

        match recorder {
            Ok(recorder) => {
                if let Err(e) = metrics::set_global_recorder(recorder) {
                    tracing::warn!(error = %e, "Metrics recorder already installed");
                } else {
                    shared::metrics_defs::describe_all(catalog::metrics_defs::ALL_METRICS);
                }
            }
            Err(e) => tracing::error!(error = %e, "Could not build statsd recorder"),
        }
    }

    guard
}

/// Prints the resulting view; returns whether the query succeeded.
async fn explore(args: ExploreArgs) -> bool {
    let client = CatalogClient::url(args.url);
    let inputs = QueryInputs {
        search: args.search,
        special: args.special,
        type_name: args.type_name,
        pokedex: args.pokedex,
        region: args.region,
    };

    let mut query = UnifiedQuery::new(args.page_size);
    query.set_inputs(&inputs);
    query.set_page(args.page);
    let view = query.refresh(&client).await;

    match serde_json::to_string_pretty(&view) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            tracing::error!(error = %e, "Could not render query view");
            return false;
        }
    }
    view.error.is_none()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_file) {
        Ok(config) => Some(config),
        Err(e) => {
            // Explore only needs a catalog URL; it can run without a file.
            if matches!(cli.command, CliCommand::Catalog) {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
            None
        }
    };

    let common = config
        .as_ref()
        .map(|c| c.common.clone())
        .unwrap_or_default();
    let _sentry = init_observability(&common);

    match cli.command {
        CliCommand::Catalog => {
            let Some(catalog_config) = config.and_then(|c| c.catalog) else {
                tracing::error!("No catalog section in config");
                return ExitCode::FAILURE;
            };

            tracing::info!("Starting catalog");
            if let Err(e) = catalog::run(catalog_config).await {
                tracing::error!(error = %e, "Catalog exited with error");
                return ExitCode::FAILURE;
            }
        }
        CliCommand::Explore(args) => {
            if !explore(args).await {
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
