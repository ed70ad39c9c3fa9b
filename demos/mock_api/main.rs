//! Mock Resource API
//!
//! Serves the console fixtures (operators, services, regions, devices) over the
//! resource API so that remote controllers have something to talk to:
//! - List with search, filters, sorting and pagination
//! - Create, update, delete and bulk delete
//!
//! Usage: `cargo run --example mock_api [config.yaml]`
//! (defaults to `demos/mock_api/console.yaml` when present)

use anyhow::Result;
use console::prelude::*;
use console::resources::{Device, Operator, Region, Service};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "demos/mock_api/console.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("console=debug,tower_http=info")),
        )
        .init();

    let config = load_config()?;
    let latency = std::env::var("MOCK_LATENCY_MS")
        .ok()
        .and_then(|ms| ms.parse::<u64>().ok())
        .map(Duration::from_millis);

    let builder = ServerBuilder::new()
        .register::<Operator>(source(&config, Operator::fixtures(), latency)?, specs::<Operator>(&config))?
        .register::<Service>(source(&config, Service::fixtures(), latency)?, specs::<Service>(&config))?
        .register::<Region>(source(&config, Region::fixtures(), latency)?, specs::<Region>(&config))?
        .register::<Device>(source(&config, Device::fixtures(), latency)?, specs::<Device>(&config))?;

    println!("🚀 Mock resource API on http://{}", config.server.bind);
    for collection in builder.collections() {
        println!("    GET|POST        /api/{collection}");
        println!("    GET|PUT|DELETE  /api/{collection}/{{id}}");
        println!("    POST            /api/{collection}/bulk-delete");
    }
    println!("    GET             /health");

    builder.serve(&config.server.bind).await
}

/// Load the config named on the command line, the bundled one, or the defaults
fn load_config() -> Result<ConsoleConfig> {
    let defaults = ConsoleConfig::default_config();
    match std::env::args().nth(1) {
        Some(path) => Ok(defaults.merge(ConsoleConfig::from_yaml_file(&path)?)),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            Ok(defaults.merge(ConsoleConfig::from_yaml_file(DEFAULT_CONFIG)?))
        }
        None => {
            tracing::info!("no config file found, using built-in resource config");
            Ok(defaults)
        }
    }
}

fn resource_config<R: Resource>(config: &ConsoleConfig) -> ResourceConfig {
    config
        .resource(R::collection_name())
        .cloned()
        .unwrap_or_else(|| ResourceConfig::for_resource::<R>(Vec::new()))
}

fn specs<R: Resource>(config: &ConsoleConfig) -> Vec<FilterSpec> {
    resource_config::<R>(config).filters
}

fn source<R: Resource>(
    config: &ConsoleConfig,
    fixtures: Vec<R>,
    latency: Option<Duration>,
) -> Result<InMemoryDataSource<R>> {
    let source = InMemoryDataSource::with_engine(resource_config::<R>(config).engine(), fixtures)?;
    Ok(match latency {
        Some(latency) => source.with_latency(latency),
        None => source,
    })
}
