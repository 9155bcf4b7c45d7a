//! Command implementations

mod discover;
mod extract;

use anyhow::Result;
use indicatif::ProgressBar;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use geobasket_core::config::{BasketConfig, CliConfigOverrides};
use geobasket_core::events::{BasketEvent, LoadErrorDetail};
use geobasket_discovery::{LayerBasket, MapHandle, VectorLayerHandle};
use geobasket_ows::HttpOwsClient;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_descriptors;
use crate::output::OutputWriter;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match cli.command {
        Commands::Discover(ref args) => discover::execute(&cli, args, &output).await,
        Commands::Extract(ref args) => extract::execute(&cli, args, &output).await,
    }
}

pub(crate) struct PassOutcome {
    pub basket: LayerBasket<HttpOwsClient>,
}

/// Run one full discovery pass over the configured descriptors.
///
/// Returns `None` (after a warning) when nothing is configured. Load errors
/// are reported as warnings once the pass has settled.
pub(crate) async fn run_pass(
    cli: &Cli,
    timeout_override: Option<u64>,
    batch_url_override: Option<String>,
    output: &OutputWriter,
) -> Result<Option<PassOutcome>> {
    let mut config = BasketConfig::with_defaults()
        .load_from_file(&cli.config)?
        .load_from_env();
    config.update_from_cli(CliConfigOverrides {
        request_timeout_secs: timeout_override,
        extractor_batch_url: batch_url_override,
        ..Default::default()
    });

    let descriptors = load_descriptors(&cli.config)?;
    if descriptors.is_empty() {
        output.warning("no services or layers configured; nothing to discover");
        return Ok(None);
    }

    let timeout = Duration::from_secs(config.request_timeout_secs.value);
    let client = Arc::new(HttpOwsClient::new(timeout)?);
    let basket = LayerBasket::new(client, config, descriptors);

    let load_errors: Arc<Mutex<Vec<LoadErrorDetail>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&load_errors);
    basket.subscribe(move |event| {
        if let BasketEvent::LoadError(detail) = event {
            sink.lock().unwrap().push(detail.clone());
        }
    });

    basket.create()?;

    let spinner = if output.is_json() {
        None
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_message("discovering layers...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    };

    basket.init(MapHandle(0), VectorLayerHandle(0))?;
    basket.wait_discovery().await?;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    for detail in load_errors.lock().unwrap().iter() {
        match &detail.layer {
            Some(layer) => {
                output.warning(format!("{} ({}): {}", layer, detail.service, detail.message))
            }
            None => output.warning(format!("{}: {}", detail.service, detail.message)),
        }
    }

    Ok(Some(PassOutcome { basket }))
}
