use anyhow::{Context, Result};

use geobasket_discovery::build_export_request;

use crate::cli::{Cli, ExtractArgs};
use crate::commands::run_pass;
use crate::output::OutputWriter;

pub async fn execute(cli: &Cli, args: &ExtractArgs, output: &OutputWriter) -> Result<()> {
    let Some(outcome) = run_pass(cli, args.timeout, args.batch_url.clone(), output).await? else {
        return Ok(());
    };
    let basket = outcome.basket;

    if args.all {
        basket.select_all_layers();
    }

    let count = basket.selected_layers_count();
    if count == 0 {
        output.warning("the extraction basket is empty; nothing to submit");
        return Ok(());
    }

    if args.dry_run {
        let tree = basket.tree().context("no discovery pass has been run")?;
        if let Some(request) = build_export_request(&tree, &args.email)? {
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        return Ok(());
    }

    match basket.extract(&args.email, None).await {
        Ok(true) => {
            output.success(format!(
                "extraction request for {} layer(s) submitted; results will be emailed to {}",
                count, args.email
            ));
            Ok(())
        }
        Ok(false) => Ok(()),
        Err(e) => {
            output.error(&e);
            Err(e.into())
        }
    }
}
