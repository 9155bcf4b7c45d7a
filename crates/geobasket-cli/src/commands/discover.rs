use anyhow::{Context, Result};
use serde::Serialize;
use tabled::Tabled;

use geobasket_core::models::{ItemId, ItemKind, LayerTree};

use crate::cli::{Cli, DiscoverArgs};
use crate::commands::run_pass;
use crate::output::OutputWriter;

#[derive(Tabled, Serialize)]
struct TreeRow {
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Export")]
    export: String,
    #[tabled(rename = "Basket")]
    checked: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn push_rows(tree: &LayerTree, parent: ItemId, depth: usize, rows: &mut Vec<TreeRow>) {
    for id in tree.children_sorted(parent) {
        let Some(item) = tree.get(id) else { continue };
        let indent = "  ".repeat(depth);

        match &item.kind {
            ItemKind::Group(group) => {
                rows.push(TreeRow {
                    name: format!("{}{}", indent, item.display_name),
                    kind: if group.service.is_some() { "service" } else { "group" }.to_string(),
                    export: "-".to_string(),
                    checked: "-".to_string(),
                    status: match &group.disabled_reason {
                        Some(reason) => format!("error: {}", reason),
                        None => "ok".to_string(),
                    },
                });
                push_rows(tree, id, depth + 1, rows);
            }
            ItemKind::Leaf(leaf) => {
                let export = leaf
                    .export
                    .as_ref()
                    .and_then(|export| export.classification.as_ref())
                    .map(|c| c.ows_type.to_string())
                    .unwrap_or_else(|| "-".to_string());
                rows.push(TreeRow {
                    name: format!("{}{}", indent, item.display_name),
                    kind: if leaf.is_global_properties { "defaults" } else { "layer" }.to_string(),
                    export,
                    checked: if leaf.checked { "yes" } else { "-" }.to_string(),
                    status: match &leaf.disabled_reason {
                        Some(reason) => format!("error: {}", reason),
                        None => "ok".to_string(),
                    },
                });
            }
        }
    }
}

pub async fn execute(cli: &Cli, args: &DiscoverArgs, output: &OutputWriter) -> Result<()> {
    let Some(outcome) = run_pass(cli, args.timeout, None, output).await? else {
        return Ok(());
    };

    let tree = outcome.basket.tree().context("no discovery pass has been run")?;
    let mut rows = Vec::new();
    push_rows(&tree, tree.root(), 0, &mut rows);
    output.table(&rows);

    output.success(format!(
        "{} layer(s) in the extraction basket",
        outcome.basket.selected_layers_count()
    ));
    Ok(())
}
