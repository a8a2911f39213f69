//! List command - list available data sources

use console::style;
use serde::Serialize;

use super::Context;
use crate::error::Result;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DataSourceInfo<'a> {
    name: &'a str,
    api_version: String,
    kind: &'a str,
    namespaced: bool,
}

/// Run the list command
pub fn run(ctx: &Context, output_json: bool) -> Result<()> {
    let data_sources: Vec<DataSourceInfo> = ctx
        .provider
        .data_sources()
        .map(|ds| DataSourceInfo {
            name: ds.type_name(),
            api_version: ds.schema().api_version(),
            kind: &ds.schema().kind,
            namespaced: ds.schema().namespaced,
        })
        .collect();

    if output_json {
        println!("{}", serde_json::to_string_pretty(&data_sources)?);
        return Ok(());
    }

    if data_sources.is_empty() {
        println!("No data sources available");
        return Ok(());
    }

    let width = data_sources.iter().map(|d| d.name.len()).max().unwrap_or(4);

    // Pad before styling; ANSI codes would break the column widths
    println!(
        "{} {} {}",
        style(format!("{:<width$}", "NAME")).bold(),
        style(format!("{:<28}", "API VERSION")).bold(),
        style("KIND").bold()
    );
    for ds in &data_sources {
        println!("{:<width$} {:<28} {}", ds.name, ds.api_version, ds.kind);
    }

    Ok(())
}
