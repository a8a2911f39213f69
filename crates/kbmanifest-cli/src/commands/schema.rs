//! Schema command - show the attributes of a data source

use console::style;
use kbmanifest_core::YAML_ATTRIBUTE;

use super::Context;
use crate::display::display_attributes;
use crate::error::Result;

pub fn run(ctx: &Context, data_source: &str, json_schema: bool) -> Result<()> {
    let ds = ctx.provider.data_source(data_source)?;

    if json_schema {
        println!("{}", serde_json::to_string_pretty(ds.json_schema())?);
        return Ok(());
    }

    let schema = ds.schema();
    println!("{} {}", style("→").blue(), style(ds.type_name()).cyan().bold());
    println!(
        "  {} {} ({})",
        schema.api_version(),
        schema.kind,
        if schema.namespaced {
            "namespaced"
        } else {
            "cluster-scoped"
        }
    );
    if let Some(description) = &schema.description {
        println!("  {}", style(description).dim());
    }
    println!();

    display_attributes(&schema.attributes(), &mut std::io::stdout().lock())?;
    println!(
        "  {} {} {}",
        style(YAML_ATTRIBUTE).bold(),
        style("(string)").dim(),
        style("computed").green()
    );

    Ok(())
}
