//! Validate command - check a configuration against a data source

use console::style;
use std::path::PathBuf;

use super::{apply_default_namespace, load_configuration, Context};
use crate::display::{pluralize, ValidationReport};
use crate::error::{CliError, Result};

pub fn run(
    ctx: &Context,
    data_source: &str,
    files: &[PathBuf],
    set_values: &[String],
    json_output: bool,
) -> Result<()> {
    let ds = ctx.provider.data_source(data_source)?;

    let mut config = load_configuration(files, set_values)?;
    apply_default_namespace(
        &mut config,
        ds.schema().namespaced,
        ctx.config.default_namespace.as_deref(),
    );

    if !json_output {
        println!(
            "{} Validating configuration for {}",
            style("→").blue(),
            ds.type_name()
        );
    }

    let report = ValidationReport::new(ds.validate_config(&config));

    if json_output {
        let output = serde_json::json!({
            "valid": !report.has_errors(),
            "dataSource": ds.type_name(),
            "diagnostics": report.diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let mut stdout = std::io::stdout().lock();
        report.display(&mut stdout)?;
        println!();
        report.print_summary(&mut stdout)?;
    }

    if report.has_errors() {
        let (errors, _) = report.summary();
        return Err(CliError::validation(format!(
            "{} in configuration for {}",
            pluralize(errors, "error", "errors"),
            ds.type_name()
        )));
    }

    Ok(())
}
