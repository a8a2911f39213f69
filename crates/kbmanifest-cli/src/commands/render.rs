//! Render command - render a configuration to a manifest

use console::style;
use kbmanifest_engine::ReadRequest;
use std::fs;
use std::path::{Path, PathBuf};

use super::{apply_default_namespace, load_configuration, Context};
use crate::display::{pluralize, ValidationReport};
use crate::error::{CliError, Result};

pub fn run(
    ctx: &Context,
    data_source: &str,
    files: &[PathBuf],
    set_values: &[String],
    output: Option<&Path>,
    show_state: bool,
) -> Result<()> {
    let ds = ctx.provider.data_source(data_source)?;

    let mut config = load_configuration(files, set_values)?;
    apply_default_namespace(
        &mut config,
        ds.schema().namespaced,
        ctx.config.default_namespace.as_deref(),
    );

    let response = ds.read(ReadRequest { config });

    if response.has_errors() {
        let report = ValidationReport::new(response.diagnostics);
        let mut stderr = std::io::stderr().lock();
        report.display(&mut stderr)?;

        let (errors, _) = report.summary();
        let marshal_failed = report
            .diagnostics
            .iter()
            .any(|d| d.summary == "Unable to marshal model");
        return Err(if marshal_failed {
            CliError::render(format!("Unable to marshal model for {}", ds.type_name()))
        } else {
            CliError::validation_with_help(
                format!(
                    "{} in configuration for {}",
                    pluralize(errors, "error", "errors"),
                    ds.type_name()
                ),
                format!("Run `kbmanifest schema {}` to list its attributes", ds.type_name()),
            )
        });
    }

    if !response.diagnostics.is_empty() {
        let report = ValidationReport::new(response.diagnostics.clone());
        report.display(&mut std::io::stderr().lock())?;
    }

    let content = match (&response.state, response.yaml()) {
        (Some(state), _) if show_state => {
            let mut json = serde_json::to_string_pretty(state)?;
            json.push('\n');
            json
        }
        (_, Some(yaml)) => yaml.to_string(),
        _ => return Err(CliError::render("Data source returned no manifest")),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
            }
            fs::write(path, &content).map_err(|e| CliError::io(path, e))?;
            eprintln!(
                "{} Wrote {} to {}",
                style("✓").green(),
                ds.schema().kind,
                path.display()
            );
        }
        None => print!("{}", content),
    }

    Ok(())
}
