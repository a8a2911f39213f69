//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Configuration diagnostics grouped by attribute
//! - Attribute trees of a data source

use console::style;
use kbmanifest_core::AttributeEntry;
use kbmanifest_engine::{Diagnostic, Severity};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Grouped diagnostics for display
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Write diagnostics grouped by top-level attribute
    pub fn display(&self, out: &mut impl Write) -> io::Result<()> {
        let mut by_section: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            let attribute = diagnostic.attribute.as_deref().unwrap_or("(root)");
            let section = attribute.split(['.', '[']).next().unwrap_or(attribute);
            by_section.entry(section).or_default().push(diagnostic);
        }

        for (section, diagnostics) in by_section {
            writeln!(out)?;
            writeln!(out, "{}", style(section).cyan().bold())?;

            for diagnostic in diagnostics {
                let icon = match diagnostic.severity {
                    Severity::Error => style("✗").red(),
                    Severity::Warning => style("⚠").yellow(),
                };

                let path_display = match &diagnostic.attribute {
                    Some(path) => format!(" at {}", style(path).dim()),
                    None => String::new(),
                };

                writeln!(out, "  {} {}{}", icon, diagnostic.summary, path_display)?;

                if let Some(detail) = &diagnostic.detail {
                    writeln!(out, "    {} {}", style("hint:").blue(), detail)?;
                }
            }
        }

        Ok(())
    }

    /// Get summary counts
    pub fn summary(&self) -> (usize, usize) {
        let errors = self.diagnostics.iter().filter(|d| d.is_error()).count();
        (errors, self.diagnostics.len() - errors)
    }

    /// Write the summary line
    pub fn print_summary(&self, out: &mut impl Write) -> io::Result<()> {
        let (errors, warnings) = self.summary();
        if errors > 0 {
            writeln!(
                out,
                "{} Validation failed: {}, {}",
                style("✗").red().bold(),
                pluralize(errors, "error", "errors"),
                pluralize(warnings, "warning", "warnings")
            )
        } else if warnings > 0 {
            writeln!(
                out,
                "{} Validation passed with {}",
                style("⚠").yellow().bold(),
                pluralize(warnings, "warning", "warnings")
            )
        } else {
            writeln!(out, "{} Validation passed!", style("✓").green().bold())
        }
    }

    /// Check if there are any errors (not warnings)
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Write an attribute tree, one attribute per line
pub fn display_attributes(entries: &[AttributeEntry], out: &mut impl Write) -> io::Result<()> {
    for entry in entries {
        let name = entry.path.rsplit('.').next().unwrap_or(&entry.path);
        let indent = "  ".repeat(entry.depth + 1);
        let required = if entry.required {
            format!(" {}", style("required").red())
        } else {
            String::new()
        };

        writeln!(
            out,
            "{}{} {}{}",
            indent,
            style(name).bold(),
            style(format!("({})", entry.field_type)).dim(),
            required
        )?;

        if let Some(description) = &entry.description {
            writeln!(out, "{}  {}", indent, style(first_sentence(description)).dim())?;
        }
    }

    Ok(())
}

fn first_sentence(text: &str) -> &str {
    match text.find(". ") {
        Some(end) => &text[..=end],
        None => text,
    }
}

/// Format count with proper pluralization
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
