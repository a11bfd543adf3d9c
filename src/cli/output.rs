//! Output formatting for multiple formats
//!
//! Run reports and module listings can be printed as JSON, YAML or a
//! human-readable summary.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::modules::ModuleType;
use crate::pipeline::{PipelineReport, TargetBuckets};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// One declared module as seen by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub module_type: ModuleType,
    pub split: bool,
    pub path: PathBuf,
    pub declaration: String,
}

/// Everything `list` prints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleListing {
    pub registered_types: Vec<String>,
    pub modules: Vec<ModuleSummary>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &PipelineReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize report to YAML")
            }
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_listing(&self, listing: &ModuleListing) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(listing)
                .context("Failed to serialize module listing to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(listing).context("Failed to serialize module listing to YAML")
            }
            OutputFormat::Human => Ok(self.format_listing_human(listing)),
        }
    }

    fn format_report_human(&self, report: &PipelineReport) -> String {
        let mut output = String::new();

        output.push_str("\u{2713} Module Generation Result\n");
        output.push_str(&"\u{2501}".repeat(42));
        output.push_str("\n\n");

        output.push_str(&format!(
            "Generated:  {}\n",
            list_or_none(&report.generated)
        ));
        output.push_str(&format!("Skipped:    {}\n\n", list_or_none(&report.skipped)));

        output.push_str("Modules:\n");
        push_buckets(&mut output, &report.modules);
        output.push('\n');

        output.push_str("Append Files:\n");
        for (i, append) in report.append_files.iter().enumerate() {
            let connector = tree_connector(i, report.append_files.len());
            let state = if append.written { "written" } else { "unchanged" };
            output.push_str(&format!(
                "{}\u{2500} {:<7} {} ({})\n",
                connector,
                append.target,
                append.path.display(),
                state
            ));
        }

        if !report.build_lists.is_empty() {
            output.push_str("\nBuild File Lists:\n");
            for (i, list) in report.build_lists.iter().enumerate() {
                let connector = tree_connector(i, report.build_lists.len());
                output.push_str(&format!(
                    "{}\u{2500} {} ({} files)\n",
                    connector,
                    list.target.display(),
                    list.files
                ));
            }
        }

        output
    }

    fn format_listing_human(&self, listing: &ModuleListing) -> String {
        let mut output = String::new();

        output.push_str("Registered module types:\n");
        for (i, name) in listing.registered_types.iter().enumerate() {
            let connector = tree_connector(i, listing.registered_types.len());
            output.push_str(&format!("{}\u{2500} {}\n", connector, name));
        }

        output.push_str("\nDeclared modules:\n");
        if listing.modules.is_empty() {
            output.push_str("\u{2514}\u{2500} (none)\n");
        }
        for (i, module) in listing.modules.iter().enumerate() {
            let connector = tree_connector(i, listing.modules.len());
            let split = if module.split { ", split" } else { "" };
            output.push_str(&format!(
                "{}\u{2500} {} [{}{}] {} via {}\n",
                connector,
                module.name,
                module.module_type,
                split,
                module.path.display(),
                module.declaration
            ));
        }

        output
    }
}

fn tree_connector(index: usize, len: usize) -> &'static str {
    if index + 1 == len {
        "\u{2514}"
    } else {
        "\u{251C}"
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn push_buckets(output: &mut String, buckets: &TargetBuckets) {
    for (i, target) in ModuleType::ALL.iter().enumerate() {
        let connector = tree_connector(i, ModuleType::ALL.len());
        output.push_str(&format!(
            "{}\u{2500} {:<7} {}\n",
            connector,
            target,
            list_or_none(buckets.get(*target))
        ));
    }
}
