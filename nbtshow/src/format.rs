//! Output formatting utilities for the CLI
//!
//! Renders tags as SNBT, JSON or YAML, and region summaries as tables.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use nbtview_core::{snbt, NamedTag, Tag};

use crate::config::CliConfig;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Snbt,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "snbt" => Ok(OutputFormat::Snbt),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(anyhow::anyhow!("Unknown output format '{}'", other)),
        }
    }
}

/// How tags and reports are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Snbt,
            pretty: false,
            indent: 2,
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &CliConfig) -> Result<Self> {
        Ok(Self {
            format: config.output_format.parse()?,
            pretty: config.pretty,
            indent: config.indent,
        })
    }
}

/// Serialize any value as JSON or YAML
///
/// SNBT has no meaning for arbitrary values, so it falls back to JSON.
pub fn format_structured<T: Serialize + ?Sized>(value: &T, opts: &RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?.trim_end().to_string()),
        OutputFormat::Json | OutputFormat::Snbt if opts.pretty => {
            Ok(serde_json::to_string_pretty(value)?)
        }
        OutputFormat::Json | OutputFormat::Snbt => Ok(serde_json::to_string(value)?),
    }
}

/// Render a single tag
pub fn format_tag(tag: &Tag, opts: &RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Snbt if opts.pretty => Ok(snbt::to_snbt_pretty(tag, opts.indent)),
        OutputFormat::Snbt => Ok(snbt::to_snbt(tag)),
        _ => format_structured(tag, opts),
    }
}

/// Render a whole document with its root name
pub fn format_document(doc: &NamedTag, opts: &RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Snbt => Ok(format!(
            "root_name: {}\nroot_tag: {}",
            doc.name,
            format_tag(&doc.tag, opts)?
        )),
        _ => format_structured(doc, opts),
    }
}

/// Render a chunk timestamp; zero means never written
pub fn format_timestamp(timestamp: u32) -> String {
    if timestamp == 0 {
        return "-".to_string();
    }
    DateTime::<Utc>::from_timestamp(i64::from(timestamp), 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// One present chunk of a region
#[derive(Debug, Clone, Serialize)]
pub struct ChunkSummary {
    pub index: usize,
    pub x: i32,
    pub z: i32,
    pub offset: u32,
    pub sector_count: u8,
    pub timestamp: u32,
}

/// Format the chunk listing of a region
pub fn format_region_info(
    name: &str,
    chunks: &[ChunkSummary],
    opts: &RenderOptions,
) -> Result<String> {
    if opts.format != OutputFormat::Snbt {
        return format_structured(chunks, opts);
    }

    #[derive(Tabled)]
    struct ChunkRow {
        #[tabled(rename = "Index")]
        index: usize,
        #[tabled(rename = "X")]
        x: i32,
        #[tabled(rename = "Z")]
        z: i32,
        #[tabled(rename = "Sector")]
        offset: u32,
        #[tabled(rename = "Sectors")]
        sector_count: u8,
        #[tabled(rename = "Last Modified")]
        modified: String,
    }

    let heading = format!("Region {}: {} chunks present", name, chunks.len());
    if chunks.is_empty() {
        return Ok(heading.bold().to_string());
    }

    let rows = chunks.iter().map(|c| ChunkRow {
        index: c.index,
        x: c.x,
        z: c.z,
        offset: c.offset,
        sector_count: c.sector_count,
        modified: format_timestamp(c.timestamp),
    });
    let table = Table::new(rows).with(Style::rounded()).to_string();
    Ok(format!("{}\n{}", heading.bold(), table))
}

/// A chunk that failed to decode
#[derive(Debug, Clone, Serialize)]
pub struct ChunkProblem {
    pub index: usize,
    pub x: i32,
    pub z: i32,
    pub error: String,
    /// Sector, counted from the chunk's first, where inflation failed
    pub corrupt_sector: Option<usize>,
}

/// Outcome of decoding every chunk of a region
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub region: String,
    pub checked: usize,
    pub failures: Vec<ChunkProblem>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Format a region check report
pub fn format_check_report(report: &CheckReport, opts: &RenderOptions) -> Result<String> {
    if opts.format != OutputFormat::Snbt {
        return format_structured(report, opts);
    }

    let ok = report.checked - report.failures.len();
    let summary = format!(
        "Checked {} chunks in {}: {} ok, {} failed",
        report.checked,
        report.region,
        ok,
        report.failures.len()
    );
    if report.is_clean() {
        return Ok(format_success(&summary));
    }

    #[derive(Tabled)]
    struct ProblemRow {
        #[tabled(rename = "Index")]
        index: usize,
        #[tabled(rename = "X")]
        x: i32,
        #[tabled(rename = "Z")]
        z: i32,
        #[tabled(rename = "Error")]
        error: String,
        #[tabled(rename = "Bad Sector")]
        sector: String,
    }

    let rows = report.failures.iter().map(|p| ProblemRow {
        index: p.index,
        x: p.x,
        z: p.z,
        error: p.error.red().to_string(),
        sector: p
            .corrupt_sector
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
    });
    let table = Table::new(rows).with(Style::rounded()).to_string();
    Ok(format!("{}\n{}", format_failure(&summary), table))
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

/// Format failure message
pub fn format_failure(message: &str) -> String {
    format!("{} {}", "✗".red().bold(), message)
}
