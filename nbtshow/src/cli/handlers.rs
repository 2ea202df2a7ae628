//! Command execution handlers

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use nbtview_core::{compression, fast_find_int, fast_find_long, io, NamedTag};
use nbtview_region::{chunk_index, local_coords, RegionFile};

use crate::config::CliConfig;
use crate::format::{
    format_check_report, format_document, format_region_info, format_structured, format_success,
    format_tag, CheckReport, ChunkProblem, ChunkSummary, OutputFormat as Format, RenderOptions,
};

use super::commands::*;

fn read_document(file: &Path, config: &CliConfig) -> Result<NamedTag> {
    let data =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    io::read_from_bytes_with_max_depth(&data, config.max_depth)
        .with_context(|| format!("Failed to decode {}", file.display()))
}

/// Handle show command
pub fn handle_show(file: &Path, config: &CliConfig) -> Result<()> {
    let opts = RenderOptions::from_config(config)?;
    let doc = read_document(file, config)?;
    println!("{}", format_document(&doc, &opts)?);
    Ok(())
}

/// Handle get command
pub fn handle_get(file: &Path, path: &str, config: &CliConfig) -> Result<()> {
    let opts = RenderOptions::from_config(config)?;
    let doc = read_document(file, config)?;
    let tag = doc
        .tag
        .lookup(path)
        .ok_or_else(|| anyhow::anyhow!("No tag at path '{}'", path))?;
    println!("{}", format_tag(tag, &opts)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct FoundTag<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    tag_type: &'static str,
    value: i64,
    offset: usize,
}

/// Handle find command
///
/// Works on the raw bytes, so it still finds values in files too damaged or
/// too deep to decode.
pub fn handle_find(file: &Path, name: &str, kind: SearchKind, config: &CliConfig) -> Result<()> {
    let opts = RenderOptions::from_config(config)?;
    let raw =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let data = if compression::has_compression_header(&raw) {
        compression::decompress(&raw)
            .with_context(|| format!("Failed to decompress {}", file.display()))?
    } else {
        raw
    };

    let (tag_type, hit) = match kind {
        SearchKind::Int => ("Int", fast_find_int(&data, name).map(|(o, v)| (o, i64::from(v)))),
        SearchKind::Long => ("Long", fast_find_long(&data, name)),
    };
    let (offset, value) =
        hit.ok_or_else(|| anyhow::anyhow!("No {} tag named '{}' found", tag_type, name))?;

    match opts.format {
        Format::Snbt => println!("Found '{}' = {} at {}", name, value, offset),
        _ => {
            let found = FoundTag {
                name,
                tag_type,
                value,
                offset,
            };
            println!("{}", format_structured(&found, &opts)?);
        }
    }
    Ok(())
}

/// Handle region subcommands
pub fn handle_region(command: RegionCommands, config: &CliConfig) -> Result<()> {
    let opts = RenderOptions::from_config(config)?;
    match command {
        RegionCommands::Info { file } => {
            let region = open_region(&file)?;
            let chunks: Vec<ChunkSummary> = region
                .present_chunks()
                .into_iter()
                .map(|index| {
                    let (x, z) = local_coords(index);
                    let location = region.location(index)?;
                    Ok(ChunkSummary {
                        index,
                        x,
                        z,
                        offset: location.offset,
                        sector_count: location.sector_count,
                        timestamp: location.timestamp,
                    })
                })
                .collect::<Result<_>>()?;
            println!("{}", format_region_info(region.name(), &chunks, &opts)?);
        }
        RegionCommands::Chunk { file, index, x, z } => {
            let index = match (index, x, z) {
                (Some(index), _, _) => index,
                (None, Some(x), Some(z)) => chunk_index(x, z),
                _ => anyhow::bail!("Give a chunk index or both --x and --z"),
            };
            let mut region = open_region(&file)?;
            let chunk = region
                .chunk_data(index)?
                .ok_or_else(|| anyhow::anyhow!("Chunk {} is not present in {}", index, region.name()))?;
            let doc = chunk
                .decode_with_max_depth(config.max_depth)
                .with_context(|| format!("Failed to decode chunk {}", index))?;
            println!("{}", format_document(&doc, &opts)?);
        }
        RegionCommands::Check { file } => {
            let mut region = open_region(&file)?;
            let report = check_region(&mut region, config.max_depth);
            println!("{}", format_check_report(&report, &opts)?);
            if !report.is_clean() {
                anyhow::bail!(
                    "{} of {} chunks failed to decode",
                    report.failures.len(),
                    report.checked
                );
            }
        }
    }
    Ok(())
}

fn open_region(file: &Path) -> Result<RegionFile<std::io::BufReader<std::fs::File>>> {
    RegionFile::open(file).with_context(|| format!("Failed to open region {}", file.display()))
}

fn check_region<R: std::io::Read + std::io::Seek>(
    region: &mut RegionFile<R>,
    max_depth: usize,
) -> CheckReport {
    let present = region.present_chunks();
    let mut failures = Vec::new();
    for &index in &present {
        let decoded = region
            .chunk_data(index)
            .and_then(|chunk| match chunk {
                Some(chunk) => chunk.decode_with_max_depth(max_depth).map(|_| ()),
                None => Ok(()),
            });
        if let Err(e) = decoded {
            warn!(chunk = index, "Chunk failed to decode: {}", e);
            let corrupt_sector = match region.inflate_chunk(index) {
                Ok(Some((_, status))) => status.corrupt_sector,
                _ => None,
            };
            let (x, z) = local_coords(index);
            failures.push(ChunkProblem {
                index,
                x,
                z,
                error: e.to_string(),
                corrupt_sector,
            });
        }
    }
    debug!(checked = present.len(), failed = failures.len(), "Region check done");
    CheckReport {
        region: region.name().to_string(),
        checked: present.len(),
        failures,
    }
}

/// Handle config subcommands
pub fn handle_config(
    command: ConfigCommands,
    current_config: &CliConfig,
    config_path: &Path,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => match format {
            OutputFormat::Json | OutputFormat::Yaml => {
                let opts = RenderOptions {
                    format: format.into(),
                    pretty: true,
                    ..RenderOptions::default()
                };
                println!("{}", format_structured(current_config, &opts)?);
            }
            OutputFormat::Snbt => {
                println!("CLI Configuration ({}):", config_path.display());
                println!("{:<20} Value", "Setting");
                println!("{}", "-".repeat(40));
                println!("{:<20} {}", "Output Format", current_config.output_format);
                println!("{:<20} {}", "Pretty", current_config.pretty);
                println!("{:<20} {}", "Indent", current_config.indent);
                println!("{:<20} {}", "Max Depth", current_config.max_depth);
                println!("{:<20} {}", "Verbose", current_config.verbose);
            }
        },
        ConfigCommands::Set { key, value } => {
            // Only the file's own settings are saved, not env or flag overrides
            let mut config = CliConfig::load_from(config_path)?;
            config.set(&key, &value)?;
            config.save_to(config_path)?;
            println!("{}", format_success(&format!("Set {} = {}", key, value)));
        }
        ConfigCommands::Reset => {
            CliConfig::default().save_to(config_path)?;
            println!("{}", format_success("Configuration reset to defaults"));
        }
    }

    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
