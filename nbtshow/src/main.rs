//! nbtshow
//!
//! Command-line viewer for NBT and region files.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use nbtshow::cli::{
    generate_completion, handle_config, handle_find, handle_get, handle_region, handle_show, Cli,
    Commands, ConfigCommands, OutputFormat,
};
use nbtshow::config::CliConfig;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path: PathBuf = cli.config.clone().unwrap_or_else(CliConfig::default_path);

    // Build configuration using priority chain: defaults → file → env → CLI args
    let config = match build_config(&cli, &config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            eprintln!(
                "Run `nbtshow config reset` to restore the defaults, or pass --no-config to ignore {}",
                config_path.display()
            );
            std::process::exit(1);
        }
    };

    init_tracing(config.verbose);
    debug!(?config, path = %config_path.display(), "Resolved configuration");

    let output_format = match config.output_format.as_str() {
        "json" => OutputFormat::Json,
        "yaml" => OutputFormat::Yaml,
        _ => OutputFormat::Snbt,
    };

    let result = match cli.command {
        Commands::Show { file } => handle_show(&file, &config),
        Commands::Get { file, path } => handle_get(&file, &path, &config),
        Commands::Find { file, name, kind } => handle_find(&file, &name, kind, &config),
        Commands::Region { command } => handle_region(command, &config),
        Commands::Config { command } => {
            handle_config(command, &config, &config_path, &output_format)
        }
        Commands::Completion { shell } => {
            generate_completion(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        if config.verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn build_config(cli: &Cli, config_path: &std::path::Path) -> Result<CliConfig> {
    let mut builder = CliConfig::builder();

    // `config set` and `config reset` rewrite the file, so a broken one must
    // not stop them
    let rewrites_config = matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommands::Set { .. } | ConfigCommands::Reset
        }
    );

    // Load config file (unless --no-config is specified)
    if !cli.no_config && !rewrites_config {
        builder = builder.with_config_file(config_path)?;
    }

    // Apply environment variable overrides
    builder = builder.with_env_overrides();

    // Apply CLI argument overrides (highest priority)
    if let Some(ref format) = cli.format {
        builder = builder.with_output_format(format.as_str())?;
    }
    if cli.pretty {
        builder = builder.with_pretty(true);
    }
    if let Some(indent) = cli.indent {
        builder = builder.with_indent(indent)?;
    }
    if let Some(depth) = cli.max_depth {
        builder = builder.with_max_depth(depth)?;
    }
    if cli.verbose {
        builder = builder.with_verbose(true);
    }

    builder.build()
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so they never mix with rendered output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
