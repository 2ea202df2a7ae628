//! CLI command and subcommand definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Viewer for NBT files and Minecraft region files
#[derive(Parser, Debug)]
#[command(name = "nbtshow")]
#[command(version, about = "Inspect NBT and region files", long_about = None)]
pub struct Cli {
    /// Output format (overrides config file)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Spread output over multiple lines
    #[arg(short, long, global = true)]
    pub pretty: bool,

    /// Indent width for pretty output
    #[arg(long, global = true)]
    pub indent: Option<usize>,

    /// Deepest nesting of lists and compounds to decode
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Enable verbose logging (overrides config file)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Don't load config file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Config file path (default: ~/.config/nbtview/cli.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Stringified NBT
    Snbt,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Snbt => "snbt",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl From<&OutputFormat> for crate::format::OutputFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Snbt => crate::format::OutputFormat::Snbt,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Yaml => crate::format::OutputFormat::Yaml,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the root name and contents of an NBT file
    Show {
        /// NBT file, optionally gzip or zlib compressed
        file: PathBuf,
    },

    /// Print the tag at a path such as `Data/Player/Pos/0`
    Get {
        /// NBT file, optionally gzip or zlib compressed
        file: PathBuf,
        /// Slash-separated path; numeric segments index lists
        path: String,
    },

    /// Locate a named Int or Long without decoding the whole file
    Find {
        /// NBT file, optionally gzip or zlib compressed
        file: PathBuf,
        /// Tag name to search for
        name: String,
        /// Tag type to search for
        #[arg(short = 't', long = "type", value_enum, default_value = "int")]
        kind: SearchKind,
    },

    /// Region file commands
    Region {
        #[command(subcommand)]
        command: RegionCommands,
    },

    /// Show or manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SearchKind {
    Int,
    Long,
}

#[derive(Subcommand, Debug)]
pub enum RegionCommands {
    /// List the chunks present in a region file
    Info {
        /// Region file (.mca)
        file: PathBuf,
    },

    /// Print one chunk, selected by index or by chunk coordinates
    Chunk {
        /// Region file (.mca)
        file: PathBuf,
        /// Chunk index (0-1023)
        #[arg(required_unless_present_all = ["x", "z"], conflicts_with_all = ["x", "z"])]
        index: Option<usize>,
        /// Chunk X coordinate, local or world
        #[arg(short, long, requires = "z", allow_negative_numbers = true)]
        x: Option<i32>,
        /// Chunk Z coordinate, local or world
        #[arg(short, long, requires = "x", allow_negative_numbers = true)]
        z: Option<i32>,
    },

    /// Decode every chunk and report the ones that fail
    Check {
        /// Region file (.mca)
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Reset configuration to defaults
    Reset,
}
