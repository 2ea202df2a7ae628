//! nbtshow library
//!
//! Command-line viewer for NBT files and region files, built on
//! `nbtview-core` and `nbtview-region`. The binary is a thin wrapper around
//! the handlers in [`cli`]; settings are resolved by [`config::ConfigBuilder`].
//!
//! ```no_run
//! use nbtshow::config::CliConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = CliConfig::builder()
//!     .with_output_format("json")?
//!     .with_pretty(true)
//!     .build()?;
//! nbtshow::cli::handle_show("level.dat".as_ref(), &config)?;
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;
