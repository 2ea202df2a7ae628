//! Configuration locations shared by nbtview tools
//!
//! Tools keep their own settings types; this module only decides where they
//! live on disk.

mod paths;

pub use paths::{config_dir, default_config_path};
