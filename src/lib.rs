pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliArgs, ConsoleSink, FileSink};

pub use config::{toml_config::FaresConfig, Catalog, FilterConfig, ScanConfig};
pub use core::{report::ReportAssembler, scan::ScanEngine};
pub use utils::error::{FareError, Result};
