//! eifind-io: File I/O for eifind.
//!
//! This crate reads JSON run descriptions and instrument configuration
//! files, and writes determined incident energies as CSV or JSON.
//!

mod config;
mod error;
mod run;
mod writer;

pub use config::{config_from_json, load_config};
pub use error::{Error, Result};
pub use run::{MonitorRecord, RunFile};
pub use writer::{OutputFormat, ResultWriter};
