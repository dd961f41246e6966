//! JSON run descriptions.
//!
//! A run description carries what a determination reads from a raw data
//! file: flight-path geometry, sample logs, and histogrammed monitors.
//!
//! ```json
//! {
//!   "run_number": 40554,
//!   "geometry": { "l_m2": 10.0, "l_m3": 20.0, "l_fermi": 10.0 },
//!   "logs": { "Fermi_Speed": { "times": [0.0, 60.0], "values": [500.0, 500.0] } },
//!   "monitors": [ { "spectrum_number": 41475, "tof_edges": [...], "counts": [...] } ]
//! }
//! ```
#![allow(clippy::cast_precision_loss)]

use crate::{Error, Result};
use eifind_core::geometry::Geometry;
use eifind_core::services::{ChopperLogReader, GeometryProvider, MonitorSpectra};
use eifind_core::spectrum::Spectrum;
use eifind_core::timeseries::TimeSeries;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Deserialize)]
struct JsonRun {
    #[serde(default)]
    run_number: Option<u64>,
    geometry: Geometry,
    #[serde(default)]
    logs: BTreeMap<String, JsonLog>,
    #[serde(default)]
    monitors: Vec<JsonMonitor>,
}

#[derive(Deserialize)]
struct JsonLog {
    #[serde(default)]
    times: Vec<f64>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct JsonMonitor {
    spectrum_number: u32,
    tof_edges: Vec<f64>,
    counts: Vec<f64>,
}

/// One monitor of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorRecord {
    /// Absolute spectrum number.
    pub spectrum_number: u32,
    /// Counts against time of flight.
    pub spectrum: Spectrum,
}

/// A loaded run description.
#[derive(Debug, Clone)]
pub struct RunFile {
    run_number: Option<u64>,
    geometry: Geometry,
    logs: BTreeMap<String, TimeSeries>,
    monitors: Vec<MonitorRecord>,
}

impl RunFile {
    /// Opens and parses a run description.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid run
    /// description.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let json: JsonRun = serde_json::from_reader(reader)?;
        let run = Self::from_json_run(json)?;
        log::debug!(
            "loaded {} with {} monitor(s) and {} log(s)",
            path.display(),
            run.monitors.len(),
            run.logs.len()
        );
        Ok(run)
    }

    /// Parses a run description from a JSON string.
    ///
    /// # Errors
    /// Returns an error for invalid JSON or inconsistent contents.
    pub fn from_json(json: &str) -> Result<Self> {
        let json: JsonRun = serde_json::from_str(json)?;
        Self::from_json_run(json)
    }

    fn from_json_run(json: JsonRun) -> Result<Self> {
        let logs = json
            .logs
            .into_iter()
            .map(|(name, log)| -> Result<(String, TimeSeries)> {
                // Logs without times are indexed by sample number.
                let times = if log.times.is_empty() {
                    (0..log.values.len()).map(|i| i as f64).collect()
                } else {
                    log.times
                };
                let series = TimeSeries::new(times, log.values)
                    .map_err(|e| Error::InvalidFormat(format!("log '{name}': {e}")))?;
                Ok((name, series))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let monitors = json
            .monitors
            .into_iter()
            .enumerate()
            .map(|(index, monitor)| -> Result<MonitorRecord> {
                let spectrum = Spectrum::new(monitor.tof_edges, monitor.counts)
                    .map_err(|e| Error::InvalidFormat(format!("monitor {index}: {e}")))?;
                Ok(MonitorRecord {
                    spectrum_number: monitor.spectrum_number,
                    spectrum,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            run_number: json.run_number,
            geometry: json.geometry,
            logs,
            monitors,
        })
    }

    /// Run number, if recorded.
    #[must_use]
    pub fn run_number(&self) -> Option<u64> {
        self.run_number
    }

    /// Monitors in workspace-index order.
    #[must_use]
    pub fn monitors(&self) -> &[MonitorRecord] {
        &self.monitors
    }

    /// Names of the recorded logs.
    pub fn log_names(&self) -> impl Iterator<Item = &str> {
        self.logs.keys().map(String::as_str)
    }

    /// A recorded log by name.
    #[must_use]
    pub fn log(&self, name: &str) -> Option<&TimeSeries> {
        self.logs.get(name)
    }
}

impl GeometryProvider for RunFile {
    fn geometry(&self) -> eifind_core::Result<Geometry> {
        Ok(self.geometry)
    }
}

impl ChopperLogReader for RunFile {
    fn last_log_value(&self, channel: &str) -> eifind_core::Result<f64> {
        self.logs
            .get(channel)
            .ok_or_else(|| eifind_core::Error::MissingLog(channel.to_string()))?
            .last_value()
            .ok_or_else(|| eifind_core::Error::EmptyLog(channel.to_string()))
    }
}

impl MonitorSpectra for RunFile {
    fn monitor_spectrum(&self, index: usize) -> eifind_core::Result<&Spectrum> {
        self.monitors
            .get(index)
            .map(|monitor| &monitor.spectrum)
            .ok_or(eifind_core::Error::MonitorNotFound(index))
    }
}
