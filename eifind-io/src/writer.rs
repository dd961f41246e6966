//! Writers for determined incident energies.

use crate::{Error, Result};
use eifind_core::energy::{AcceptedEnergy, AcceptedEnergySet};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output format, chosen from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON object holding the run number and energy list.
    Json,
}

impl OutputFormat {
    /// Format for `path`: `.json` writes JSON, `.csv` or no extension writes CSV.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            None | Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(Error::InvalidFormat(format!(
                "unsupported output extension '{other}'"
            ))),
        }
    }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    run_number: Option<u64>,
    energies: &'a [AcceptedEnergy],
}

/// Writes an [`AcceptedEnergySet`] to a file.
pub struct ResultWriter {
    writer: BufWriter<File>,
    format: OutputFormat,
}

impl ResultWriter {
    /// Creates a writer, picking the format from the extension.
    ///
    /// # Errors
    /// Returns an error for an unsupported extension or if the file cannot
    /// be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = OutputFormat::from_path(path.as_ref())?;
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            format,
        })
    }

    /// The chosen output format.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Writes `set` in the chosen format.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(&mut self, set: &AcceptedEnergySet, run_number: Option<u64>) -> Result<()> {
        match self.format {
            OutputFormat::Csv => self.write_csv(set),
            OutputFormat::Json => self.write_json(set, run_number),
        }
    }

    /// Writes one CSV row per accepted energy.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_csv(&mut self, set: &AcceptedEnergySet) -> Result<()> {
        writeln!(self.writer, "energy_mev,tof_us,initial_guess_mev")?;
        for entry in set {
            writeln!(
                self.writer,
                "{},{},{}",
                entry.energy_mev, entry.tof_us, entry.initial_guess_mev
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the set as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn write_json(&mut self, set: &AcceptedEnergySet, run_number: Option<u64>) -> Result<()> {
        let result = JsonResult {
            run_number,
            energies: set.as_slice(),
        };
        serde_json::to_writer_pretty(&mut self.writer, &result)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> AcceptedEnergySet {
        [
            AcceptedEnergy {
                energy_mev: 58.5,
                tof_us: 3000.0,
                initial_guess_mev: 58.25,
            },
            AcceptedEnergy {
                energy_mev: 20.9,
                tof_us: 5005.0,
                initial_guess_mev: 20.908,
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.csv")).unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("a.JSON")).unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("energies")).unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::from_path(Path::new("a.nxs")).is_err());
    }

    #[test]
    fn test_write_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ei.csv");
        let mut writer = ResultWriter::create(&path).unwrap();
        writer.write(&sample(), Some(40554)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "energy_mev,tof_us,initial_guess_mev");
        assert_eq!(lines[1], "58.5,3000,58.25");
        assert_eq!(lines[2], "20.9,5005,20.908");
    }

    #[test]
    fn test_write_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ei.json");
        let mut writer = ResultWriter::create(&path).unwrap();
        assert_eq!(writer.format(), OutputFormat::Json);
        writer.write(&sample(), Some(40554)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["run_number"], 40554);
        assert_eq!(value["energies"].as_array().unwrap().len(), 2);
        assert_eq!(value["energies"][1]["tof_us"], 5005.0);
    }

    #[test]
    fn test_write_empty_csv_has_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("none.csv");
        ResultWriter::create(&path)
            .unwrap()
            .write(&AcceptedEnergySet::new(), None)
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
