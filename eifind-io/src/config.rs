//! JSON instrument configuration files.
//!
//! Any field left out of the file keeps its MAPS default, so a file can be as
//! small as `{ "chopper_log": "Chopper_Speed" }`.

use crate::Result;
use eifind_core::config::EiConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load and validate a configuration file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid JSON, or
/// describes an unusable configuration.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EiConfig> {
    let reader = BufReader::new(File::open(path)?);
    let config: EiConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a configuration from a JSON string.
///
/// # Errors
/// Returns an error for invalid JSON or an unusable configuration.
pub fn config_from_json(json: &str) -> Result<EiConfig> {
    let config: EiConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use eifind_core::config::MonitorId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = config_from_json(r#"{ "chopper_log": "Chopper_Speed" }"#).unwrap();
        assert_eq!(config.chopper_log, "Chopper_Speed");
        assert_eq!(config.monitor_2, MonitorId::new(41475, 2));
        assert_eq!(config.candidate_count, 20);
        assert!((config.frame_limit_us - 19999.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_object_is_maps() {
        let config = config_from_json("{}").unwrap();
        assert_eq!(config, EiConfig::maps_defaults());
    }

    #[test]
    fn test_full_override() {
        let json = r#"{
            "monitor_2": { "spectrum_number": 2, "index": 1 },
            "monitor_3": { "spectrum_number": 3, "index": 2 },
            "peak_window": { "start": 500.0, "step": 4.0, "end": 15000.0 },
            "frame_limit_us": 39999.0,
            "min_candidate_tof_us": 300.0,
            "tof_tolerance_us": 10.0,
            "tzero_tolerance_us": 50.0,
            "parallel_refinement": true
        }"#;
        let config = config_from_json(json).unwrap();
        assert_eq!(config.monitor_2, MonitorId::new(2, 1));
        assert_eq!(config.monitor_3, MonitorId::new(3, 2));
        assert!((config.peak_window.step - 4.0).abs() < f64::EPSILON);
        assert!((config.frame_limit_us - 39999.0).abs() < f64::EPSILON);
        assert!(config.parallel_refinement);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = config_from_json(r#"{ "candidate_count": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::CoreError(_)));

        let err = config_from_json(r#"{ "frame_limit_us": "wide" }"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tzero_tolerance_us": 80.0 }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert!((config.tzero_tolerance_us - 80.0).abs() < f64::EPSILON);
    }
}
