use approx::assert_relative_eq;
use eifind_algorithms::{IncidentEnergyFinder, TwoMonitorRefiner};
use eifind_core::services::GeometryProvider;
use eifind_io::{load_config, ResultWriter, RunFile};
use serde_json::json;
use std::fs;
use tempfile::tempdir;

/// Counts on 2 us bins up to 30 ms with a Gaussian at `centre`.
fn monitor(spectrum_number: u32, centre: f64, sigma: f64) -> serde_json::Value {
    let edges: Vec<f64> = (0..=15_000).map(|i| f64::from(i) * 2.0).collect();
    let counts: Vec<f64> = edges
        .windows(2)
        .map(|bin| {
            let t = 0.5 * (bin[0] + bin[1]);
            (800.0 * (-0.5 * ((t - centre) / sigma).powi(2)).exp()).floor()
        })
        .collect();
    json!({ "spectrum_number": spectrum_number, "tof_edges": edges, "counts": counts })
}

fn write_run(dir: &std::path::Path) -> std::path::PathBuf {
    let empty = json!({ "spectrum_number": 0, "tof_edges": [0.0, 1.0], "counts": [0.0] });
    let run = json!({
        "run_number": 40554,
        "geometry": { "l_m2": 10.0, "l_m3": 20.0, "l_fermi": 10.0 },
        "logs": { "Fermi_Speed": { "times": [0.0, 120.0], "values": [400.0, 500.0] } },
        "monitors": [
            { "spectrum_number": 1, "tof_edges": [0.0, 1.0], "counts": [0.0] },
            empty,
            monitor(41475, 4000.0, 8.0),
            monitor(41476, 8000.0, 16.0),
        ]
    });
    let path = dir.join("MAP40554.json");
    fs::write(&path, serde_json::to_string(&run).unwrap()).unwrap();
    path
}

#[test]
fn test_determine_from_run_file() {
    let dir = tempdir().unwrap();
    let run = RunFile::open(write_run(dir.path())).unwrap();
    let refiner = TwoMonitorRefiner::new(&run, run.geometry().unwrap());

    let set = IncidentEnergyFinder::default()
        .determine(&run, &refiner)
        .unwrap();

    assert_eq!(set.len(), 1);
    let entry = set.primary().unwrap();
    assert_relative_eq!(entry.tof_us, 4000.0, epsilon = 1e-6);
    // 10 m in 4000 us.
    assert_relative_eq!(entry.energy_mev, 5.227e6 * 0.0025 * 0.0025, epsilon = 1e-6);

    let out = dir.path().join("ei.csv");
    ResultWriter::create(&out)
        .unwrap()
        .write(&set, run.run_number())
        .unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap().lines().count(), 2);
}

#[test]
fn test_config_file_changes_log_channel() {
    let dir = tempdir().unwrap();
    let run = RunFile::open(write_run(dir.path())).unwrap();

    let config_path = dir.path().join("let.json");
    fs::write(&config_path, r#"{ "chopper_log": "Chopper_Speed" }"#).unwrap();
    let finder = IncidentEnergyFinder::new(load_config(&config_path).unwrap()).unwrap();

    let err = finder.candidates(&run).unwrap_err();
    assert!(matches!(err, eifind_core::Error::MissingLog(_)));
}
