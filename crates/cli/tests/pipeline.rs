use std::fs;
use std::path::{Path, PathBuf};

use ringscan_cli::{check, run, PipelineError};
use ringscan_config::Settings;
use ringscan_io::{ChargeDirPolicy, IoError};
use ringscan_recon::ReconError;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../recon/tests/fixtures/scan_library.csv")
}

/// Defaults pointed at the fixture, writing into `out`, with nothing that
/// needs font or background files.
fn settings(out: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.input.path = fixture();
    settings.figures.clear();
    settings.diagrams.styles.clear();
    settings.output.directory = out.to_path_buf();
    settings
}

#[test]
fn full_run_writes_reports_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let (manifest, manifest_path) = run(&settings(dir.path())).unwrap();

    assert_eq!(manifest.counts.records, 11);
    assert_eq!(manifest.counts.rejected, 1);
    assert_eq!(manifest.counts.substituents, 4);
    assert_eq!(manifest.counts.quantities, 11);
    assert_eq!(manifest.counts.charge_rows, 4);
    assert_eq!(manifest.artifacts.len(), 4);
    for artifact in &manifest.artifacts {
        assert!(artifact.path.is_file(), "{}", artifact.path.display());
    }
    assert!(dir.path().join("ChargeDist").is_dir());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
    assert!(json["dataset_sha256"].as_str().unwrap().starts_with("sha256:"));
    assert_eq!(json["rejected"][0]["index"], "11");
    assert_eq!(json["artifacts"][0]["kind"], "summary");
}

#[test]
fn activation_summary_content() {
    let dir = tempfile::tempdir().unwrap();
    run(&settings(dir.path())).unwrap();

    let csv = fs::read_to_string(dir.path().join("Statistical_Activation.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "Substituent,Mean activation energy [kcal/mol],Standard deviation,Minimal value,Maximal Value,header_title"
    );
    assert!(lines[1].starts_with("None,6.375,"));
    assert!(lines[1].ends_with("Distal effect"));
    // 4 distal + 4 proximal rows
    assert_eq!(lines.len(), 9);
    assert!(lines[5].starts_with("OH_4,7.5,"));
}

#[test]
fn second_run_refuses_existing_charge_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    run(&settings).unwrap();

    let err = run(&settings).unwrap_err();
    assert!(matches!(err, PipelineError::Io(IoError::DirectoryExists(_))));

    settings.output.charge_dir_policy = ChargeDirPolicy::Reuse;
    run(&settings).unwrap();
}

#[test]
fn matrix_export_writes_both_views() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(dir.path());
    settings.output.matrix_dir = Some(PathBuf::from("matrices"));
    let (manifest, _) = run(&settings).unwrap();

    // 11 A views (10 quantities + energy gap) and 10 B views
    assert_eq!(manifest.artifacts.len(), 4 + 21);
    let gap = fs::read_to_string(dir.path().join("matrices/energy_gap.csv")).unwrap();
    assert!(gap.starts_with("Activation energy - second minimum,None,Cl_2,NO2_3,OH_4\n"));
    let b_view = fs::read_to_string(dir.path().join("matrices/activation_energy_b.csv")).unwrap();
    let first_column: Vec<&str> =
        b_view.lines().skip(1).map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(first_column, ["OH_4", "NO2_3", "Cl_2", "None"]);
}

#[test]
fn check_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let report = check(&settings(dir.path())).unwrap();
    assert_eq!(report.records, 11);
    assert_eq!(report.substituents, 4);
    assert_eq!(report.charge_rows, 4);
    assert!(report.quantities.contains(&"energy_gap".to_string()));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn library_without_baseline_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ScanLibrary.csv");
    let content = fs::read_to_string(fixture()).unwrap();
    // drop the None x None record
    let kept: Vec<&str> = content.lines().filter(|l| !l.contains("\"None,None\"")).collect();
    fs::write(&input, kept.join("\n")).unwrap();

    let mut settings = settings(dir.path());
    settings.input.path = input;
    let err = check(&settings).unwrap_err();
    assert!(matches!(err, PipelineError::Recon(ReconError::MissingBaseline { .. })));
}

#[test]
fn config_file_paths_resolve_against_its_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(fixture(), dir.path().join("library.csv")).unwrap();
    let config = dir.path().join("ringscan.toml");
    fs::write(
        &config,
        r#"
figures = []

[input]
path = "library.csv"
delimiter = ","

[diagrams]
styles = []

[output]
directory = "out"
"#,
    )
    .unwrap();

    let settings = Settings::load(&config).unwrap();
    assert_eq!(settings.input.path, dir.path().join("library.csv"));
    let (_, manifest_path) = run(&settings).unwrap();
    assert_eq!(manifest_path, dir.path().join("out/run_manifest.json"));
    assert!(dir.path().join("out/Statistical_SecMin.csv").is_file());
}
