use std::fs;
use std::path::Path;

use jsg_config::{load_config, parse_config, BatchSystem};
use jsg_core::{codes, from_json_slice};
use jsg_script::{generate, plan_scripts, GenerateOptions, GenerationManifest};
use jsg_space::span_parameter_space;
use tempfile::tempdir;

const DOC: &str = r#"{
    "batch_system": "slurm",
    "slurm": {"sbatch": {"time": "00:30:00"}},
    "common_parameter_values": {"graphs": ["g1.el", "g2.el"]},
    "algorithms": [
        {"executable": "./bfs", "parameters_location": {"graphs": "-f", "threads": "-t"},
         "parameters_values": {"threads": "1:4"}},
        {"executable": "./sssp", "parameters_location": {"graphs": 1}, "ignore": "true"}
    ]
}"#;

fn options() -> GenerateOptions {
    GenerateOptions {
        created_at: Some("2024-05-01T12:00:00Z".into()),
        ..GenerateOptions::default()
    }
}

fn read_tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    for dir in [root.to_path_buf(), root.join("node")] {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_file() {
                let name = path.strip_prefix(root).unwrap().display().to_string();
                files.push((name, fs::read(&path).unwrap()));
            }
        }
    }
    files.sort();
    files
}

#[test]
fn default_separator_splits_by_graph() {
    let config = parse_config(DOC).unwrap();
    let table = span_parameter_space(&config).unwrap();
    let dir = tempdir().unwrap();
    let report = generate(&config, &table, &options(), dir.path()).unwrap();

    let names: Vec<&str> = report
        .manifest
        .scripts
        .iter()
        .map(|script| script.file_name.as_str())
        .collect();
    assert_eq!(names, ["run_g1_script.sh", "run_g2_script.sh"]);
    assert_eq!(report.manifest.total_rows, 8);
    assert_eq!(report.manifest.separators, ["graphs"]);

    let master = fs::read_to_string(&report.master).unwrap();
    assert_eq!(
        master.lines().skip(7).collect::<Vec<_>>(),
        ["sbatch node/run_g1_script.sh", "sbatch node/run_g2_script.sh"]
    );
}

#[test]
fn regeneration_is_byte_identical() {
    let config = parse_config(DOC).unwrap();
    let table = span_parameter_space(&config).unwrap();
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    generate(&config, &table, &options(), first.path()).unwrap();
    generate(&config, &table, &options(), second.path()).unwrap();
    let a = read_tree(first.path());
    assert_eq!(a.len(), 4);
    assert_eq!(a, read_tree(second.path()));

    // A second run into the same directory replaces files in place.
    generate(&config, &table, &options(), first.path()).unwrap();
    assert_eq!(a, read_tree(first.path()));
}

#[test]
fn manifest_round_trips_and_records_counts() {
    let config = parse_config(DOC).unwrap();
    let table = span_parameter_space(&config).unwrap();
    let dir = tempdir().unwrap();
    let report = generate(&config, &table, &options(), dir.path()).unwrap();
    let manifest: GenerationManifest =
        from_json_slice(&fs::read(&report.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest, report.manifest);
    assert_eq!(manifest.batch_system, BatchSystem::Slurm);
    assert!(manifest.scripts.iter().all(|script| script.rows == 4));
    assert_eq!(manifest.config_hash.len(), 64);
}

#[test]
fn invalid_separator_writes_nothing() {
    let config = parse_config(DOC).unwrap();
    let table = span_parameter_space(&config).unwrap();
    let dir = tempdir().unwrap();
    let out = dir.path().join("rs_out");
    let options = GenerateOptions {
        separators: Some(vec!["threads".into(), "pp".into()]),
        ..options()
    };
    let err = generate(&config, &table, &options, &out).unwrap_err();
    assert_eq!(err.code(), codes::INVALID_SEPARATOR);
    assert!(!out.exists());
    assert!(plan_scripts(&config, &table, &options).is_err());
}

#[test]
fn document_separators_apply_when_caller_gives_none() {
    let doc = DOC.replacen('{', r#"{"separators": ["threads"],"#, 1);
    let config = parse_config(&doc).unwrap();
    let table = span_parameter_space(&config).unwrap();
    let plans = plan_scripts(&config, &table, &options()).unwrap();
    assert_eq!(plans.len(), 4);
    assert_eq!(plans[0].file_name, "run_1_script.sh");

    let explicit = GenerateOptions {
        separators: Some(Vec::new()),
        ..options()
    };
    assert_eq!(plan_scripts(&config, &table, &explicit).unwrap().len(), 1);
}

#[test]
fn configuration_file_is_copied_alongside_master() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("run_config.json");
    fs::write(&source, DOC).unwrap();
    let config = load_config(&source).unwrap();
    let table = span_parameter_space(&config).unwrap();
    let out = dir.path().join("rs_copy");
    let options = GenerateOptions {
        config_source: Some(source.clone()),
        ..options()
    };
    generate(&config, &table, &options, &out).unwrap();
    assert_eq!(fs::read_to_string(out.join("run_config.json")).unwrap(), DOC);
}

#[cfg(unix)]
#[test]
fn scripts_are_executable() {
    use std::os::unix::fs::PermissionsExt;

    let config = parse_config(DOC).unwrap();
    let table = span_parameter_space(&config).unwrap();
    let dir = tempdir().unwrap();
    let report = generate(&config, &table, &options(), dir.path()).unwrap();
    for path in report.scripts.iter().chain([&report.master]) {
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111, "{}", path.display());
    }
}

#[test]
fn every_planned_script_gets_its_own_file() {
    let config = parse_config(
        r#"{"batch_system": "slurm", "algorithms": [{"executable": "./exe",
            "parameters_location": {"x": 1, "y": 2},
            "parameters_values": {"x": ["a", "a_b"], "y": ["b_c", "c"]}}]}"#,
    )
    .unwrap();
    let table = span_parameter_space(&config).unwrap();
    let dir = tempdir().unwrap();
    let options = GenerateOptions {
        separators: Some(vec!["x".into(), "y".into()]),
        ..options()
    };
    let report = generate(&config, &table, &options, dir.path()).unwrap();
    let on_disk = fs::read_dir(dir.path().join("node")).unwrap().count();
    assert_eq!(on_disk, 4);
    assert_eq!(report.manifest.scripts.len(), on_disk);

    let master = fs::read_to_string(&report.master).unwrap();
    let mut jobs: Vec<&str> = master.lines().filter(|line| line.starts_with("sbatch")).collect();
    assert_eq!(jobs.len(), 4);
    jobs.sort_unstable();
    jobs.dedup();
    assert_eq!(jobs.len(), 4);
}
