use std::path::Path;

use strata_core::config::UnitEntry;
use strata_ops::open_index;
use strata_ops::ops_advise::{advise, AdviseOptions};
use strata_ops::ops_generate::{generate, GenerateOptions};

const MANIFEST: &str = r#"
[project]
name = "webapp"

[dependencies]
flask = ">=1"

[dev-dependencies]
pytest = "*"
"#;

const CATALOG: &str = r#"
[[package]]
name = "flask"
version = "2.0.0"
hashes = [{ sha256 = "f2" }]
[package.requires]
werkzeug = ">=2"

[[package]]
name = "flask"
version = "1.1.0"
[package.requires]
werkzeug = "<2"

[[package]]
name = "flask"
version = "0.12.0"

[[package]]
name = "werkzeug"
version = "2.0.0"

[[package]]
name = "werkzeug"
version = "1.0.0"

[[package]]
name = "pytest"
version = "7.0.0"
"#;

fn write_project(dir: &Path) {
    std::fs::write(dir.join("Strata.toml"), MANIFEST).unwrap();
    std::fs::write(dir.join("catalog.toml"), CATALOG).unwrap();
}

#[test]
fn test_advise_ranks_latest_compatible_stack_first() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());
    let index = open_index(&tmp.path().join("catalog.toml"), None).unwrap();

    let resolution = advise(tmp.path(), &*index, &AdviseOptions::default()).unwrap();
    let best = resolution.best().unwrap();
    let keys: Vec<String> = best.packages.iter().map(|p| p.key()).collect();
    assert_eq!(keys, vec!["flask==2.0.0", "pytest==7.0.0", "werkzeug==2.0.0"]);
    assert!(best.packages.iter().find(|p| p.name == "pytest").unwrap().develop);

    // flask 0.12.0 is excluded by the declared requirement.
    assert!(resolution
        .finished
        .iter()
        .all(|s| s.packages.iter().all(|p| p.key() != "flask==0.12.0")));
}

#[test]
fn test_advise_respects_limit() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());
    let index = open_index(&tmp.path().join("catalog.toml"), None).unwrap();
    let options = AdviseOptions {
        limit: 1,
        ..AdviseOptions::default()
    };
    let resolution = advise(tmp.path(), &*index, &options).unwrap();
    assert_eq!(resolution.finished.len(), 1);
}

#[test]
fn test_advise_rejects_bad_unit_configuration() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());
    let index = open_index(&tmp.path().join("catalog.toml"), None).unwrap();
    let options = AdviseOptions {
        units: vec![UnitEntry {
            name: "SetScoreStep".into(),
            configuration: "score = 1.0".parse().unwrap(),
        }],
        ..AdviseOptions::default()
    };
    let err = advise(tmp.path(), &*index, &options).unwrap_err();
    assert!(err.to_string().contains("SetScoreStep"));
}

#[test]
fn test_generate_from_project_directory() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());
    let index = open_index(&tmp.path().join("catalog.toml"), None).unwrap();
    let out = tmp.path().join("out");
    let options = GenerateOptions {
        destination: out.display().to_string(),
        seed: Some(1),
        ..GenerateOptions::default()
    };
    let report = generate(tmp.path(), &*index, &options).unwrap();

    // Every version of flask with each compatible werkzeug, times one pytest.
    assert_eq!(report.computed, 3);
    assert_eq!(report.output.len(), 3);
    let lock = std::fs::read_to_string(out.join("00001").join("Strata.lock")).unwrap();
    assert!(lock.contains("sha256:f2"));
    assert!(lock.contains("dev-package"));
}
