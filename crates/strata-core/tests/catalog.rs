use strata_core::index::{CatalogIndex, PackageIndex};
use strata_core::package::PackageVersion;

const CATALOG: &str = r#"
[[package]]
name = "flask"
version = "1.0.0"
hashes = [{ sha256 = "f1" }]

[package.requires]
werkzeug = ">=0.14"

[[package]]
name = "werkzeug"
version = "0.15.0"
index = "https://mirror.example/simple"
"#;

#[test]
fn parses_catalog_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("catalog.toml");
    std::fs::write(&path, CATALOG).unwrap();
    let catalog = CatalogIndex::from_path(&path).unwrap();
    assert_eq!(catalog.packages.len(), 2);
}

#[test]
fn default_index_url_applies() {
    let catalog = CatalogIndex::parse_toml(CATALOG).unwrap();
    let flask = catalog.versions("flask").unwrap();
    assert_eq!(flask[0].index, "https://pypi.org/simple");
    let werkzeug = catalog.versions("werkzeug").unwrap();
    assert_eq!(werkzeug[0].index, "https://mirror.example/simple");
}

#[test]
fn requirements_are_listed() {
    let catalog = CatalogIndex::parse_toml(CATALOG).unwrap();
    let reqs = catalog
        .requirements(&PackageVersion::new("flask", "1.0.0", "https://pypi.org/simple"))
        .unwrap();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].name, "werkzeug");
    assert_eq!(reqs[0].version, ">=0.14");
}

#[test]
fn hashes_lookup() {
    let catalog = CatalogIndex::parse_toml(CATALOG).unwrap();
    assert_eq!(catalog.get_hashes("flask", "1.0.0").unwrap()[0]["sha256"], "f1");
    assert!(catalog.get_hashes("werkzeug", "0.15.0").unwrap().is_empty());
    assert!(catalog.get_hashes("flask", "9.9.9").is_err());
}

#[test]
fn malformed_catalog_is_error() {
    assert!(CatalogIndex::parse_toml("[[package]]\nname = 1\n").is_err());
}

#[test]
fn requirements_follow_catalog_file_order() {
    let catalog = CatalogIndex::parse_toml(
        r#"
[[package]]
name = "flask"
version = "2.0.0"

[package.requires]
werkzeug = ">=2.0"
jinja2 = ">=3.0"
click = ">=7.1"
"#,
    )
    .unwrap();
    let names: Vec<String> = catalog
        .requirements(&PackageVersion::new("flask", "2.0.0", "https://pypi.org/simple"))
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["werkzeug", "jinja2", "click"]);
}
