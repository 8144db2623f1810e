use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write_archive(path: &Path, files: &[(&str, &str)]) {
    let gz = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(gz);
    for (name, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, body.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Assets tree for RxJava with one archive and a config pointing at it.
fn setup(root: &Path) -> std::path::PathBuf {
    let assets = root.join("assets");
    let archives = assets.join("repo-retrieval/RxJava/archives");
    fs::create_dir_all(&archives).unwrap();
    fs::create_dir_all(assets.join("operators")).unwrap();
    fs::write(assets.join("operators/RxJava.json"), r#"["map","filter"]"#).unwrap();

    write_archive(
        &archives.join("repo.tar.gz"),
        &[
            (
                "repo/src/A.java",
                "import io.reactivex.Observable;\nclass A { void f(){ o.map(x).map(y); /* filter(z) */ } }",
            ),
            ("repo/src/B.java", "class B { void g(){ list.map(q); } }"),
            ("repo/README.md", "map(1) filter(2) RxJava"),
        ],
    );

    let config = root.join("config.json");
    fs::write(
        &config,
        format!(
            r#"{{"distribution":"RxJava","fileExtensions":["Java"],"assetsDir":{},"workers":2}}"#,
            serde_json::to_string(&assets).unwrap()
        ),
    )
    .unwrap();
    config
}

#[test]
fn shows_help() {
    Command::new(env!("CARGO_BIN_EXE_opsminer"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("opsminer"))
        .stdout(predicate::str::contains("--check-false-positives"));
}

#[test]
fn mines_archive_into_result_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    Command::new(env!("CARGO_BIN_EXE_opsminer"))
        .arg("--config")
        .arg(&config)
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(predicate::str::contains("Number of processed files: 1"));

    let out = dir
        .path()
        .join("assets/operators-search/rxjava_Java.json");
    assert_eq!(
        fs::read_to_string(out).unwrap(),
        r#"{"repo.tar.gz":{"filter":0,"map":2}}"#
    );
}

#[test]
fn audit_mode_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let fp = dir.path().join("assets/false-positives");
    fs::create_dir_all(&fp).unwrap();
    fs::write(fp.join("collection-like_sample.txt"), "repo/src/A.java\n").unwrap();

    Command::new(env!("CARGO_BIN_EXE_opsminer"))
        .arg("-c")
        .arg(&config)
        .arg("--check-false-positives")
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fp.join("collection-like_count.json")).unwrap())
            .unwrap();
    assert_eq!(report["repo/src/A.java"]["map"], 2);
    assert_eq!(report.as_object().unwrap().len(), 1);
}

#[test]
fn missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_opsminer"))
        .arg("--config")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn missing_operator_list_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    fs::remove_file(dir.path().join("assets/operators/RxJava.json")).unwrap();

    Command::new(env!("CARGO_BIN_EXE_opsminer"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}
