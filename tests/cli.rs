use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn render_template_to_stdout() {
    let mut cmd = cargo_bin_cmd!("declsplice");
    cmd.arg(fixture_path("posix.rs.in"))
        .arg("--ast")
        .arg(fixture_path("posix.decls.yaml"))
        .arg("-I")
        .arg("/usr/include");

    let output_pred = predicate::str::contains("\"linux-x64\"")
        .and(predicate::str::contains("pub const CREAT: i32 = 0x40;"))
        .and(predicate::str::contains("guard::enforce(PLATFORM)"))
        .and(predicate::str::contains("@@extract\nsizeof -p statx_timestamp"));

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn render_template_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("posix.rs");

    let mut cmd = cargo_bin_cmd!("declsplice");
    cmd.arg(fixture_path("posix.rs.in"))
        .arg("--ast")
        .arg(fixture_path("posix.decls.yaml"))
        .arg("-I")
        .arg("/usr/include")
        .arg("-o")
        .arg(&out);
    cmd.assert().success().stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("_opaque: [u64; 16],"));
    assert!(written.contains("pub const DIRENT_D_NAME_OFFSET: usize =\n19\n;"));
}

#[test]
fn failing_directive_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("broken.rs.in");
    let out = dir.path().join("broken.rs");
    fs::write(
        &template,
        "pub const A: usize =\n@@extract\nsizeof -p .*_t time.h sys/types.h\n@@end\n;\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("declsplice");
    cmd.arg(&template)
        .arg("--ast")
        .arg(fixture_path("posix.decls.yaml"))
        .arg("-I")
        .arg("/usr/include")
        .arg("-o")
        .arg(&out);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("error[QueryError]").and(predicate::str::contains("line 3")));

    assert!(!out.exists());
}

#[test]
fn ambiguous_match_is_reported_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("ambiguous.rs.in");
    fs::write(&template, "@@extract\nsizeof -p .* time.h\n@@end\n").unwrap();

    let mut cmd = cargo_bin_cmd!("declsplice");
    cmd.arg(&template)
        .arg("--ast")
        .arg(fixture_path("posix.decls.yaml"))
        .arg("-I")
        .arg("/usr/include");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("error[MultipleMatchesError]"));
}

#[test]
fn custom_markers_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("declsplice.toml");
    let template = dir.path().join("time.rs.in");
    fs::write(
        &config,
        "[template]\nblock_start = \"// <extract>\"\nblock_end = \"// </extract>\"\n\n[query]\ninclude_paths = [\"/usr/include\"]\n",
    )
    .unwrap();
    fs::write(
        &template,
        "pub const SIZEOF_TIMESPEC: usize =\n// <extract>\nsizeof -p timespec time.h\n// </extract>\n;\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("declsplice");
    cmd.arg(&template)
        .arg("--ast")
        .arg(fixture_path("posix.decls.yaml"))
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .success()
        .stdout("pub const SIZEOF_TIMESPEC: usize =\n16\n;\n");
}

#[test]
fn include_flag_overrides_configured_paths() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("declsplice.toml");
    let template = dir.path().join("time.rs.in");
    fs::write(&config, "[query]\ninclude_paths = [\"/opt/include\"]\n").unwrap();
    fs::write(&template, "@@extract\nsizeof -p time_t time.h\n@@end\n").unwrap();

    let mut cmd = cargo_bin_cmd!("declsplice");
    cmd.arg(&template)
        .arg("--ast")
        .arg(fixture_path("posix.decls.yaml"))
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("header 'time.h' could not be resolved"));

    let mut cmd = cargo_bin_cmd!("declsplice");
    cmd.arg(&template)
        .arg("--ast")
        .arg(fixture_path("posix.decls.yaml"))
        .arg("--config")
        .arg(&config)
        .arg("-I")
        .arg("/usr/include");
    cmd.assert().success().stdout("8\n");
}

#[test]
fn missing_config_file_is_a_usage_error() {
    let mut cmd = cargo_bin_cmd!("declsplice");
    cmd.arg(fixture_path("posix.rs.in"))
        .arg("--ast")
        .arg(fixture_path("posix.decls.yaml"))
        .arg("--config")
        .arg("/nonexistent/declsplice.toml");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn list_modules() {
    let mut cmd = cargo_bin_cmd!("declsplice");
    cmd.arg("--list-modules");
    cmd.assert().success().stdout(
        predicate::str::contains("sizeof")
            .and(predicate::str::contains("dialect"))
            .and(predicate::str::contains("fingerprint")),
    );
}
