use std::fs;
use std::path::PathBuf;
use std::process::Output;

use serde_json::{Value, json};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("argz_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// A small build-tool schema in YAML.
fn write_build_schema(dir: &TempDir) -> PathBuf {
    let yaml = r#"
type: object
fields:
  verbose:
    type: boolean
    aliases: [v]
  outDir:
    type: string
    default: dist
  server:
    type: object
    fields:
      port:
        type: number
  targets:
    type: positional
  rest:
    type: bypassed
"#;
    let path = dir.join("build.yaml");
    fs::write(&path, yaml).expect("failed to write schema");
    path
}

fn argz(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_argz"))
        .args(args)
        .output()
        .expect("failed to run argz")
}

fn report(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("report should be JSON")
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_prints_validated_value() {
    let dir = TempDir::new("resolve_valid");
    let schema = write_build_schema(&dir);

    let output = argz(&[
        "resolve",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "-v",
        "--server.port",
        "8080",
        "app",
        "--",
        "--watch",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report = report(&output);
    assert_eq!(report["status"], "valid");
    assert_eq!(
        report["value"],
        json!({
            "verbose": true,
            "outDir": "dist",
            "server": {"port": 8080},
            "targets": ["app"],
            "rest": ["--watch"],
        })
    );
    assert_eq!(report["issues"], json!([]));
}

#[test]
fn resolve_reports_unknown_argument() {
    let dir = TempDir::new("resolve_unknown");
    let schema = write_build_schema(&dir);

    let output = argz(&[
        "resolve",
        "--schema",
        schema.to_str().unwrap(),
        "--compact",
        "--",
        "--bogus",
        "-v",
    ]);

    assert!(!output.status.success());
    let report = report(&output);
    assert_eq!(report["status"], "dirty");
    assert_eq!(report["issues"][0]["code"], "unknown_argument");
    assert_eq!(report["issues"][0]["path"], json!([0]));
    // Schema problems are reported alongside token problems.
    assert_eq!(report["issues"][1]["code"], "required");
    assert_eq!(report["issues"][1]["path"], json!(["server"]));
    assert_eq!(report["value"]["verbose"], json!(true));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: argument vector is dirty"));
}

#[test]
fn resolve_raw_skips_validation() {
    let dir = TempDir::new("resolve_raw");
    let schema = write_build_schema(&dir);

    let output = argz(&["resolve", "--schema", schema.to_str().unwrap(), "--raw", "--", "-v"]);

    assert!(output.status.success());
    let report = report(&output);
    // No default applied and no `required` issues for the missing fields.
    assert_eq!(
        report["value"],
        json!({"verbose": true, "targets": [], "rest": []})
    );
}

#[test]
fn resolve_honors_config_and_override() {
    let dir = TempDir::new("resolve_config");
    let schema = write_build_schema(&dir);
    let config = dir.join("argz.yaml");
    fs::write(&config, "name_case: snake\nvalidate: false\n").unwrap();

    let snake = argz(&[
        "resolve",
        "--schema",
        schema.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--",
        "--out_dir=build",
    ]);
    assert!(snake.status.success());
    assert_eq!(report(&snake)["value"]["outDir"], "build");

    let kebab = argz(&[
        "resolve",
        "--schema",
        schema.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--name-case",
        "kebab",
        "--",
        "--out-dir=build",
    ]);
    assert!(kebab.status.success());
    assert_eq!(report(&kebab)["value"]["outDir"], "build");
}

#[test]
fn resolve_fails_on_missing_schema() {
    let dir = TempDir::new("resolve_missing");
    let missing = dir.join("nope.yaml");

    let output = argz(&["resolve", "--schema", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load schema"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_documents() {
    let dir = TempDir::new("check_valid");
    write_build_schema(&dir);

    let output = argz(&["check", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Checked 1 document(s), 0 with errors."));
}

#[test]
fn check_rejects_clashing_names() {
    let dir = TempDir::new("check_clash");
    let path = dir.join("clash.json");
    let document = json!({
        "type": "object",
        "fields": {
            "verbose": {"type": "boolean", "aliases": ["v"]},
            "version": {"type": "boolean", "aliases": ["v"]}
        }
    });
    fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();

    let output = argz(&["check", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate flag name `v`"), "stderr: {stderr}");
}

#[test]
fn check_reports_every_document_in_a_directory() {
    let dir = TempDir::new("check_dir");
    write_build_schema(&dir);
    fs::write(dir.join("broken.json"), "{ not json").unwrap();
    fs::write(dir.join("echo.json"), r#"{"type": "positional"}"#).unwrap();
    fs::write(dir.join("notes.txt"), "not a schema").unwrap();

    let output = argz(&["check", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Checked 3 document(s), 1 with errors."), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.json: "), "stderr: {stderr}");
    assert!(!stderr.contains("failed to read"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// names
// ---------------------------------------------------------------------------

#[test]
fn names_lists_flags_and_paths() {
    let dir = TempDir::new("names");
    let schema = write_build_schema(&dir);

    let output = argz(&["names", "--schema", schema.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "--verbose",
            "-v",
            "--out-dir",
            "--server",
            "--server.port",
            "positional: targets",
            "bypassed: rest",
        ]
    );
}
