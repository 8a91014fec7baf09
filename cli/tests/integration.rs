use std::env;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

fn fonts_dir() -> PathBuf {
    if let Ok(env_override) = env::var("FONTGRID_TEST_FONTS") {
        return PathBuf::from(env_override)
            .canonicalize()
            .expect("FONTGRID_TEST_FONTS must point at a folder");
    }

    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("core")
        .join("fontgrid-core")
        .join("tests")
        .join("fonts")
        .canonicalize()
        .expect("fixture fonts ship with fontgrid-core")
}

#[test]
fn list_empty_folder_without_system_prints_nothing() {
    let tmp = tempdir().expect("tempdir");

    let output = Command::new(env!("CARGO_BIN_EXE_fontgrid"))
        .args(["list", "--no-system", "--folder"])
        .arg(tmp.path())
        .output()
        .expect("run fontgrid");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn alias_for_unknown_font_fails() {
    let tmp = tempdir().expect("tempdir");

    let output = Command::new(env!("CARGO_BIN_EXE_fontgrid"))
        .args(["alias", "--no-system", "-f", "Missing", "--folder"])
        .arg(tmp.path())
        .output()
        .expect("run fontgrid");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no font named \"Missing\""), "stderr: {stderr}");
}

#[test]
fn list_json_reports_folder_fonts() {
    let fonts = fonts_dir();

    let output = Command::new(env!("CARGO_BIN_EXE_fontgrid"))
        .args(["list", "--no-system", "--json", "--folder"])
        .arg(&fonts)
        .output()
        .expect("run fontgrid");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parsed: Value = serde_json::from_slice(&output.stdout).expect("json");
    let entries = parsed.as_array().expect("array");
    assert!(!entries.is_empty());
    for entry in entries {
        assert_eq!(entry["is_system_font"], Value::Bool(false));
    }
}

#[test]
fn alias_for_fixture_font_uses_frame_length() {
    let fonts = fonts_dir();

    let listed = Command::new(env!("CARGO_BIN_EXE_fontgrid"))
        .args(["list", "--no-system", "--ndjson", "--folder"])
        .arg(&fonts)
        .output()
        .expect("run fontgrid");
    assert!(listed.status.success());
    let first = String::from_utf8_lossy(&listed.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .expect("at least one fixture entry");
    let entry: Value = serde_json::from_str(&first).expect("ndjson line");
    let name = entry["display_name"].as_str().expect("display name").to_string();

    let output = Command::new(env!("CARGO_BIN_EXE_fontgrid"))
        .args(["alias", "--no-system", "--rate", "60", "-f", &name, "--folder"])
        .arg(&fonts)
        .output()
        .expect("run fontgrid");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("[Object]\nframe=0,66\n"), "stdout:\n{stdout}");
}

#[test]
fn preview_writes_png_for_fixture_font() {
    let fonts = fonts_dir();
    let tmp = tempdir().expect("tempdir");
    let png = tmp.path().join("tuffy.png");

    let output = Command::new(env!("CARGO_BIN_EXE_fontgrid"))
        .args(["preview", "--no-system", "-f", "Tuffy", "-t", "Hello", "-o"])
        .arg(&png)
        .arg("--folder")
        .arg(&fonts)
        .output()
        .expect("run fontgrid");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(png.exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), png.display().to_string());
}
