//! CLI integration tests
//!
//! These verify the command-line interface behavior, including:
//! - Settings discovery
//! - Output formatting
//! - Exit codes

mod support;

use serial_test::serial;
use std::path::PathBuf;
use std::process::{Command, Output};
use support::Fixture;
use yare::parameterized;

fn modulegen_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_modulegen"))
}

fn command_module(name: &str, module_type: &str, command: &str) -> String {
    format!(
        "\n[[modules]]\nsource = \"builtin\"\ntype_name = \"command\"\noptions = {{ name = \"{}\", module_type = \"{}\", path = \"python\", command = {} }}\n",
        name, module_type, command
    )
}

fn run(fixture: &Fixture, args: &[&str]) -> Output {
    Command::new(modulegen_bin())
        .arg("--settings")
        .arg(fixture.settings_path())
        .args(args)
        .env_remove("MODULEGEN_SETTINGS")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute modulegen")
}

#[test]
fn test_cli_help() {
    let output = Command::new(modulegen_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute modulegen");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("modulegen"));
    assert!(stdout.contains("parse"));
    assert!(stdout.contains("append"));
    assert!(stdout.contains("list"));
}

#[test]
fn test_cli_version() {
    let output = Command::new(modulegen_bin())
        .arg("--version")
        .output()
        .expect("Failed to execute modulegen");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[cfg(unix)]
#[test]
fn test_parse_runs_commands_and_writes_append_files() {
    let fixture = Fixture::new(&[
        command_module(
            "entities",
            "server",
            r#"["sh", "-c", "echo \"$MODULEGEN_SERVER_SYMBOLS\" > python/entities.symbols"]"#,
        ),
        command_module("ui", "client", "[]"),
    ]
    .concat());

    let output = run(&fixture, &["parse", "--format", "json"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["generated"], serde_json::json!(["entities", "ui"]));
    assert_eq!(report["modules"]["server"], serde_json::json!(["entities"]));

    assert_eq!(
        fixture.read("src/game/server/python/entities.symbols").trim(),
        "GAME_DLL;ENABLE_PYTHON;MOD_testmod"
    );
    assert!(fixture
        .read("src/game/server/python/src_append_server.cpp")
        .contains("APPEND_MODULE(entities)"));
    assert!(fixture
        .read("src/game/client/python/src_append_client.cpp")
        .contains("APPEND_MODULE(ui)"));
}

#[cfg(unix)]
#[test]
fn test_parse_single_module() {
    let fixture = Fixture::new(&[
        command_module("entities", "server", r#"["sh", "-c", "touch python/entities.ran"]"#),
        command_module("ui", "client", r#"["sh", "-c", "touch python/ui.ran"]"#),
    ]
    .concat());
    fixture.mkdir("src/game/client/python");

    let output = run(&fixture, &["parse", "--module", "ui", "-f", "json"]);

    assert!(output.status.success());
    assert!(!fixture.path("src/game/server/python/entities.ran").exists());
    assert!(fixture.path("src/game/client/python/ui.ran").exists());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["skipped"], serde_json::json!(["entities"]));
}

#[cfg(unix)]
#[test]
fn test_append_does_not_run_commands() {
    let fixture = Fixture::new(&command_module(
        "entities",
        "server",
        r#"["sh", "-c", "touch python/entities.ran"]"#,
    ));

    let output = run(&fixture, &["append"]);

    assert!(output.status.success());
    assert!(!fixture.path("src/game/server/python/entities.ran").exists());
    assert!(fixture
        .path("src/game/server/python/src_append_server.cpp")
        .exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Module Generation Result"));
}

#[cfg(unix)]
#[test]
fn test_failing_command_exits_with_error() {
    let fixture = Fixture::new(&command_module(
        "entities",
        "server",
        r#"["sh", "-c", "echo generator broke >&2; exit 4"]"#,
    ));

    let output = run(&fixture, &["parse"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Generating module entities failed"));
    assert!(stderr.contains("generator broke"));
    assert!(!fixture
        .path("src/game/server/python/src_append_server.cpp")
        .exists());
}

#[test]
fn test_list_modules() {
    let fixture = Fixture::new(&command_module("physics", "shared", "[]"));

    let output = run(&fixture, &["list", "--format", "yaml"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("builtin::command"));
    assert!(stdout.contains("name: physics"));
    assert!(stdout.contains("module_type: shared"));
}

#[parameterized(
    parse = { &["parse"] },
    append = { &["append"] },
    list = { &["list"] },
)]
fn test_missing_settings_fails(args: &[&str]) {
    let dir = tempfile::TempDir::new().unwrap();

    let output = Command::new(modulegen_bin())
        .args(args)
        .current_dir(dir.path())
        .env_remove("MODULEGEN_SETTINGS")
        .output()
        .expect("Failed to execute modulegen");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("modulegen.toml"));
}

#[test]
#[serial]
fn test_settings_from_environment() {
    let fixture = Fixture::new(&command_module("physics", "shared", "[]"));

    let output = Command::new(modulegen_bin())
        .args(["list", "-f", "json"])
        .current_dir(fixture.root())
        .env("MODULEGEN_SETTINGS", fixture.settings_path())
        .output()
        .expect("Failed to execute modulegen");

    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listing["modules"][0]["name"], "physics");
}

#[test]
fn test_quiet_human_output_is_empty() {
    let fixture = Fixture::new(&command_module("physics", "shared", "[]"));

    let output = run(&fixture, &["-q", "append"]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}
