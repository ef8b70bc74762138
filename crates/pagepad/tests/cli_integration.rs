use std::path::Path;
use std::process::{Command, Output};

fn run(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("pagepad.json");
    Command::new(env!("CARGO_BIN_EXE_pagepad"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_edit_commands_are_replayed() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("hello.txt");
    std::fs::write(&file, "Hello\nWorld").unwrap();

    let output = run(
        dir.path(),
        &[
            file.to_str().unwrap(),
            "-c",
            "end",
            "-c",
            "backspace",
            "-c",
            "down",
            "-c",
            "type:!",
        ],
    );
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(" 1 | Hell\n"));
    assert!(out.contains(">2 | Worl!d\n"));
    assert!(out.contains("Ln 2, Col 6 | 2L, originally: 2L 11 bytes"));
    assert!(dir.path().join("pagepad.json").exists());
}

#[test]
fn test_typed_line_break_splits_line() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ab.txt");
    std::fs::write(&file, "ab").unwrap();

    let output = run(
        dir.path(),
        &[file.to_str().unwrap(), "-c", "right", "-c", "type:x\\ny"],
    );
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(" 1 | ax\n"));
    assert!(out.contains(">2 | yb\n"));
    assert!(out.contains("Ln 2, Col 2 | 2L, originally: 1L 2 bytes"));
}

#[test]
fn test_paged_file_shows_window_and_ignores_edits() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("big.txt");
    let text: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
    std::fs::write(&file, text.join("\n")).unwrap();

    let output = run(
        dir.path(),
        &[
            file.to_str().unwrap(),
            "--paged",
            "--chunk-size",
            "16",
            "--viewport-size",
            "5",
            "--start",
            "20",
            "-c",
            "type:X",
        ],
    );
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(">20 | line 19\n"));
    assert!(out.contains(" 24 | line 23\n"));
    assert!(!out.contains('X'));
    assert!(out.contains("50L"));
    assert!(out.contains("chunk 1"));
}

#[test]
fn test_unknown_command_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["-c", "teleport"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unknown command: teleport"));
}
