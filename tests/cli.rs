use std::process::{Command, Output};

fn logtree(args: &[&str]) -> Output {
    logtree_with_env(args, &[("LOGTREE_COLOR", "never")])
}

fn logtree_with_env(args: &[&str], vars: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logtree"))
        .args(args)
        .env_remove("LOGTREE_LEVEL")
        .env_remove("LOGTREE_FORMAT")
        .env_remove("LOGTREE_DATETIME_FORMAT")
        .env_remove("LOGTREE_COLOR")
        .env_remove("NO_COLOR")
        .envs(vars.iter().copied())
        .output()
        .expect("failed to run logtree")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn emit_writes_one_line() {
    let output = logtree(&["emit", "--format", "%N %L: %S", "hello", "world"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "app INFO: hello world\n");
}

#[test]
fn emit_filters_only_at_the_leaf() {
    let output = logtree(&[
        "emit",
        "--logger",
        "root.mid.leaf",
        "--level",
        "trace",
        "--threshold",
        "trace",
        "--format",
        "%N %L %S",
        "deep",
    ]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "leaf TRACE deep\n");
}

#[test]
fn emit_below_threshold_prints_nothing() {
    let output = logtree(&["emit", "--level", "debug", "quiet"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "");
}

#[test]
fn fatal_writes_then_aborts() {
    let output = logtree(&["emit", "--level", "fatal", "--format", "%L %S", "boom"]);

    assert!(!output.status.success());
    assert_eq!(stdout(&output), "FATAL boom\n");
}

#[test]
fn fatal_on_disabled_logger_neither_writes_nor_aborts() {
    let output = logtree(&["emit", "--level", "fatal", "--threshold", "off", "boom"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "");
}

#[test]
fn emit_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emit.log");
    let path_arg = path.to_str().unwrap();

    for message in ["first", "second"] {
        let output = logtree(&[
            "emit", "--output", "file", "--file", path_arg, "--format", "%S", message,
        ]);
        assert!(output.status.success());
    }

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
}

#[test]
fn auto_color_never_reaches_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.log");

    let output = logtree_with_env(
        &[
            "emit",
            "--output",
            "file",
            "--file",
            path.to_str().unwrap(),
            "--format",
            "%L %S",
            "--level",
            "error",
            "plain",
        ],
        &[("LOGTREE_COLOR", "auto")],
    );

    assert!(output.status.success());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(!written.contains('\x1b'), "{:?}", written);
    assert_eq!(written, "ERROR plain\n");
}

#[test]
fn configured_level_applies_to_the_issuing_logger() {
    let emit_at = |level: &str| {
        logtree_with_env(
            &["emit", "--logger", "a.b", "--format", "%N %S", "--level", level, "msg"],
            &[("LOGTREE_LEVEL", "warning"), ("LOGTREE_COLOR", "never")],
        )
    };

    let quiet = emit_at("info");
    assert!(quiet.status.success());
    assert_eq!(stdout(&quiet), "");

    let loud = emit_at("error");
    assert!(loud.status.success());
    assert_eq!(stdout(&loud), "b msg\n");
}

#[test]
fn render_keeps_unknown_tokens() {
    let output = logtree(&["render", "--format", "%Q|%L|%S|%", "--level", "fatal", "x"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "%Q|FATAL|x|%\n");
}

#[test]
fn levels_lists_every_severity() {
    let output = logtree(&["levels"]);

    assert_eq!(
        stdout(&output),
        "0  TRACE\n1  DEBUG\n2  INFO\n3  WARNING\n4  ERROR\n5  FATAL\n"
    );
}

#[test]
fn invalid_logger_path_fails() {
    let output = logtree(&["emit", "--logger", "a..b", "x"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("a..b"));
}

#[test]
fn verbose_diagnostics_go_to_stderr() {
    let output = logtree(&["-vvv", "emit", "--format", "%S", "hi"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "hi\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("running command emit"));
}
