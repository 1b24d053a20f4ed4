//! Runs the built `mysh` binary end to end.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn mysh() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mysh"));
    cmd.env_remove("MYSH_CONFIG").env_remove("MYSH_LOG");
    cmd
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

fn stderr(o: &Output) -> String {
    String::from_utf8_lossy(&o.stderr).into_owned()
}

fn write_batch(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("batch.txt");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn usage_errors_exit_one() {
    for args in [vec!["a", "b"], vec!["-x"], vec!["--help"], vec!["--", "file"]] {
        let o = mysh().args(&args).stdin(Stdio::null()).output().unwrap();
        assert_eq!(o.status.code(), Some(1), "{:?}", args);
        assert_eq!(stderr(&o), "Usage: mysh [batch-file]\n", "{:?}", args);
        assert!(o.stdout.is_empty());
    }
}

#[test]
fn missing_batch_file_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let o = mysh().arg(&missing).output().unwrap();
    assert_eq!(o.status.code(), Some(1));
    assert_eq!(stderr(&o), format!("Error: Cannot open file {}.\n", missing.display()));
}

#[test]
fn interactive_end_of_input_exits_zero() {
    let o = mysh().stdin(Stdio::null()).output().unwrap();
    assert_eq!(o.status.code(), Some(0));
    assert_eq!(stdout(&o), "mysh> \n");
    assert!(o.stderr.is_empty());
}

#[test]
fn interactive_runs_commands_between_prompts() {
    let o = run_with_stdin(mysh(), "/bin/echo hi\n\n/nonexistent/prog\nexit\n/bin/echo never\n");
    assert_eq!(o.status.code(), Some(0));
    assert_eq!(stdout(&o), "mysh> hi\nmysh> mysh> mysh> ");
    assert_eq!(stderr(&o), "/nonexistent/prog: Command not found.\n");
}

#[test]
fn batch_output_is_not_duplicated_by_failed_exec() {
    let dir = tempfile::tempdir().unwrap();
    let batch = write_batch(
        dir.path(),
        "/bin/echo one\n/nonexistent/prog\n\n/bin/echo two\n",
    );
    let o = mysh().arg(&batch).stdin(Stdio::null()).output().unwrap();
    assert_eq!(o.status.code(), Some(0));
    assert_eq!(
        stdout(&o),
        "/bin/echo one\none\n/nonexistent/prog\n\n/bin/echo two\ntwo\n"
    );
    assert_eq!(stderr(&o), "/nonexistent/prog: Command not found.\n");
}

#[test]
fn long_line_is_truncated_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let long = format!("/bin/echo {}", "z".repeat(700));
    let batch = write_batch(dir.path(), &format!("{}\n/bin/echo ok\n", long));
    let o = mysh().arg(&batch).stdin(Stdio::null()).output().unwrap();
    assert_eq!(o.status.code(), Some(0));
    assert_eq!(
        stdout(&o),
        format!(
            "{}\nwarning: ignoring long command exceeding 512 characters\n/bin/echo ok\nok\n",
            &long[..512]
        )
    );
}

#[test]
fn batch_exit_first_line() {
    let dir = tempfile::tempdir().unwrap();
    let batch = write_batch(dir.path(), "exit\n/bin/echo never\n");
    let o = mysh().arg(&batch).output().unwrap();
    assert_eq!(o.status.code(), Some(0));
    assert_eq!(stdout(&o), "exit\n");
}

#[test]
fn config_supplies_prompt_and_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let rc = dir.path().join("myshrc");
    fs::write(&rc, "prompt=% \nalias.say=/bin/echo said\n").unwrap();

    let mut cmd = mysh();
    cmd.env("MYSH_CONFIG", &rc);
    let o = run_with_stdin(cmd, "say it\n");
    assert_eq!(o.status.code(), Some(0));
    assert_eq!(stdout(&o), "% said it\n% \n");
}

#[test]
fn bad_config_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let rc = dir.path().join("myshrc");
    fs::write(&rc, "alias.exit=/bin/true\n").unwrap();

    let o = mysh().env("MYSH_CONFIG", &rc).stdin(Stdio::null()).output().unwrap();
    assert_eq!(o.status.code(), Some(1));
    assert!(stderr(&o).starts_with("mysh: config: line 1:"), "{}", stderr(&o));
}
