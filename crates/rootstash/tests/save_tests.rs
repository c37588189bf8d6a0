//! End-to-end save/list tests against a real git checkout.
//!
//! Skipped when `git` is not on PATH.

use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=Dev",
            "-c",
            "user.email=dev@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .env("GIT_AUTHOR_DATE", "1623715200 +0000")
        .env("GIT_COMMITTER_DATE", "1623715200 +0000")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

fn rootstash(store: &Path, root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rootstash"))
        .arg("--dir")
        .arg(store)
        .arg("--root")
        .arg(root)
        .args(args)
        .env("GOOS", "linux")
        .env("GOARCH", "amd64")
        .output()
        .expect("Failed to execute CLI")
}

fn setup_goroot(temp_dir: &TempDir) -> std::path::PathBuf {
    let root = temp_dir.path().join("goroot");
    for (rel, body) in [
        ("bin/go", "go"),
        ("pkg/linux_amd64/runtime.a", "archive"),
        ("pkg/tool/linux_amd64/link", "linker"),
        ("pkg/include/funcdata.h", "#define PCDATA"),
        ("src/runtime/proc.go", "package runtime\n"),
    ] {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
    fs::write(root.join(".gitignore"), "bin/\npkg/\n").unwrap();

    git(&root, &["init", "-q"]);
    git(&root, &["add", "."]);
    git(&root, &["commit", "-q", "-m", "runtime: initial scheduler"]);
    root
}

#[test]
fn test_save_then_list_round_trip() {
    if which::which("git").is_err() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let root = setup_goroot(&temp_dir);
    let store = temp_dir.path().join("store");

    let output = rootstash(&store, &root, &["save", "sched"]);
    assert!(output.status.success(), "{:?}", output);

    let output = rootstash(&store, &root, &["list"]);
    let stdout = String::from_utf8(output.stdout).unwrap();
    let line = stdout.lines().next().unwrap();
    let identity = line.split(' ').next().unwrap();
    assert!(!identity.contains('+'));
    assert!(line.ends_with(" [sched] runtime: initial scheduler"));

    let snap = store.join(identity);
    assert!(snap.join("bin/go").exists());
    assert!(snap.join("pkg/tool/linux_amd64/link").exists());
    assert!(snap.join("src/runtime/proc.go").exists());
    assert!(snap.join("commit").exists());
    assert!(!snap.join("diff").exists());
}

#[test]
fn test_save_dirty_checkout_is_deterministic() {
    if which::which("git").is_err() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let root = setup_goroot(&temp_dir);
    let store = temp_dir.path().join("store");
    fs::write(root.join("src/runtime/proc.go"), "package runtime\n// patched\n").unwrap();

    assert!(rootstash(&store, &root, &["save"]).status.success());
    assert!(rootstash(&store, &root, &["save"]).status.success());

    let names: Vec<String> = fs::read_dir(&store)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    let (_, digest) = names[0].split_once('+').unwrap();
    assert_eq!(digest.len(), 10);

    let diff = fs::read_to_string(store.join(&names[0]).join("diff")).unwrap();
    assert!(diff.contains("+// patched"));
}
