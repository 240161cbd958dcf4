#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Binary under test, with `HOME` pointed at a scratch dir so the
/// user's own config and outbox are never read or written
pub fn rsb() -> Command {
    let mut cmd = cargo_bin_cmd!("rshiftbook");
    cmd.env("HOME", scratch_home());
    cmd
}

fn scratch_home() -> PathBuf {
    let path = env::temp_dir().join("rshiftbook_test_home");
    fs::create_dir_all(&path).expect("create test home");
    path
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rshiftbook.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fresh empty directory inside tempdir
pub fn temp_dir(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rshiftbook_dir", name));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

/// Run `rshiftbook --db <db> <args...>` and expect success
pub fn ok(db_path: &str, args: &[&str]) {
    rsb().arg("--db").arg(db_path).args(args).assert().success();
}

/// Initialize DB and add the roster used by most tests:
/// worker #1 张三 (200/day), worker #2 Li (180/day), owner #1 Chen, owner #2 Wang
pub fn init_db_with_roster(db_path: &str) {
    rsb()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    ok(db_path, &["worker", "add", "张三", "--rate", "200"]);
    ok(db_path, &["worker", "add", "Li", "--rate", "180"]);
    ok(db_path, &["owner", "add", "Chen"]);
    ok(db_path, &["owner", "add", "Wang"]);
}

/// Assign one half-shift to an owner and mark it present
pub fn work_half(db_path: &str, date: &str, worker: &str, half: &str, owner: &str) {
    ok(db_path, &["assign", date, worker, half, owner]);
    ok(db_path, &["mark", date, worker, half]);
}

/// Full day (AM + PM) billed to one owner
pub fn work_day(db_path: &str, date: &str, worker: &str, owner: &str) {
    work_half(db_path, date, worker, "am", owner);
    work_half(db_path, date, worker, "pm", owner);
}
