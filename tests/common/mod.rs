#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{TempDir, tempdir};

/// Scratch directory holding a database and upload files for one test case.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn database(&self) -> PathBuf {
        self.temp_dir.path().join("hiring.db")
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// A binary invocation bound to this workspace's database.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("hiring-ledger").expect("binary exists");
        cmd.env("HIRING_DB_PATH", self.database())
            .env_remove("HIRING_DB_BUSY_TIMEOUT_MS")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Uploads `contents` as `name` and asserts success.
    pub fn upload(&self, kind: &str, name: &str, contents: &str) {
        let path = self.write(name, contents);
        self.command()
            .args(["upload", kind, "-i", path.to_str().unwrap()])
            .assert()
            .success();
    }

    /// Seeds two departments, two jobs, and the given employee rows.
    pub fn seed(&self, employees: &str) {
        self.upload("departments", "departments.csv", "1,Sales\n2,Engineering\n");
        self.upload("jobs", "jobs.csv", "1,Manager\n2,Analyst\n");
        self.upload("employees", "employees.csv", employees);
    }
}
