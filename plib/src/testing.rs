//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

pub struct TestPlan {
    pub cmd: String,
    pub args: Vec<String>,
    pub stdin_data: String,
    pub expected_out: String,
    pub expected_err: String,
    pub expected_exit_code: i32,
}

pub struct TestPlanU8 {
    pub cmd: String,
    pub args: Vec<String>,
    pub stdin_data: Vec<u8>,
    pub expected_out: Vec<u8>,
    pub expected_err: Vec<u8>,
    pub expected_exit_code: i32,
}

/// Default size of the pieces stdin is fed to the child in.
pub const STDIN_CHUNK: usize = 1024;

/// Path of a workspace binary, relative to the package being tested.
pub fn binary_path(cmd: &str) -> PathBuf {
    let relpath = if cfg!(debug_assertions) {
        format!("target/debug/{}", cmd)
    } else {
        format!("target/release/{}", cmd)
    };

    std::env::current_dir()
        .unwrap()
        .parent()
        .unwrap() // Move up to the workspace root from the current package directory
        .join(relpath)
}

/// Run a test command, writing `stdin_data` to it `chunk_size` bytes at a
/// time with a short pause between writes.
///
/// Small chunks make the child see its input arrive in several reads, which
/// is how buffer-boundary behavior is exercised from the outside.
pub fn run_test_base_chunked(
    cmd: &str,
    args: &Vec<String>,
    stdin_data: &[u8],
    chunk_size: usize,
) -> Output {
    let mut child = Command::new(binary_path(cmd))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|_| panic!("failed to spawn command {cmd}"));

    if let Some(mut stdin) = child.stdin.take() {
        for chunk in stdin_data.chunks(chunk_size.max(1)) {
            if let Err(e) = stdin.write_all(chunk) {
                eprintln!("Error writing to stdin: {}", e);
                break;
            }
            if let Err(e) = stdin.flush() {
                eprintln!("Error flushing stdin: {}", e);
                break;
            }

            thread::sleep(Duration::from_millis(10));
        }
        // Explicitly drop stdin to close the pipe
        drop(stdin);
    }

    child.wait_with_output().expect("failed to wait for child")
}

pub fn run_test_base(cmd: &str, args: &Vec<String>, stdin_data: &[u8]) -> Output {
    run_test_base_chunked(cmd, args, stdin_data, STDIN_CHUNK)
}

fn check_status(output: &Output, expected_exit_code: i32) {
    assert_eq!(output.status.code(), Some(expected_exit_code));
    if expected_exit_code == 0 {
        assert!(output.status.success());
    }
}

pub fn run_test(plan: TestPlan) {
    let output = run_test_base(&plan.cmd, &plan.args, plan.stdin_data.as_bytes());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, plan.expected_out);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr, plan.expected_err);

    check_status(&output, plan.expected_exit_code);
}

pub fn run_test_u8(plan: TestPlanU8) {
    run_test_u8_chunked(plan, STDIN_CHUNK)
}

pub fn run_test_u8_chunked(plan: TestPlanU8, chunk_size: usize) {
    let output = run_test_base_chunked(&plan.cmd, &plan.args, &plan.stdin_data, chunk_size);

    assert_eq!(output.stdout, plan.expected_out);

    assert_eq!(output.stderr, plan.expected_err);

    check_status(&output, plan.expected_exit_code);
}

pub fn run_test_with_checker<F: FnMut(&TestPlan, &Output)>(plan: TestPlan, mut checker: F) {
    let output = run_test_base(&plan.cmd, &plan.args, plan.stdin_data.as_bytes());
    checker(&plan, &output);
}
