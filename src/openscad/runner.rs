// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Subprocess execution for the OpenSCAD compiler

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs a program to completion and captures its output
pub trait ProcessRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessOutput>;
}

/// Runner backed by `std::process::Command`; blocks until the child exits
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessOutput> {
        let output = Command::new(program).args(args).output()?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_requires_zero() {
        let ok = ProcessOutput {
            status: Some(0),
            ..Default::default()
        };
        assert!(ok.success());

        let failed = ProcessOutput {
            status: Some(2),
            ..Default::default()
        };
        assert!(!failed.success());

        let killed = ProcessOutput::default();
        assert!(!killed.success());
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let result = SystemRunner.run(Path::new("/definitely/not/a/program"), &[]);
        assert!(result.is_err());
    }
}
