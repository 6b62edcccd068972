// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types shared by the compiler wrapper and the viewer

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No OpenSCAD binary on the search path or at a known install location
    #[error(
        "OpenSCAD executable autodetection failed (searched: {}). \
         Please specify the path to the OpenSCAD executable.",
        .searched.join(", ")
    )]
    NotFound { searched: Vec<String> },

    /// An explicit executable path was given but is not a file
    #[error("Specified executable {} does not exist.", .0.display())]
    InvalidExecutable(PathBuf),

    /// OpenSCAD could not be started or exited with a non-zero status
    #[error("OpenSCAD failed ({}): {stderr}", exit_label(.status))]
    CompilerInvocation { status: Option<i32>, stderr: String },

    /// OpenSCAD exited cleanly but reported a modeling error
    #[error(transparent)]
    Compilation(Box<CompilationError>),

    #[error("Malformed mesh {}: {reason}", .path.display())]
    MalformedMesh { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "not started".to_string(),
    }
}

impl From<CompilationError> for Error {
    fn from(err: CompilationError) -> Self {
        Error::Compilation(Box::new(err))
    }
}

/// A modeling error reported on OpenSCAD's stderr.
///
/// Carries the SCAD text alongside the diagnostic so both can be shown
/// together in an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    /// Captured stderr of the compiler, verbatim
    pub message: String,
    /// The source that was handed to the compiler
    pub source_text: String,
}

impl CompilationError {
    pub fn new(message: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source_text: source_text.into(),
        }
    }

    /// Write the diagnostic followed by the offending source
    pub fn report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}\nSCAD SOURCE:\n\n{}", self.message, self.source_text)
    }

    /// Print the diagnostic and source to stderr
    pub fn show(&self) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        if let Err(e) = self.report(&mut handle) {
            log::warn!("Failed to print compilation error: {}", e);
        }
    }
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CompilationError {}
