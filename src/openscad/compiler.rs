// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OpenSCAD invocation and output classification
//!
//! OpenSCAD signals failure two ways: a non-zero exit status, and an
//! `ERROR` line on stderr while still exiting with status 0. Both are
//! checked independently and map to different error variants.

use super::locator::ExecutableLocator;
use super::runner::{ProcessOutput, ProcessRunner, SystemRunner};
use crate::error::{CompilationError, Error, Result};
use std::ffi::OsString;
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Marker OpenSCAD prints on stderr for modeling errors
pub const ERROR_MARKER: &str = "ERROR";

const TEMP_PREFIX: &str = ".scadview-";

/// Wrapper around the external OpenSCAD compiler
#[derive(Debug, Clone)]
pub struct Compiler<R = SystemRunner> {
    executable: Option<PathBuf>,
    locator: ExecutableLocator,
    input_dir: PathBuf,
    runner: R,
}

impl Compiler<SystemRunner> {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for Compiler<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> Compiler<R> {
    /// Create a compiler that spawns processes through `runner`
    pub fn with_runner(runner: R) -> Self {
        Self {
            executable: None,
            locator: ExecutableLocator::system(),
            input_dir: PathBuf::from("."),
            runner,
        }
    }

    /// Use an explicit executable instead of autodetection
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Set the executable only when one is given
    pub fn maybe_executable(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.executable = path.map(Into::into);
        self
    }

    pub fn locator(mut self, locator: ExecutableLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Directory for the transient `.scad` input.
    ///
    /// Defaults to the working directory so relative `use`/`include`
    /// statements resolve the same way they would for a file there.
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// The explicit executable if it exists, otherwise whatever the locator finds
    pub fn resolve_executable(&self) -> Result<PathBuf> {
        match &self.executable {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(path) => Err(Error::InvalidExecutable(path.clone())),
            None => self.locator.locate(),
        }
    }

    /// Compile SCAD source text into a mesh at `output`
    pub fn compile<S: Display + ?Sized>(&self, source: &S, output: &Path) -> Result<()> {
        let executable = self.resolve_executable()?;
        let source_text = source.to_string();

        let mut input = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".scad")
            .tempfile_in(&self.input_dir)?;
        input.write_all(source_text.as_bytes())?;
        input.flush()?;

        self.invoke(&executable, input.path(), output, || Ok(source_text))
    }

    /// Compile an existing `.scad` file into a mesh at `output`
    pub fn compile_file(&self, scad_file: &Path, output: &Path) -> Result<()> {
        let executable = self.resolve_executable()?;
        self.invoke(&executable, scad_file, output, || {
            Ok(std::fs::read_to_string(scad_file)?)
        })
    }

    fn invoke<F>(&self, executable: &Path, input: &Path, output: &Path, source: F) -> Result<()>
    where
        F: FnOnce() -> Result<String>,
    {
        // OpenSCAD writes into a sibling temp file; `output` only sees a finished mesh
        let staged = staging_file(output)?;

        let args: Vec<OsString> = vec![
            "-o".into(),
            staged.path().as_os_str().to_owned(),
            input.as_os_str().to_owned(),
        ];
        log::info!("{} {:?}", executable.display(), args);

        let result = self
            .runner
            .run(executable, &args)
            .map_err(|e| Error::CompilerInvocation {
                status: None,
                stderr: e.to_string(),
            })?;

        classify(result, source)?;

        staged.persist(output).map_err(|e| Error::Io(e.error))?;
        log::debug!("Mesh written to {}", output.display());
        Ok(())
    }
}

/// Apply the two success checks to a finished compiler run
pub fn classify<F>(output: ProcessOutput, source: F) -> Result<ProcessOutput>
where
    F: FnOnce() -> Result<String>,
{
    let exited_cleanly = output.success();
    if !exited_cleanly {
        return Err(Error::CompilerInvocation {
            status: output.status,
            stderr: output.stderr,
        });
    }

    let reported_error = output.stderr.contains(ERROR_MARKER);
    if reported_error {
        return Err(CompilationError::new(output.stderr, source()?).into());
    }

    Ok(output)
}

fn staging_file(output: &Path) -> Result<NamedTempFile> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    Ok(Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(&suffix)
        .tempfile_in(dir)?)
}

/// Compile `source` with an optional explicit executable
pub fn compile<S: Display + ?Sized>(
    source: &S,
    output: &Path,
    executable: Option<&Path>,
) -> Result<()> {
    Compiler::new().maybe_executable(executable).compile(source, output)
}
