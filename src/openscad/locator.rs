// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OpenSCAD executable detection
//!
//! Detection is an ordered list of probes. The first probe that yields a file
//! wins; nothing is cached, so every call re-probes the filesystem.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A single strategy for finding the compiler binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Look for any of `names` inside each of `dirs`, in order
    SearchPath {
        dirs: Vec<PathBuf>,
        names: Vec<OsString>,
    },
    /// A fixed install location, accepted if it is a file
    KnownLocation(PathBuf),
}

impl Probe {
    /// Search the directories of the `PATH` environment variable
    pub fn path_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self::search_path(dirs)
    }

    /// Search the given directories for the platform's binary names
    pub fn search_path(dirs: Vec<PathBuf>) -> Self {
        Probe::SearchPath {
            dirs,
            names: binary_names(),
        }
    }

    /// Run the probe
    pub fn probe(&self) -> Option<PathBuf> {
        match self {
            Probe::SearchPath { dirs, names } => dirs
                .iter()
                .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
                .find(|candidate| is_executable(candidate)),
            Probe::KnownLocation(path) => path.is_file().then(|| path.clone()),
        }
    }

    /// Short description used in the not-found message
    pub fn describe(&self) -> String {
        match self {
            Probe::SearchPath { dirs, .. } if dirs.is_empty() => "empty search path".to_string(),
            Probe::SearchPath { dirs, .. } => format!("search path ({} dirs)", dirs.len()),
            Probe::KnownLocation(path) => path.display().to_string(),
        }
    }
}

/// Finds the OpenSCAD executable
#[derive(Debug, Clone)]
pub struct ExecutableLocator {
    probes: Vec<Probe>,
}

impl ExecutableLocator {
    /// Create a locator with an explicit probe order
    pub fn new(probes: Vec<Probe>) -> Self {
        Self { probes }
    }

    /// `PATH` lookup followed by the platform install locations
    pub fn system() -> Self {
        let mut probes = vec![Probe::path_env()];
        probes.extend(known_locations().into_iter().map(Probe::KnownLocation));
        Self { probes }
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Locate the executable
    pub fn locate(&self) -> Result<PathBuf> {
        for probe in &self.probes {
            if let Some(found) = probe.probe() {
                log::debug!("Executable path ({}) found.", found.display());
                return Ok(found);
            }
        }

        Err(Error::NotFound {
            searched: self.probes.iter().map(Probe::describe).collect(),
        })
    }
}

impl Default for ExecutableLocator {
    fn default() -> Self {
        Self::system()
    }
}

/// Locate OpenSCAD using the system probes
pub fn detect_executable() -> Result<PathBuf> {
    ExecutableLocator::system().locate()
}

fn binary_names() -> Vec<OsString> {
    if cfg!(windows) {
        vec!["openscad.exe".into(), "openscad.com".into(), "openscad".into()]
    } else {
        vec!["openscad".into()]
    }
}

/// Install locations checked after the search path
pub fn known_locations() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        vec![PathBuf::from(
            "/Applications/OpenSCAD.app/Contents/MacOS/OpenSCAD",
        )]
    } else if cfg!(windows) {
        let program_files = std::env::var_os("ProgramFiles")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
        vec![program_files.join("OpenSCAD").join("openscad.exe")]
    } else {
        vec![
            PathBuf::from("/usr/bin/openscad"),
            PathBuf::from("/usr/local/bin/openscad"),
        ]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
