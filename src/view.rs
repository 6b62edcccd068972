// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! High-level render and view entry points

use crate::error::{Error, Result};
use crate::geometry::Mesh;
use crate::openscad::Compiler;
use crate::visualize::{GridUnit, SceneBuilder, SceneHandle, DEFAULT_COLOR, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Options for [`view`], [`try_view`] and [`view_stl`]
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    /// Pixel width on the page
    pub width: u32,
    /// Pixel height on the page
    pub height: u32,
    pub grid_unit: GridUnit,
    /// Keep the STL here; a temp file is used when unset
    pub outfile: Option<PathBuf>,
    /// OpenSCAD executable, autodetected when unset
    pub executable: Option<PathBuf>,
    pub color: String,
    pub axes: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            grid_unit: GridUnit::Auto,
            outfile: None,
            executable: None,
            color: DEFAULT_COLOR.to_string(),
            axes: true,
        }
    }
}

/// Render SCAD source to an STL file
pub fn render_stl<S: Display + ?Sized>(
    source: &S,
    outfile: impl AsRef<Path>,
    executable: Option<&Path>,
) -> Result<()> {
    Compiler::new()
        .maybe_executable(executable)
        .compile(source, outfile.as_ref())
}

/// Build a scene from an existing STL file
pub fn view_stl(stl_file: impl AsRef<Path>, options: &ViewOptions) -> Result<SceneHandle> {
    let mesh = Mesh::load(stl_file)?;
    Ok(SceneBuilder::new(&mesh)
        .grid(options.grid_unit)
        .axes(options.axes)
        .size(options.width, options.height)
        .color(options.color.as_str())
        .build())
}

/// Render SCAD source and build a scene, propagating every error
pub fn try_view<S: Display + ?Sized>(source: &S, options: &ViewOptions) -> Result<SceneHandle> {
    let executable = options.executable.as_deref();

    match &options.outfile {
        Some(outfile) => {
            render_stl(source, outfile, executable)?;
            view_stl(outfile, options)
        }
        None => {
            // removed when dropped, after the mesh has been read
            let dir = TempDir::new()?;
            let stl = dir.path().join("model.stl");
            render_stl(source, &stl, executable)?;
            view_stl(&stl, options)
        }
    }
}

/// Render SCAD source and build a scene.
///
/// Modeling errors reported by OpenSCAD are printed to stderr together with
/// the source and yield `Ok(None)`; other errors are returned.
pub fn view<S: Display + ?Sized>(source: &S, options: &ViewOptions) -> Result<Option<SceneHandle>> {
    match try_view(source, options) {
        Ok(handle) => Ok(Some(handle)),
        Err(Error::Compilation(err)) => {
            err.show();
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
