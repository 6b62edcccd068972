// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! scadview
//!
//! Renders OpenSCAD sources to STL through the `openscad` executable and
//! turns the resulting meshes into interactive three.js scenes for notebooks
//! and HTML pages.
//!
//! ```no_run
//! let scene = scadview::try_view("cube([60, 20, 10], center = true);", &Default::default())?;
//! scene.write_html("cube.html")?;
//! # Ok::<(), scadview::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod openscad;
pub mod view;
pub mod visualize;

pub use config::ViewConfig;
pub use error::{CompilationError, Error, Result};
pub use geometry::{BoundingBox, Facet, Mesh};
pub use openscad::{detect_executable, Compiler, ExecutableLocator, Probe};
pub use view::{render_stl, try_view, view, view_stl, ViewOptions};
pub use visualize::{compute_grid, GridSpec, GridUnit, SceneBuilder, SceneHandle};
