// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Visualization - reference grids, scene assembly and HTML output

pub mod grid;
mod html;
pub mod scene;

pub use grid::{auto_unit, compute_grid, GridPlane, GridSpec, GridUnit, PlaneAxes};
pub use scene::{
    build_scene, AmbientLight, AxesHelper, BufferGeometry, Controls, DirectionalLight,
    GridHelper, LambertMaterial, MeshObject, PerspectiveCamera, Scene, SceneBuilder, SceneHandle,
    SceneObject, DEFAULT_COLOR, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
