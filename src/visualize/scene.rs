// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene assembly
//!
//! The scene is plain data shaped after three.js objects. It is drawn by
//! three.js in the browser, see [`super::html`].

use super::grid::{GridSpec, GridUnit};
use crate::geometry::Mesh;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use nalgebra::Point3;
use serde::{Serialize, Serializer};

pub const DEFAULT_COLOR: &str = "#ebcc34";
pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 400;

/// Camera distance as a multiple of the mesh's max corner
const CAMERA_SCALE: f64 = 5.0;

/// Renderable scene bundle: geometry, camera, lights, grids, axes and controls
#[derive(Debug, Clone, Serialize)]
pub struct SceneHandle {
    pub width: u32,
    pub height: u32,
    pub camera: PerspectiveCamera,
    pub scene: Scene,
    pub controls: Vec<Controls>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    pub children: Vec<SceneObject>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SceneObject {
    Mesh(MeshObject),
    AmbientLight(AmbientLight),
    GridHelper(GridHelper),
    AxesHelper(AxesHelper),
}

#[derive(Debug, Clone, Serialize)]
pub struct MeshObject {
    pub geometry: BufferGeometry,
    pub material: LambertMaterial,
    pub position: [f64; 3],
}

/// Non-indexed geometry; vertex buffers serialize as base64 little-endian f32
#[derive(Debug, Clone, Serialize)]
pub struct BufferGeometry {
    #[serde(serialize_with = "serialize_f32_base64")]
    pub position: Vec<f32>,
    #[serde(serialize_with = "serialize_f32_base64")]
    pub normal: Vec<f32>,
}

impl BufferGeometry {
    pub fn vertex_count(&self) -> usize {
        self.position.len() / 3
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LambertMaterial {
    pub color: String,
    pub opacity: f64,
    pub transparent: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerspectiveCamera {
    pub position: [f64; 3],
    pub up: [f64; 3],
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    /// Lights attached to the camera so they follow the view
    pub children: Vec<DirectionalLight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectionalLight {
    pub color: String,
    pub position: [f64; 3],
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmbientLight {
    pub color: String,
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridHelper {
    pub size: f64,
    pub divisions: f64,
    pub color_center_line: String,
    pub color_grid: String,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

/// X red, Y green, Z blue
#[derive(Debug, Clone, Serialize)]
pub struct AxesHelper {
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Controls {
    /// Orbit the camera around the scene origin
    OrbitControls,
}

fn serialize_f32_base64<S: Serializer>(values: &[f32], serializer: S) -> Result<S::Ok, S::Error> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn to_array(p: Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// Builds a [`SceneHandle`] for a mesh
#[derive(Debug, Clone)]
pub struct SceneBuilder<'a> {
    mesh: &'a Mesh,
    grid: GridUnit,
    axes: bool,
    width: u32,
    height: u32,
    color: String,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            grid: GridUnit::Auto,
            axes: true,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            color: DEFAULT_COLOR.to_string(),
        }
    }

    pub fn grid(mut self, unit: impl Into<GridUnit>) -> Self {
        self.grid = unit.into();
        self
    }

    pub fn axes(mut self, axes: bool) -> Self {
        self.axes = axes;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn build(&self) -> SceneHandle {
        let bounds = self.mesh.bounds();
        let grid = self.grid.grid(bounds.min.cast(), bounds.max.cast());

        let mut handle = compose(self.mesh, grid.as_ref(), self.axes, &self.color);
        handle.width = self.width;
        handle.height = self.height;
        handle
    }
}

/// Compose the scene with default colour and viewport size
pub fn build_scene(mesh: &Mesh, grid: Option<&GridSpec>, axes: bool) -> SceneHandle {
    compose(mesh, grid, axes, DEFAULT_COLOR)
}

fn compose(mesh: &Mesh, grid: Option<&GridSpec>, axes: bool, color: &str) -> SceneHandle {
    let max = mesh.bounds().max.cast::<f64>();

    let mut children = vec![
        SceneObject::Mesh(mesh_object(mesh, color)),
        SceneObject::AmbientLight(AmbientLight {
            color: "#777777".to_string(),
            intensity: 0.5,
        }),
    ];

    if let Some(grid) = grid {
        children.extend(grid_helpers(grid).into_iter().map(SceneObject::GridHelper));
    }

    if axes {
        children.push(SceneObject::AxesHelper(AxesHelper {
            size: (max.coords * 2.0).max(),
        }));
    }

    SceneHandle {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        camera: camera_for(max),
        scene: Scene { children },
        controls: vec![Controls::OrbitControls],
    }
}

fn mesh_object(mesh: &Mesh, color: &str) -> MeshObject {
    MeshObject {
        geometry: BufferGeometry {
            position: mesh.positions(),
            normal: mesh.normals(),
        },
        material: LambertMaterial {
            color: color.to_string(),
            opacity: 1.0,
            transparent: true,
        },
        position: [0.0, 0.0, 0.0],
    }
}

/// Three-quarter view scaled to the mesh, Z up, with a white key light
fn camera_for(mesh_max: Point3<f64>) -> PerspectiveCamera {
    PerspectiveCamera {
        position: to_array(mesh_max * CAMERA_SCALE),
        up: [0.0, 0.0, 1.0],
        fov: 20.0,
        near: 0.1,
        far: 2000.0,
        children: vec![DirectionalLight {
            color: "white".to_string(),
            position: [3.0, 5.0, 1.0],
            intensity: 0.7,
        }],
    }
}

fn grid_helpers(grid: &GridSpec) -> Vec<GridHelper> {
    grid.planes()
        .iter()
        .map(|plane| GridHelper {
            size: grid.extent,
            divisions: grid.divisions(),
            color_center_line: plane.color.to_string(),
            color_grid: plane.color.to_string(),
            position: to_array(plane.position),
            rotation: [plane.rotation.x, plane.rotation.y, plane.rotation.z],
        })
        .collect()
}

impl SceneHandle {
    pub fn mesh(&self) -> Option<&MeshObject> {
        self.scene.children.iter().find_map(|child| match child {
            SceneObject::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    pub fn grid_helpers(&self) -> impl Iterator<Item = &GridHelper> {
        self.scene.children.iter().filter_map(|child| match child {
            SceneObject::GridHelper(grid) => Some(grid),
            _ => None,
        })
    }

    pub fn axes(&self) -> Option<&AxesHelper> {
        self.scene.children.iter().find_map(|child| match child {
            SceneObject::AxesHelper(axes) => Some(axes),
            _ => None,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Facet;
    use nalgebra::Vector3;

    /// Two facets spanning (0,0,0)..(5,5,5)
    fn box_mesh() -> Mesh {
        Mesh::new(vec![
            Facet::new(
                Vector3::new(0.0, 0.0, -1.0),
                [
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(5.0, 0.0, 0.0),
                    Point3::new(0.0, 5.0, 0.0),
                ],
            ),
            Facet::new(
                Vector3::new(0.0, 0.0, 1.0),
                [
                    Point3::new(0.0, 0.0, 5.0),
                    Point3::new(5.0, 5.0, 5.0),
                    Point3::new(0.0, 5.0, 5.0),
                ],
            ),
        ])
    }

    #[test]
    fn test_default_scene() {
        let mesh = box_mesh();
        let handle = SceneBuilder::new(&mesh).build();

        assert_eq!(handle.width, 400);
        assert_eq!(handle.height, 400);
        assert_eq!(handle.camera.position, [25.0, 25.0, 25.0]);
        assert_eq!(handle.camera.up, [0.0, 0.0, 1.0]);
        assert_eq!(handle.camera.children.len(), 1);
        assert_eq!(handle.controls, vec![Controls::OrbitControls]);

        let geometry = &handle.mesh().unwrap().geometry;
        assert_eq!(geometry.vertex_count(), 6);
        assert_eq!(handle.mesh().unwrap().material.color, DEFAULT_COLOR);

        // mesh + ambient + three grids + axes
        assert_eq!(handle.scene.children.len(), 6);
        assert_eq!(handle.axes().unwrap().size, 10.0);
    }

    #[test]
    fn test_grid_disabled() {
        let mesh = box_mesh();
        let handle = SceneBuilder::new(&mesh).grid(0.0).build();

        assert_eq!(handle.grid_helpers().count(), 0);
        assert!(handle.axes().is_some());
    }

    #[test]
    fn test_grid_helpers_follow_grid_spec() {
        let mesh = box_mesh();
        let handle = SceneBuilder::new(&mesh).grid(1.0).build();

        let grids: Vec<_> = handle.grid_helpers().collect();
        assert_eq!(grids.len(), 3);
        for grid in &grids {
            assert_eq!(grid.size, 7.0);
            assert_eq!(grid.divisions, 7.0);
        }
        assert_eq!(grids[0].position, [2.5, -1.0, 2.5]);
        assert_eq!(grids[0].color_grid, "green");
        assert_eq!(grids[1].position, [2.5, 2.5, -1.0]);
        assert_eq!(grids[2].position, [-1.0, 2.5, 2.5]);
    }

    #[test]
    fn test_no_axes_custom_size_and_color() {
        let mesh = box_mesh();
        let handle = SceneBuilder::new(&mesh)
            .axes(false)
            .size(800, 600)
            .color("#ff0000")
            .build();

        assert!(handle.axes().is_none());
        assert_eq!((handle.width, handle.height), (800, 600));
        assert_eq!(handle.mesh().unwrap().material.color, "#ff0000");
    }

    #[test]
    fn test_build_scene_with_explicit_grid() {
        let mesh = box_mesh();
        let grid = crate::visualize::compute_grid(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
            10.0,
        );
        let handle = build_scene(&mesh, Some(&grid), false);

        assert!(handle.grid_helpers().all(|g| g.size == 20.0 && g.divisions == 2.0));
        assert!(handle.axes().is_none());
    }

    #[test]
    fn test_json_shape() {
        let mesh = box_mesh();
        let json: serde_json::Value =
            serde_json::from_str(&SceneBuilder::new(&mesh).build().to_json().unwrap()).unwrap();

        assert_eq!(json["controls"][0]["type"], "OrbitControls");
        assert_eq!(json["scene"]["children"][0]["type"], "Mesh");
        assert_eq!(json["scene"]["children"][2]["type"], "GridHelper");
        assert!(json["scene"]["children"][2]["colorCenterLine"].is_string());

        let encoded = json["scene"]["children"][0]["geometry"]["position"].as_str().unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(bytes.len(), 6 * 3 * 4);
        assert_eq!(f32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]), 5.0);
    }
}
