// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reference grid sizing
//!
//! The grid snaps outward to multiples of `unit` around the mesh bounds and
//! keeps one extra cell on any side where the mesh sits exactly on a grid
//! line. All three planes share one extent so the grid stays cubic.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Grid cell size selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GridUnit {
    /// No grid planes
    Disabled,
    /// Power of ten sized to the model
    Auto,
    /// Fixed cell size
    Fixed(f64),
}

impl GridUnit {
    /// Numeric convention: `0` disables, negative (canonically `-1`) is auto.
    ///
    /// NaN and infinite values are not usable cell sizes and fall back to auto.
    pub fn from_value(value: f64) -> Self {
        if !value.is_finite() {
            log::warn!("Ignoring non-finite grid unit {}, using auto", value);
            GridUnit::Auto
        } else if value == 0.0 {
            GridUnit::Disabled
        } else if value < 0.0 {
            GridUnit::Auto
        } else {
            GridUnit::Fixed(value)
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            GridUnit::Disabled => 0.0,
            GridUnit::Auto => -1.0,
            GridUnit::Fixed(unit) => *unit,
        }
    }

    /// Grid for the given bounds, `None` when disabled
    pub fn grid(&self, mesh_min: Point3<f64>, mesh_max: Point3<f64>) -> Option<GridSpec> {
        match self {
            GridUnit::Disabled => None,
            other => Some(compute_grid(mesh_min, mesh_max, other.value())),
        }
    }
}

impl Default for GridUnit {
    fn default() -> Self {
        GridUnit::Auto
    }
}

impl From<f64> for GridUnit {
    fn from(value: f64) -> Self {
        Self::from_value(value)
    }
}

/// Placement of the three reference planes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Lowest grid corner, after buffering
    pub origin: Point3<f64>,
    pub center: Point3<f64>,
    /// Side length shared by all planes
    pub extent: f64,
    /// Cell size actually used
    pub unit: f64,
}

/// Which coordinate plane a grid lies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaneAxes {
    XZ,
    XY,
    YZ,
}

/// One positioned grid plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPlane {
    pub axes: PlaneAxes,
    pub position: Point3<f64>,
    /// Euler rotation in radians applied to a plane lying in X/Z
    pub rotation: Vector3<f64>,
    pub color: &'static str,
}

impl GridSpec {
    /// Number of cells along each side
    pub fn divisions(&self) -> f64 {
        self.extent / self.unit
    }

    /// Each plane sits at `center` on its in-plane axes and at `origin` on its normal
    pub fn planes(&self) -> [GridPlane; 3] {
        let (o, c) = (self.origin, self.center);
        [
            GridPlane {
                axes: PlaneAxes::XZ,
                position: Point3::new(c.x, o.y, c.z),
                rotation: Vector3::zeros(),
                color: "green",
            },
            GridPlane {
                axes: PlaneAxes::XY,
                position: Point3::new(c.x, c.y, o.z),
                rotation: Vector3::new(FRAC_PI_2, 0.0, 0.0),
                color: "blue",
            },
            GridPlane {
                axes: PlaneAxes::YZ,
                position: Point3::new(o.x, c.y, c.z),
                rotation: Vector3::new(0.0, 0.0, FRAC_PI_2),
                color: "red",
            },
        ]
    }
}

/// Power of ten no larger than `view_extent`; 1 for empty or invalid extents
pub fn auto_unit(view_extent: f64) -> f64 {
    if view_extent > 0.0 && view_extent.is_finite() {
        10f64.powi(view_extent.log10().floor() as i32)
    } else {
        1.0
    }
}

/// Compute grid placement for a mesh.
///
/// `unit` follows the [`GridUnit`] numeric convention; negative selects
/// [`auto_unit`], as does a non-finite one. A zero unit must be filtered out
/// by the caller, see [`GridUnit::grid`].
pub fn compute_grid(mesh_min: Point3<f64>, mesh_max: Point3<f64>, unit: f64) -> GridSpec {
    let view_min = mesh_min.coords;
    let view_extent = (mesh_max - mesh_min).max();

    let unit = if unit < 0.0 || !unit.is_finite() {
        auto_unit(view_extent)
    } else {
        unit
    };

    let min_cells = view_min.map(|v| snap_cells(v, unit));
    let grid_min = min_cells.map(|c| c.floor() * unit);
    let min_buffer = min_cells.map(|c| on_grid_line(c, unit));

    let view_max = view_min.add_scalar(view_extent);
    let max_cells = view_max.map(|v| snap_cells(v, unit));
    let grid_max = max_cells.map(|c| c.ceil() * unit);
    let max_buffer = max_cells.map(|c| on_grid_line(c, unit));

    let extent = (grid_max + max_buffer - grid_min + min_buffer).max();
    let origin = grid_min - min_buffer;
    let center = origin.add_scalar(extent / 2.0);

    log::debug!(
        "grid unit {} extent {} origin {:?} center {:?}",
        unit,
        extent,
        origin.as_slice(),
        center.as_slice()
    );

    GridSpec {
        origin: Point3::from(origin),
        center: Point3::from(center),
        extent,
        unit,
    }
}

/// Relative slack when deciding that a coordinate lies on a grid line
const GRID_LINE_TOLERANCE: f64 = 1e-6;

/// `value` measured in cells, rounded to the nearest line when within tolerance
fn snap_cells(value: f64, unit: f64) -> f64 {
    let cells = value / unit;
    let nearest = cells.round();
    if (cells - nearest).abs() <= GRID_LINE_TOLERANCE * nearest.abs().max(1.0) {
        nearest
    } else {
        cells
    }
}

fn on_grid_line(cells: f64, unit: f64) -> f64 {
    if cells.fract() == 0.0 {
        unit
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    #[test]
    fn test_unit_one() {
        let grid = compute_grid(p(0.0, 0.0, 0.0), p(5.0, 5.0, 5.0), 1.0);
        assert_eq!(grid.origin, p(-1.0, -1.0, -1.0));
        assert_eq!(grid.center, p(2.5, 2.5, 2.5));
        assert_eq!(grid.extent, 7.0);
        assert_eq!(grid.divisions(), 7.0);
    }

    #[test]
    fn test_unit_ten() {
        let grid = compute_grid(p(0.0, 0.0, 0.0), p(5.0, 5.0, 5.0), 10.0);
        assert_eq!(grid.origin, p(-10.0, -10.0, -10.0));
        assert_eq!(grid.center, p(0.0, 0.0, 0.0));
        assert_eq!(grid.extent, 20.0);
    }

    #[test]
    fn test_auto_unit() {
        assert_eq!(auto_unit(37.0), 10.0);
        assert_eq!(auto_unit(4.0), 1.0);
        assert_eq!(auto_unit(100.0), 100.0);
        assert_relative_eq!(auto_unit(0.5), 0.1);

        let grid = compute_grid(p(0.0, 0.0, 0.0), p(37.0, 12.0, 3.0), -1.0);
        assert_eq!(grid.unit, 10.0);

        let grid = compute_grid(p(1.5, 0.0, 0.0), p(5.5, 2.0, 1.0), -1.0);
        assert_eq!(grid.unit, 1.0);
    }

    #[test]
    fn test_degenerate_mesh_still_has_extent() {
        let grid = compute_grid(p(2.0, 2.0, 2.0), p(2.0, 2.0, 2.0), -1.0);
        assert_eq!(grid.unit, 1.0);
        assert!(grid.extent > 0.0);

        let grid = compute_grid(p(2.5, 2.5, 2.5), p(2.5, 2.5, 2.5), 1.0);
        assert_eq!(grid.extent, 1.0);
        assert_eq!(grid.origin, p(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_centered_box_off_grid() {
        // cube([60,20,10], center=true)
        let grid = compute_grid(p(-30.0, -10.0, -5.0), p(30.0, 10.0, 5.0), 10.0);

        // -30 is on a grid line, +30 is too
        assert_eq!(grid.origin.x, -40.0);
        assert_eq!(grid.extent, 80.0);
        assert_relative_eq!(grid.center.x, 0.0);
        // every plane encloses the mesh
        for axis in 0..3 {
            assert!(grid.origin[axis] < [-30.0, -10.0, -5.0][axis]);
            assert!(grid.origin[axis] + grid.extent > [30.0, 10.0, 5.0][axis]);
        }
    }

    #[test]
    fn test_planes_positioned_on_normals() {
        let grid = compute_grid(p(0.0, 0.0, 0.0), p(5.0, 5.0, 5.0), 1.0);
        let [xz, xy, yz] = grid.planes();

        assert_eq!(xz.axes, PlaneAxes::XZ);
        assert_eq!(xz.position, p(2.5, -1.0, 2.5));
        assert_eq!(xz.color, "green");

        assert_eq!(xy.position, p(2.5, 2.5, -1.0));
        assert_relative_eq!(xy.rotation.x, FRAC_PI_2);
        assert_eq!(xy.color, "blue");

        assert_eq!(yz.position, p(-1.0, 2.5, 2.5));
        assert_relative_eq!(yz.rotation.z, FRAC_PI_2);
        assert_eq!(yz.color, "red");
    }

    #[test]
    fn test_grid_unit_convention() {
        assert_eq!(GridUnit::from_value(0.0), GridUnit::Disabled);
        assert_eq!(GridUnit::from_value(-1.0), GridUnit::Auto);
        assert_eq!(GridUnit::from_value(2.5), GridUnit::Fixed(2.5));
        assert_eq!(GridUnit::Auto.value(), -1.0);

        assert!(GridUnit::Disabled.grid(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).is_none());
        assert!(GridUnit::from_value(0.0).grid(p(0.0, 0.0, 0.0), p(5.0, 5.0, 5.0)).is_none());
        let grid = GridUnit::Fixed(1.0).grid(p(0.0, 0.0, 0.0), p(5.0, 5.0, 5.0)).unwrap();
        assert_eq!(grid.extent, 7.0);
    }

    #[test]
    fn test_non_finite_unit_is_auto() {
        assert_eq!(GridUnit::from_value(f64::NAN), GridUnit::Auto);
        assert_eq!(GridUnit::from_value(f64::INFINITY), GridUnit::Auto);
        assert_eq!(GridUnit::from_value(f64::NEG_INFINITY), GridUnit::Auto);

        let grid = GridUnit::from_value(f64::NAN)
            .grid(p(0.0, 0.0, 0.0), p(5.0, 5.0, 5.0))
            .unwrap();
        assert_eq!(grid.unit, 1.0);
        assert!(grid.extent.is_finite());

        let grid = GridUnit::Fixed(f64::NAN).grid(p(0.0, 0.0, 0.0), p(5.0, 5.0, 5.0)).unwrap();
        assert_eq!(grid.unit, 1.0);
        assert_eq!(grid.extent, 7.0);
    }

    #[test]
    fn test_decimal_unit_buffers_both_sides() {
        let grid = compute_grid(p(0.0, 0.0, 0.0), p(0.3, 0.3, 0.3), -1.0);
        assert_relative_eq!(grid.unit, 0.1);
        assert_relative_eq!(grid.origin.x, -0.1, epsilon = 1e-12);
        assert_relative_eq!(grid.extent, 0.5, epsilon = 1e-12);
        assert!(grid.origin.x + grid.extent > 0.3 + 0.05);
    }

    #[test]
    fn test_single_precision_bounds_snap_to_lines() {
        // bounds arrive from f32 STL vertices
        let max = 0.3f32 as f64;
        let grid = compute_grid(p(0.0, 0.0, 0.0), p(max, max, max), 0.1);
        assert_relative_eq!(grid.extent, 0.5, epsilon = 1e-12);

        let min = -2.7f32 as f64;
        let grid = compute_grid(p(min, min, min), p(0.0, 0.0, 0.0), 0.1);
        assert_relative_eq!(grid.origin.x, -2.8, epsilon = 1e-9);
    }

    #[test]
    fn test_off_line_coordinates_get_no_buffer() {
        let grid = compute_grid(p(0.25, 0.25, 0.25), p(0.35, 0.35, 0.35), 0.1);
        assert_relative_eq!(grid.origin.x, 0.2, epsilon = 1e-12);
        assert_relative_eq!(grid.extent, 0.2, epsilon = 1e-12);
    }
}
