// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh loading and bounds

mod bbox;
mod mesh;

pub use bbox::BoundingBox;
pub use mesh::{Facet, Mesh};
