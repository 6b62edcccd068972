// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle mesh loaded from STL

use super::BoundingBox;
use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// One triangle with its face normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
}

impl Facet {
    pub fn new(normal: Vector3<f32>, vertices: [Point3<f32>; 3]) -> Self {
        Self { normal, vertices }
    }
}

/// Non-indexed triangle list, as stored in an STL file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub facets: Vec<Facet>,
}

impl Mesh {
    pub fn new(facets: Vec<Facet>) -> Self {
        Self { facets }
    }

    /// Load a binary or ASCII STL file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mesh = Self::read(&mut reader).map_err(|reason| Error::MalformedMesh {
            path: path.to_path_buf(),
            reason,
        })?;

        log::debug!("Loaded {} facets from {}", mesh.facet_count(), path.display());
        Ok(mesh)
    }

    /// Parse STL data, returning the reason on failure
    pub fn read<R: Read + Seek>(reader: &mut R) -> std::result::Result<Self, String> {
        let stl = stl_io::read_stl(reader).map_err(|e| e.to_string())?;

        let mut facets = Vec::with_capacity(stl.faces.len());
        for face in &stl.faces {
            let mut corners = [Point3::origin(); 3];
            for (corner, &index) in corners.iter_mut().zip(face.vertices.iter()) {
                let v = stl
                    .vertices
                    .get(index)
                    .ok_or_else(|| format!("facet references missing vertex {}", index))?;
                *corner = Point3::new(v[0], v[1], v[2]);
            }

            let normal = Vector3::new(face.normal[0], face.normal[1], face.normal[2]);
            facets.push(Facet::new(normal, corners));
        }

        if facets.is_empty() {
            return Err("mesh contains no facets".to_string());
        }

        Ok(Self { facets })
    }

    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Bounds over every vertex
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.facets.iter().flat_map(|f| f.vertices.iter()))
    }

    /// Flat `[x, y, z, ...]` positions, three vertices per facet
    pub fn positions(&self) -> Vec<f32> {
        self.facets
            .iter()
            .flat_map(|f| f.vertices.iter())
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }

    /// Flat normals with the face normal broadcast to each facet vertex
    pub fn normals(&self) -> Vec<f32> {
        self.facets
            .iter()
            .flat_map(|f| std::iter::repeat(f.normal).take(3))
            .flat_map(|n| [n.x, n.y, n.z])
            .collect()
    }
}
