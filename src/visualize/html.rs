// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! HTML output for scenes
//!
//! The page imports three.js as ES modules and rebuilds the scene from the
//! serialized [`SceneHandle`]. No import map is used so several scenes can
//! live in one notebook document.

use super::scene::SceneHandle;
use crate::error::Result;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

const THREE_URL: &str = "https://esm.sh/three@0.160.0";
const ORBIT_CONTROLS_URL: &str =
    "https://esm.sh/three@0.160.0/examples/jsm/controls/OrbitControls.js";

static NEXT_CONTAINER: AtomicUsize = AtomicUsize::new(0);

const LOADER_JS: &str = r#"
const floats = (b64) => {
  const bin = atob(b64);
  const bytes = new Uint8Array(bin.length);
  for (let i = 0; i < bin.length; i++) bytes[i] = bin.charCodeAt(i);
  return new Float32Array(bytes.buffer);
};

const scene = new THREE.Scene();
const cam = view.camera;
const camera = new THREE.PerspectiveCamera(cam.fov, view.width / view.height, cam.near, cam.far);
camera.up.set(...cam.up);
camera.position.set(...cam.position);
for (const l of cam.children) {
  const light = new THREE.DirectionalLight(l.color, l.intensity);
  light.position.set(...l.position);
  camera.add(light);
}
scene.add(camera);

for (const o of view.scene.children) {
  switch (o.type) {
    case "Mesh": {
      const g = new THREE.BufferGeometry();
      g.setAttribute("position", new THREE.BufferAttribute(floats(o.geometry.position), 3));
      g.setAttribute("normal", new THREE.BufferAttribute(floats(o.geometry.normal), 3));
      const m = new THREE.MeshLambertMaterial({
        color: o.material.color,
        opacity: o.material.opacity,
        transparent: o.material.transparent,
      });
      const mesh = new THREE.Mesh(g, m);
      mesh.position.set(...o.position);
      scene.add(mesh);
      break;
    }
    case "AmbientLight":
      scene.add(new THREE.AmbientLight(o.color, o.intensity));
      break;
    case "GridHelper": {
      const gh = new THREE.GridHelper(o.size, o.divisions, o.colorCenterLine, o.colorGrid);
      gh.rotation.set(...o.rotation);
      gh.position.set(...o.position);
      scene.add(gh);
      break;
    }
    case "AxesHelper":
      scene.add(new THREE.AxesHelper(o.size));
      break;
  }
}

const renderer = new THREE.WebGLRenderer({ antialias: true });
renderer.setSize(view.width, view.height);
container.appendChild(renderer.domElement);

const controls = view.controls.some((c) => c.type === "OrbitControls")
  ? new OrbitControls(camera, renderer.domElement)
  : null;

const animate = () => {
  requestAnimationFrame(animate);
  if (controls) controls.update();
  renderer.render(scene, camera);
};
animate();
"#;

impl SceneHandle {
    /// `<div>` plus module script, suitable for embedding in a larger page
    pub fn html_fragment(&self) -> Result<String> {
        let id = format!(
            "scadview-{}",
            NEXT_CONTAINER.fetch_add(1, Ordering::Relaxed)
        );
        // keep "</script>" inside strings from closing the tag
        let view = self.to_json()?.replace("</", "<\\/");

        Ok(format!(
            "<div id=\"{id}\" style=\"width:{w}px;height:{h}px\"></div>\n\
             <script type=\"module\">\n\
             import * as THREE from \"{three}\";\n\
             import {{ OrbitControls }} from \"{orbit}\";\n\
             const view = {view};\n\
             const container = document.getElementById(\"{id}\");\n\
             {loader}\
             </script>\n",
            id = id,
            w = self.width,
            h = self.height,
            three = THREE_URL,
            orbit = ORBIT_CONTROLS_URL,
            view = view,
            loader = LOADER_JS,
        ))
    }

    /// Standalone HTML page
    pub fn to_html(&self) -> Result<String> {
        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>scadview</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            self.html_fragment()?
        ))
    }

    pub fn write_html(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_html()?)?;
        log::debug!("Scene written to {}", path.as_ref().display());
        Ok(())
    }

    /// Write the fragment framed for the evcxr display protocol
    pub fn evcxr_content<W: Write>(&self, out: &mut W) -> Result<()> {
        let html = self.html_fragment()?;
        writeln!(out, "EVCXR_BEGIN_CONTENT text/html\n{}\nEVCXR_END_CONTENT", html)?;
        Ok(())
    }

    /// Display inline in an evcxr Jupyter notebook
    pub fn evcxr_display(&self) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = self.evcxr_content(&mut handle) {
            log::warn!("Failed to render scene: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Facet, Mesh};
    use crate::visualize::SceneBuilder;
    use nalgebra::{Point3, Vector3};
    use tempfile::TempDir;

    fn triangle() -> Mesh {
        Mesh::new(vec![Facet::new(
            Vector3::new(0.0, 0.0, 1.0),
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        )])
    }

    #[test]
    fn test_fragment_embeds_scene() {
        let mesh = triangle();
        let handle = SceneBuilder::new(&mesh).size(320, 240).build();
        let html = handle.html_fragment().unwrap();

        assert!(html.contains("width:320px;height:240px"));
        assert!(html.contains("OrbitControls"));
        assert!(html.contains("\"type\":\"Mesh\""));
        assert!(html.contains("<script type=\"module\">"));
    }

    #[test]
    fn test_fragments_get_distinct_containers() {
        let mesh = triangle();
        let handle = SceneBuilder::new(&mesh).build();

        let a = handle.html_fragment().unwrap();
        let b = handle.html_fragment().unwrap();
        let id = |html: &str| html.split('"').nth(1).unwrap().to_string();
        assert_ne!(id(&a), id(&b));
    }

    #[test]
    fn test_script_close_is_escaped() {
        let mesh = triangle();
        let handle = SceneBuilder::new(&mesh).color("</script><b>").build();
        let html = handle.html_fragment().unwrap();

        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn test_write_html() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.html");

        let mesh = triangle();
        SceneBuilder::new(&mesh).build().write_html(&path).unwrap();

        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_evcxr_content_framing() {
        let mesh = triangle();
        let handle = SceneBuilder::new(&mesh).size(320, 240).build();

        let mut out = Vec::new();
        handle.evcxr_content(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.first(), Some(&"EVCXR_BEGIN_CONTENT text/html"));
        assert_eq!(lines.last(), Some(&"EVCXR_END_CONTENT"));
        assert!(text.ends_with("EVCXR_END_CONTENT\n"));

        let body = &text["EVCXR_BEGIN_CONTENT text/html\n".len()..text.len() - "\nEVCXR_END_CONTENT\n".len()];
        assert!(body.starts_with("<div id=\"scadview-"));
        assert!(body.contains("width:320px;height:240px"));
        assert!(body.trim_end().ends_with("</script>"));
        assert_eq!(text.matches("EVCXR_BEGIN_CONTENT").count(), 1);
    }
}
