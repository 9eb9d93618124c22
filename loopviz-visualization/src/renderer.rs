//! Rendering engine interface and a headless implementation

use crate::camera::Camera;
use crate::options::RenderOptions;
use loopviz_core::{Error, Geometry, Point3d, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Opaque handle to one object added to a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// A 3D rendering engine
pub trait Renderer {
    /// Add geometry to the scene and return a handle to the new actor
    fn add_mesh(&mut self, geometry: Geometry, options: &RenderOptions, name: &str) -> Result<ActorId>;

    fn remove_actor(&mut self, actor: ActorId) -> Result<()>;

    fn set_actor_visibility(&mut self, actor: ActorId, visible: bool) -> Result<()>;

    /// Remove the scalar bar titled `title`; `None` only works while a single bar is shown
    fn remove_scalar_bar(&mut self, title: Option<&str>) -> Result<()>;

    fn camera(&self) -> &Camera;

    fn camera_mut(&mut self) -> &mut Camera;

    /// Request a redraw
    fn render(&mut self);

    /// Present the scene; blocks for interaction when `interactive` is set
    fn show(&mut self, interactive: bool) -> Result<()>;
}

/// One actor held by a [`MemoryRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryActor {
    pub name: String,
    pub geometry: Geometry,
    pub options: RenderOptions,
    pub visible: bool,
}

/// Renderer that keeps the scene in memory without drawing it
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    next_actor: u64,
    actors: BTreeMap<ActorId, MemoryActor>,
    scalar_bars: Vec<String>,
    camera: Camera,
    render_count: usize,
    show_count: usize,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor(&self, actor: ActorId) -> Option<&MemoryActor> {
        self.actors.get(&actor)
    }

    /// Actors in the order they were added
    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &MemoryActor)> {
        self.actors.iter().map(|(id, actor)| (*id, actor))
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Titles of the scalar bars currently shown
    pub fn scalar_bars(&self) -> &[String] {
        &self.scalar_bars
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn show_count(&self) -> usize {
        self.show_count
    }

    /// Bounds of all visible actors
    pub fn visible_bounds(&self) -> Option<(Point3d, Point3d)> {
        let corners: Vec<Point3d> = self
            .actors
            .values()
            .filter(|a| a.visible)
            .filter_map(|a| a.geometry.bounds())
            .flat_map(|(lo, hi)| [lo, hi])
            .collect();
        loopviz_core::extent(&corners)
    }

    fn actor_mut(&mut self, actor: ActorId) -> Result<&mut MemoryActor> {
        self.actors
            .get_mut(&actor)
            .ok_or_else(|| Error::Render(format!("unknown actor {:?}", actor)))
    }
}

impl Renderer for MemoryRenderer {
    fn add_mesh(&mut self, geometry: Geometry, options: &RenderOptions, name: &str) -> Result<ActorId> {
        let id = ActorId(self.next_actor);
        self.next_actor += 1;

        if options.show_scalar_bar.unwrap_or(true) && geometry.scalars().is_some() {
            let title = geometry.scalars().map(|s| s.name.clone()).unwrap_or_default();
            if !self.scalar_bars.contains(&title) {
                self.scalar_bars.push(title);
            }
        }

        debug!("Added {} actor {:?} as '{}'", geometry.kind(), id, name);
        self.actors.insert(
            id,
            MemoryActor {
                name: name.to_string(),
                geometry,
                options: options.clone(),
                visible: true,
            },
        );
        Ok(id)
    }

    fn remove_actor(&mut self, actor: ActorId) -> Result<()> {
        self.actors
            .remove(&actor)
            .map(|_| ())
            .ok_or_else(|| Error::Render(format!("unknown actor {:?}", actor)))
    }

    fn set_actor_visibility(&mut self, actor: ActorId, visible: bool) -> Result<()> {
        self.actor_mut(actor)?.visible = visible;
        Ok(())
    }

    fn remove_scalar_bar(&mut self, title: Option<&str>) -> Result<()> {
        let index = match title {
            Some(title) => self.scalar_bars.iter().position(|t| t == title),
            None if self.scalar_bars.len() > 1 => {
                return Err(Error::InvalidArgument(format!(
                    "{} scalar bars shown, pass a title",
                    self.scalar_bars.len()
                )));
            }
            None => self.scalar_bars.first().map(|_| 0),
        };
        match index {
            Some(i) => {
                self.scalar_bars.remove(i);
                Ok(())
            }
            None => Err(Error::Render(format!("no scalar bar {:?}", title))),
        }
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn render(&mut self) {
        self.render_count += 1;
    }

    fn show(&mut self, interactive: bool) -> Result<()> {
        if interactive {
            return Err(Error::Unsupported(
                "the memory renderer cannot be shown interactively".to_string(),
            ));
        }
        if let Some((lo, hi)) = self.visible_bounds() {
            self.camera.reset_to_bounds(lo, hi);
        }
        self.render();
        self.show_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopviz_core::{ScalarArray, TriangleMesh};

    fn triangle() -> Geometry {
        Geometry::Surface(TriangleMesh::from_vertices_and_faces(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(2.0, 0.0, 0.0),
                Point3d::new(0.0, 2.0, 0.0),
            ],
            vec![[0, 1, 2]],
        ))
    }

    #[test]
    fn test_add_remove_and_visibility() {
        let mut renderer = MemoryRenderer::new();
        let a = renderer.add_mesh(triangle(), &RenderOptions::default(), "a").unwrap();
        let b = renderer.add_mesh(triangle(), &RenderOptions::default(), "b").unwrap();
        assert_ne!(a, b);
        assert_eq!(renderer.actor_count(), 2);

        renderer.set_actor_visibility(a, false).unwrap();
        assert!(!renderer.actor(a).unwrap().visible);

        renderer.remove_actor(b).unwrap();
        assert!(renderer.remove_actor(b).is_err());
        assert!(renderer.set_actor_visibility(b, true).is_err());
        assert!(renderer.visible_bounds().is_none());
    }

    #[test]
    fn test_scalar_bars() {
        let mut renderer = MemoryRenderer::new();
        let mut geometry = triangle();
        geometry
            .set_scalars(ScalarArray::new("values", vec![0.0, 1.0, 2.0]))
            .unwrap();
        renderer.add_mesh(geometry.clone(), &RenderOptions::default(), "painted").unwrap();
        renderer
            .add_mesh(geometry, &RenderOptions::default().with_scalar_bar(false), "quiet")
            .unwrap();
        assert_eq!(renderer.scalar_bars(), &["values".to_string()]);

        renderer.remove_scalar_bar(None).unwrap();
        assert!(renderer.remove_scalar_bar(Some("values")).is_err());
        assert!(renderer.remove_scalar_bar(None).is_err());
    }

    #[test]
    fn test_untitled_removal_needs_single_bar() {
        let mut renderer = MemoryRenderer::new();
        for title in ["first", "second"] {
            let mut geometry = triangle();
            geometry
                .set_scalars(ScalarArray::new(title, vec![0.0, 1.0, 2.0]))
                .unwrap();
            renderer.add_mesh(geometry, &RenderOptions::default(), title).unwrap();
        }
        assert!(renderer.remove_scalar_bar(None).is_err());
        assert_eq!(renderer.scalar_bars().len(), 2);

        renderer.remove_scalar_bar(Some("first")).unwrap();
        renderer.remove_scalar_bar(None).unwrap();
        assert!(renderer.scalar_bars().is_empty());
    }

    #[test]
    fn test_show_frames_scene() {
        let mut renderer = MemoryRenderer::new();
        renderer.add_mesh(triangle(), &RenderOptions::default(), "t").unwrap();
        assert!(renderer.show(true).is_err());
        renderer.show(false).unwrap();
        assert_eq!(renderer.show_count(), 1);
        assert_eq!(renderer.render_count(), 1);
        assert_eq!(renderer.camera().focal_point, Point3d::new(1.0, 1.0, 0.0));
    }
}
