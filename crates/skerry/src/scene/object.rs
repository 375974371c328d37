//! A node of the entity graph.

use crate::behavior::Behavior;
use crate::component::Component;
use crate::math::{Mat4, Transform, Vec3, matrix_position};

use super::ObjectId;

/// One object: a transform, its parts, and its place in the tree.
///
/// Objects are stored in the [`Scene`](super::Scene) arena; `parent` and
/// `children` are handles into it.
#[derive(Debug)]
pub struct GameObject {
    pub id: ObjectId,
    pub name: String,
    pub transform: Transform,
    pub components: Vec<Component>,
    pub behaviors: Vec<Behavior>,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) children: Vec<ObjectId>,
    pub(crate) local_matrix: Mat4,
    pub(crate) world_matrix: Mat4,
    pub(crate) loaded: bool,
    pub(crate) ready: bool,
    pub(crate) active: bool,
}

impl GameObject {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transform: Transform::IDENTITY,
            components: Vec::new(),
            behaviors: Vec::new(),
            parent: None,
            children: Vec::new(),
            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            loaded: false,
            ready: false,
            active: true,
        }
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    pub fn local_matrix(&self) -> Mat4 {
        self.local_matrix
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// World position as of the last matrix update.
    pub fn world_position(&self) -> Vec3 {
        matrix_position(&self.world_matrix)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// First own component called `name`.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// First own behavior called `name`.
    pub fn behavior(&self, name: &str) -> Option<&Behavior> {
        self.behaviors.iter().find(|b| b.name == name)
    }

    /// Attach a component. Ownership is recorded immediately.
    pub fn add_component(&mut self, mut component: Component) {
        component.owner = Some(self.id);
        self.components.push(component);
    }

    /// Attach a behavior. Ownership is recorded immediately.
    pub fn add_behavior(&mut self, mut behavior: Behavior) {
        behavior.owner = Some(self.id);
        self.behaviors.push(behavior);
    }

    pub(crate) fn refresh_matrices(&mut self, parent_world: &Mat4) {
        self.local_matrix = self.transform.matrix();
        self.world_matrix = *parent_world * self.local_matrix;
    }
}
