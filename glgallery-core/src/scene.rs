//! A minimal scene graph: a [`Model`] owns a tree of [`ModelNode`]s, each holding meshes.
//!
//! The graph is generic over the mesh type so the same tree can carry CPU-side [`MeshData`]
//! or GPU meshes. Nodes own their meshes and children outright, so dropping a model releases
//! everything top-down: a node's meshes go before its children.
//!
//! [`MeshData`]: crate::geometry::MeshData

use glam::Mat4;

use crate::{aabb::Aabb, geometry::MeshData};

/// Anything with an object-space bounding box.
pub trait Bounded {
    fn bounds(&self) -> Aabb;
}

impl Bounded for MeshData {
    fn bounds(&self) -> Aabb {
        MeshData::bounds(self)
    }
}

/// A node in the model tree.
pub struct ModelNode<M> {
    pub name: String,
    pub transform: Mat4,
    // Field order matters: meshes are dropped before children.
    meshes: Vec<M>,
    children: Vec<ModelNode<M>>,
}

impl<M> ModelNode<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: M) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn add_mesh(&mut self, mesh: M) {
        self.meshes.push(mesh);
    }

    /// Adds a child and returns its index.
    pub fn add_child(&mut self, child: ModelNode<M>) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn meshes(&self) -> &[M] {
        &self.meshes
    }

    pub fn children(&self) -> &[ModelNode<M>] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&ModelNode<M>> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut ModelNode<M>> {
        self.children.get_mut(index)
    }

    /// Depth-first search by name, including this node.
    pub fn find(&self, name: &str) -> Option<&ModelNode<M>> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut ModelNode<M>> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    fn count(&self) -> (usize, usize) {
        self.children
            .iter()
            .map(ModelNode::count)
            .fold((1, self.meshes.len()), |(n, m), (cn, cm)| (n + cn, m + cm))
    }

    fn visit_with<F: FnMut(Mat4, &ModelNode<M>)>(&self, parent: Mat4, f: &mut F) {
        let world = parent * self.transform;
        f(world, self);
        for child in &self.children {
            child.visit_with(world, f);
        }
    }
}

impl<M: Bounded> ModelNode<M> {
    /// Bounds of this subtree in the parent's space.
    pub fn bounds(&self) -> Aabb {
        let mut local = Aabb::default();
        for mesh in &self.meshes {
            local.union_box(&mesh.bounds());
        }
        for child in &self.children {
            local.union_box(&child.bounds());
        }
        local.transformed(self.transform)
    }
}

/// A model: the owner of one node tree.
pub struct Model<M> {
    root: ModelNode<M>,
}

impl<M> Model<M> {
    pub fn new(root: ModelNode<M>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ModelNode<M> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ModelNode<M> {
        &mut self.root
    }

    pub fn node_count(&self) -> usize {
        self.root.count().0
    }

    pub fn mesh_count(&self) -> usize {
        self.root.count().1
    }

    /// Calls `f` for every node, depth-first, with the node's model-space transform.
    pub fn visit<F: FnMut(Mat4, &ModelNode<M>)>(&self, mut f: F) {
        self.root.visit_with(Mat4::IDENTITY, &mut f);
    }
}

impl<M: Bounded> Model<M> {
    pub fn bounds(&self) -> Aabb {
        self.root.bounds()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use glam::Vec3;

    use super::*;
    use crate::geometry::cube;

    struct Tracked {
        id: u32,
        log: Rc<RefCell<Vec<u32>>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.log.borrow_mut().push(self.id);
        }
    }

    #[test]
    fn world_transforms_compose() {
        let child = ModelNode::<()>::new("child")
            .with_transform(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let mut root = ModelNode::new("root")
            .with_transform(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        root.add_child(child);
        let model = Model::new(root);

        let mut seen = Vec::new();
        model.visit(|world, node| seen.push((node.name.clone(), world.transform_point3(Vec3::ZERO))));
        assert_eq!(seen[0], ("root".to_string(), Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(seen[1], ("child".to_string(), Vec3::new(2.0, 1.0, 0.0)));
    }

    #[test]
    fn bounds_include_children() {
        let mut root = ModelNode::new("root").with_mesh(cube(2.0, [Vec3::ONE; 6]));
        root.add_child(
            ModelNode::new("moved")
                .with_transform(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)))
                .with_mesh(cube(2.0, [Vec3::ONE; 6])),
        );
        let model = Model::new(root);
        let bounds = model.bounds();
        assert_eq!(bounds.min, Vec3::splat(-1.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 1.0));
        assert_eq!(model.node_count(), 2);
        assert_eq!(model.mesh_count(), 2);
    }

    #[test]
    fn empty_model_has_invalid_bounds() {
        let model = Model::<MeshData>::new(ModelNode::new("root"));
        assert!(!model.bounds().valid);
    }

    #[test]
    fn find_by_name() {
        let mut root = ModelNode::<()>::new("root");
        let mut arm = ModelNode::new("arm");
        arm.add_child(ModelNode::new("hand"));
        root.add_child(arm);
        let mut model = Model::new(root);

        assert!(model.root().find("hand").is_some());
        assert!(model.root().find("foot").is_none());

        model
            .root_mut()
            .find_mut("hand")
            .unwrap()
            .set_transform(Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(
            model.root().child(0).unwrap().child(0).unwrap().transform,
            Mat4::from_scale(Vec3::splat(2.0))
        );
    }

    #[test]
    fn drop_releases_top_down() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mesh = |id| Tracked {
            id,
            log: Rc::clone(&log),
        };

        let mut root = ModelNode::new("root").with_mesh(mesh(1));
        let mut child = ModelNode::new("child").with_mesh(mesh(2));
        child.add_child(ModelNode::new("leaf").with_mesh(mesh(3)));
        root.add_child(child);
        root.add_child(ModelNode::new("sibling").with_mesh(mesh(4)));

        drop(Model::new(root));
        assert_eq!(*log.borrow(), vec![1, 2, 3, 4]);
    }
}
