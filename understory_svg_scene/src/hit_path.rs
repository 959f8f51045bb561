// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit paths: named chains of scene node ids used to rebuild transforms.
//!
//! A [`HitPath`] is a handle to one node of a small append-only tree. All
//! handles of a tree share its storage, so a handle keeps its ancestors alive
//! and [`HitPath::path`] always sees the full chain.
//!
//! ## Equality
//!
//! Equality is structural over live parents: two nodes are equal when they
//! have the *same* parent node (identity, not value), equal values and
//! pairwise equal children. Two independently built roots with equal values
//! and no children compare equal, because both have no parent. Two
//! independently built non-root nodes never compare equal, whatever their
//! values, and neither do two distinct nodes that both have children.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use kurbo::Affine;

use crate::scene::Scene;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '/';

#[derive(Debug)]
struct PathNode {
    value: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Handle to a node of a hit path tree.
#[derive(Clone)]
pub struct HitPath {
    tree: Rc<RefCell<Vec<PathNode>>>,
    index: usize,
}

impl HitPath {
    /// Creates the root of a new tree.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            tree: Rc::new(RefCell::new(alloc::vec![PathNode {
                value: String::from(value),
                parent: None,
                children: Vec::new(),
            }])),
            index: 0,
        }
    }

    fn at(&self, index: usize) -> Self {
        Self {
            tree: Rc::clone(&self.tree),
            index,
        }
    }

    /// The node's value.
    #[must_use]
    pub fn value(&self) -> String {
        self.tree.borrow()[self.index].value.clone()
    }

    /// The parent node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let parent = self.tree.borrow()[self.index].parent;
        parent.map(|index| self.at(index))
    }

    /// Returns `true` if this node has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.tree.borrow()[self.index].parent.is_none()
    }

    /// The unique ancestor without a parent.
    #[must_use]
    pub fn root(&self) -> Self {
        let tree = self.tree.borrow();
        let mut index = self.index;
        while let Some(parent) = tree[index].parent {
            index = parent;
        }
        drop(tree);
        self.at(index)
    }

    /// Children in insertion order.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        let children = self.tree.borrow()[self.index].children.clone();
        children.into_iter().map(|index| self.at(index)).collect()
    }

    /// Appends a child with `value` and returns it.
    ///
    /// A blank value adds nothing and returns the parent of this node, or
    /// this node itself when it is the root.
    #[must_use = "the returned handle is the new child"]
    pub fn add_child(&self, value: &str) -> Self {
        if value.trim().is_empty() {
            return self.parent().unwrap_or_else(|| self.clone());
        }
        let mut tree = self.tree.borrow_mut();
        let index = tree.len();
        tree.push(PathNode {
            value: String::from(value),
            parent: Some(self.index),
            children: Vec::new(),
        });
        tree[self.index].children.push(index);
        drop(tree);
        self.at(index)
    }

    /// Appends a copy of `node` and its descendants and returns the copy.
    ///
    /// `None` adds nothing and returns the parent of this node, or this node
    /// itself when it is the root.
    #[must_use = "the returned handle is the new child"]
    pub fn add_node(&self, node: Option<&Self>) -> Self {
        let Some(node) = node else {
            return self.parent().unwrap_or_else(|| self.clone());
        };
        let copy = self.add_child(&node.value());
        if !copy.parent().is_some_and(|parent| parent.same_node(self)) {
            // Blank value: nothing was added.
            return copy;
        }
        for child in node.children() {
            let _ = copy.add_node(Some(&child));
        }
        copy
    }

    fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree) && self.index == other.index
    }

    /// Slash-joined values from below the root down to this node.
    ///
    /// The root's own path is empty.
    #[must_use]
    pub fn path(&self) -> String {
        let tree = self.tree.borrow();
        let mut chain = Vec::new();
        let mut index = self.index;
        while let Some(parent) = tree[index].parent {
            chain.push(tree[index].value.as_str());
            index = parent;
        }
        let mut path = String::new();
        for value in chain.iter().rev() {
            path.push(PATH_SEPARATOR);
            path.push_str(value);
        }
        path
    }

    /// Rebuilds the cumulative transform for a hit on the node whose unique
    /// id is `hit_unique_id`.
    ///
    /// Starts from the inverse display transform, adds the layer transform
    /// when it is not the identity, then adds the transform of every group
    /// named by a path segment. The hit node's own segment is skipped, and a
    /// group transform equal to the layer transform is not applied twice.
    #[must_use]
    pub fn transform(&self, scene: &Scene, hit_unique_id: &str) -> Affine {
        let mut transform = scene.display_transform().inverse();
        let layer = scene.layer_transform();
        if layer != Affine::IDENTITY {
            transform = layer * transform;
        }
        for segment in self.path().split(PATH_SEPARATOR) {
            if segment.is_empty() || segment == hit_unique_id {
                continue;
            }
            if let Some(local) = scene
                .group_by_unique_id(segment)
                .and_then(|group| group.transform)
                && local != layer
            {
                transform = local * transform;
            }
        }
        transform
    }
}

fn nodes_eq(a: &[PathNode], ia: usize, b: &[PathNode], ib: usize, same_tree: bool) -> bool {
    let (na, nb) = (&a[ia], &b[ib]);
    let same_parent = match (na.parent, nb.parent) {
        (None, None) => true,
        (Some(pa), Some(pb)) => same_tree && pa == pb,
        _ => false,
    };
    same_parent
        && na.value == nb.value
        && na.children.len() == nb.children.len()
        && na
            .children
            .iter()
            .zip(&nb.children)
            .all(|(ca, cb)| nodes_eq(a, *ca, b, *cb, same_tree))
}

impl PartialEq for HitPath {
    fn eq(&self, other: &Self) -> bool {
        let same_tree = Rc::ptr_eq(&self.tree, &other.tree);
        let a = self.tree.borrow();
        let b = other.tree.borrow();
        nodes_eq(&a, self.index, &b, other.index, same_tree)
    }
}

impl Eq for HitPath {}

impl fmt::Debug for HitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitPath")
            .field("value", &self.value())
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}
