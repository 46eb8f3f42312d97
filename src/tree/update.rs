//! Tree Updates
//!
//! Insertion and deletion of single points. Each call updates the counters on
//! one root to leaf path and restructures at most one subtree: a leaf that
//! outgrew its stopping condition is split, or the highest internal node that
//! now meets one is collapsed. Splitting a leaf adds exactly one level.
use super::tree::{DynamicTree, UpdateCost};
use crate::data::{Point, PointId};
use crate::errors::TreeError;
use crate::node::{NodeId, NodeKind};
use log::debug;

impl DynamicTree {
    /// Add a point to the tree and its collection, returning its id.
    ///
    /// Fails with `SchemaMismatch` before any mutation if the point does not
    /// match the collection's schema.
    pub fn insert(&mut self, point: Point) -> Result<PointId, TreeError> {
        let label = point.label;
        let id = self.points.insert(point)?;
        self.cost = UpdateCost::default();

        let path = match self.points.get(id) {
            Some(p) => self.route(&p.features),
            None => return Err(TreeError::NotFound(id)),
        };
        for idx in &path {
            if let Some(node) = self.nodes.get_mut(idx) {
                node.counts.add(label);
                node.dirty_count += 1;
            }
        }
        let leaf_idx = path[path.len() - 1];
        if let Some(NodeKind::Leaf { members }) = self.nodes.get_mut(&leaf_idx).map(|n| &mut n.kind) {
            members.insert(id);
        }
        self.cost.nodes_visited = path.len();

        if !self.rebuild_drifted(&path) {
            self.rebuild_subtree(leaf_idx);
        }
        Ok(id)
    }

    /// Remove a point from the tree and its collection, handing it back.
    ///
    /// Fails with `NotFound`, leaving the tree untouched, if the id is unknown
    /// or was already removed.
    pub fn remove(&mut self, id: PointId) -> Result<Point, TreeError> {
        let (path, label) = match self.points.get(id) {
            Some(p) => (self.route(&p.features), p.label),
            None => return Err(TreeError::NotFound(id)),
        };
        let leaf_idx = path[path.len() - 1];
        if !self.nodes[&leaf_idx].members().map_or(false, |m| m.contains(&id)) {
            return Err(TreeError::NotFound(id));
        }
        self.cost = UpdateCost::default();

        for idx in &path {
            if let Some(node) = self.nodes.get_mut(idx) {
                node.counts.remove(label);
                node.dirty_count += 1;
            }
        }
        if let Some(NodeKind::Leaf { members }) = self.nodes.get_mut(&leaf_idx).map(|n| &mut n.kind) {
            members.remove(&id);
        }
        self.cost.nodes_visited = path.len();

        // Only the highest offending node collapses, its descendants go with it.
        let collapse = path.iter().copied().find(|idx| {
            let node = &self.nodes[idx];
            !node.is_leaf() && self.is_leaf_condition(node)
        });
        match collapse {
            Some(idx) => {
                debug!(
                    "Collapsing node {} at depth {}: {} points left.",
                    idx,
                    self.nodes[&idx].depth,
                    self.nodes[&idx].point_count()
                );
                self.rebuild_subtree(idx);
                self.cost.collapses += 1;
            }
            None => {
                self.rebuild_drifted(&path);
            }
        }
        self.points.remove(id)
    }

    /// Rebuild the highest internal node on `path` whose dirty counter
    /// reached `rebuild_ratio` times its point count. Returns whether a
    /// rebuild happened.
    fn rebuild_drifted(&mut self, path: &[NodeId]) -> bool {
        let ratio = match self.rebuild_ratio {
            Some(ratio) => ratio,
            None => return false,
        };
        let drifted = path.iter().copied().find(|idx| {
            let node = &self.nodes[idx];
            !node.is_leaf() && node.dirty_count as f64 >= ratio * node.point_count() as f64
        });
        match drifted {
            Some(idx) => {
                debug!(
                    "Rebuilding node {} after {} updates over {} points.",
                    idx,
                    self.nodes[&idx].dirty_count,
                    self.nodes[&idx].point_count()
                );
                self.regrow_subtree(idx);
                self.cost.rebuilds += 1;
                true
            }
            None => false,
        }
    }
}
