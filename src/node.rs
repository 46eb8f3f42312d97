use crate::data::{PointId, Value};
use crate::splitter::{LabelCounts, Split};
use hashbrown::HashSet;
use std::fmt;

/// Handle of a node inside the tree's arena.
pub type NodeId = usize;

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Terminal node, owning the ids of the points routed to it.
    Leaf { members: HashSet<PointId> },
    /// Node routing points to two children.
    Internal {
        split: Split,
        left_child: NodeId,
        right_child: NodeId,
    },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub num: NodeId,
    pub depth: usize,
    pub parent_node: Option<NodeId>,
    pub counts: LabelCounts,
    /// Inserts and removals routed through this node since its split was last chosen.
    pub dirty_count: usize,
    /// Leaf updates to wait for before trying to split again, after an
    /// attempt found no admissible split.
    pub split_retry_after: usize,
    pub kind: NodeKind,
}

impl Node {
    pub fn new_leaf(
        num: NodeId,
        depth: usize,
        parent_node: Option<NodeId>,
        members: HashSet<PointId>,
        counts: LabelCounts,
    ) -> Self {
        Node {
            num,
            depth,
            parent_node,
            counts,
            dirty_count: 0,
            split_retry_after: 0,
            kind: NodeKind::Leaf { members },
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.counts.total()
    }

    /// Majority label of the points routed here, ties go negative.
    #[inline]
    pub fn label(&self) -> bool {
        self.counts.majority()
    }

    pub fn split(&self) -> Option<&Split> {
        match &self.kind {
            NodeKind::Internal { split, .. } => Some(split),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Internal {
                left_child,
                right_child,
                ..
            } => Some((left_child, right_child)),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn members(&self) -> Option<&HashSet<PointId>> {
        match &self.kind {
            NodeKind::Leaf { members } => Some(members),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Get the child a feature vector is routed to, `None` at a leaf.
    #[inline]
    pub fn get_child_idx(&self, features: &[Value]) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Internal {
                split,
                left_child,
                right_child,
            } => {
                if split.goes_left(features) {
                    Some(*left_child)
                } else {
                    Some(*right_child)
                }
            }
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Turn this node into a parent, handing back the members it held as a leaf.
    pub fn make_parent_node(&mut self, split: Split, left_child: NodeId, right_child: NodeId) -> HashSet<PointId> {
        self.dirty_count = 0;
        self.split_retry_after = 0;
        let old = std::mem::replace(
            &mut self.kind,
            NodeKind::Internal {
                split,
                left_child,
                right_child,
            },
        );
        match old {
            NodeKind::Leaf { members } => members,
            NodeKind::Internal { .. } => HashSet::new(),
        }
    }

    /// Turn this node into a leaf holding `members`.
    pub fn make_leaf_node(&mut self, members: HashSet<PointId>) {
        self.dirty_count = 0;
        self.split_retry_after = 0;
        self.kind = NodeKind::Leaf { members };
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            NodeKind::Leaf { .. } => write!(
                f,
                "{}:leaf={},count={},pos={},neg={}",
                self.num,
                self.label(),
                self.point_count(),
                self.counts.positive,
                self.counts.negative
            ),
            NodeKind::Internal {
                split,
                left_child,
                right_child,
            } => write!(
                f,
                "{}:[{}] yes={},no={},count={},pos={},neg={}",
                self.num,
                split,
                left_child,
                right_child,
                self.point_count(),
                self.counts.positive,
                self.counts.negative
            ),
        }
    }
}
