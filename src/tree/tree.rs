use crate::collection::PointCollection;
use crate::config::TreeConfig;
use crate::constants::DUMP_INDENT;
use crate::data::{PointId, Value};
use crate::errors::TreeError;
use crate::node::{Node, NodeId, NodeKind};
use crate::splitter::{GiniSplitter, LabelCounts};
use hashbrown::{HashMap, HashSet};
use log::{debug, info};
use std::fmt::{self, Display};

/// Work done by the most recent `insert` or `remove`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct UpdateCost {
    /// Nodes on the root to leaf path whose counters were updated.
    pub nodes_visited: usize,
    pub nodes_created: usize,
    pub nodes_freed: usize,
    /// Point ids read while choosing splits or gathering collapsed members.
    pub points_scanned: usize,
    pub splits: usize,
    pub collapses: usize,
    /// Subtrees rebuilt because their dirty counter crossed the rebuild ratio.
    pub rebuilds: usize,
}

impl UpdateCost {
    /// Total number of nodes read, written, created or freed.
    pub fn nodes_touched(&self) -> usize {
        self.nodes_visited + self.nodes_created + self.nodes_freed
    }
}

/// A binary decision tree over a mutable point set.
///
/// Nodes live in an arena keyed by `NodeId`; freed ids are recycled. Leaves
/// own the ids of their points, while the points themselves are owned by the
/// tree's `PointCollection`.
#[derive(Clone, Debug)]
pub struct DynamicTree {
    pub(crate) points: PointCollection,
    pub(crate) nodes: HashMap<NodeId, Node>,
    free_nodes: Vec<NodeId>,
    next_node: NodeId,
    pub(crate) root: NodeId,
    pub(crate) max_height: usize,
    pub(crate) min_split_points: usize,
    pub(crate) rebuild_ratio: Option<f64>,
    splitter: GiniSplitter,
    pub(crate) cost: UpdateCost,
}

impl DynamicTree {
    /// Greedy top-down construction over every point in `points`.
    pub fn build(points: PointCollection, config: &TreeConfig) -> Result<Self, TreeError> {
        config.validate()?;
        let ids = points.ids();
        let counts = LabelCounts::from_labels(ids.iter().filter_map(|id| points.label(*id)));
        let members: HashSet<PointId> = ids.into_iter().collect();

        let mut tree = DynamicTree {
            points,
            nodes: HashMap::new(),
            free_nodes: Vec::new(),
            next_node: 0,
            root: 0,
            max_height: config.height,
            min_split_points: config.min_split_points,
            rebuild_ratio: config.rebuild_ratio,
            splitter: GiniSplitter::new(config.min_split_points),
            cost: UpdateCost::default(),
        };
        tree.root = tree.alloc_node(0, None, members, counts);
        tree.grow(tree.root);
        tree.cost = UpdateCost::default();

        info!(
            "Built tree over {} points: {} nodes, {} leaves, depth {}.",
            tree.len(),
            tree.n_nodes(),
            tree.n_leaves(),
            tree.depth()
        );
        Ok(tree)
    }

    fn alloc_node(
        &mut self,
        depth: usize,
        parent_node: Option<NodeId>,
        members: HashSet<PointId>,
        counts: LabelCounts,
    ) -> NodeId {
        let num = self.free_nodes.pop().unwrap_or_else(|| {
            let n = self.next_node;
            self.next_node += 1;
            n
        });
        self.nodes
            .insert(num, Node::new_leaf(num, depth, parent_node, members, counts));
        self.cost.nodes_created += 1;
        num
    }

    /// Whether a node must be a leaf: it sits at the height limit, holds
    /// fewer than twice `min_split_points` points, or is pure.
    pub(crate) fn is_leaf_condition(&self, node: &Node) -> bool {
        node.depth >= self.max_height || node.point_count() < 2 * self.min_split_points || node.counts.is_pure()
    }

    /// Split leaves top-down, starting at `node_idx`, until every leaf meets
    /// a stopping condition or has no admissible split.
    fn grow(&mut self, node_idx: NodeId) {
        let mut growable = vec![node_idx];
        while let Some(idx) = growable.pop() {
            if let Some((left, right)) = self.split_leaf(idx) {
                growable.push(right);
                growable.push(left);
            }
        }
    }

    /// Choose a split over the points of a single leaf and give it two new
    /// leaf children. Returns `None` if the leaf stays a leaf.
    ///
    /// A leaf with no admissible split is not scanned again until it has
    /// received as many updates as it held points at the failed attempt.
    fn split_leaf(&mut self, node_idx: NodeId) -> Option<(NodeId, NodeId)> {
        let node = &self.nodes[&node_idx];
        if self.is_leaf_condition(node) || node.dirty_count < node.split_retry_after {
            return None;
        }
        let depth = node.depth;
        let mut members: Vec<PointId> = node.members()?.iter().copied().collect();
        members.sort_unstable();
        self.cost.points_scanned += members.len();

        let info = match self.splitter.best_split(&self.points, &members) {
            Some(info) => info,
            None => {
                if let Some(node) = self.nodes.get_mut(&node_idx) {
                    node.dirty_count = 0;
                    node.split_retry_after = members.len();
                }
                return None;
            }
        };
        let points = &self.points;
        let (left_members, right_members): (HashSet<PointId>, HashSet<PointId>) = members
            .into_iter()
            .partition(|id| points.get(*id).map_or(false, |p| info.split.goes_left(&p.features)));
        let left_counts = LabelCounts::from_labels(left_members.iter().filter_map(|id| points.label(*id)));
        let right_counts = LabelCounts::from_labels(right_members.iter().filter_map(|id| points.label(*id)));

        debug!(
            "Splitting node {} on [{}], gain {:.6}: {} left, {} right.",
            node_idx,
            info.split,
            info.split_gain,
            left_members.len(),
            right_members.len()
        );
        let left = self.alloc_node(depth + 1, Some(node_idx), left_members, left_counts);
        let right = self.alloc_node(depth + 1, Some(node_idx), right_members, right_counts);
        if let Some(node) = self.nodes.get_mut(&node_idx) {
            node.make_parent_node(info.split, left, right);
        }
        self.cost.splits += 1;
        Some((left, right))
    }

    /// Turn `node_idx` into a leaf holding every point of its subtree,
    /// freeing all of its descendants.
    fn collapse(&mut self, node_idx: NodeId) {
        let (left, right) = match self.nodes[&node_idx].children() {
            Some(children) => children,
            None => return,
        };
        let mut members = HashSet::new();
        let mut stack = vec![left, right];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.nodes.remove(&idx) {
                self.free_nodes.push(idx);
                self.cost.nodes_freed += 1;
                match node.kind {
                    NodeKind::Leaf { members: m } => {
                        self.cost.points_scanned += m.len();
                        members.extend(m);
                    }
                    NodeKind::Internal {
                        left_child,
                        right_child,
                        ..
                    } => {
                        stack.push(left_child);
                        stack.push(right_child);
                    }
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(&node_idx) {
            node.make_leaf_node(members);
        }
    }

    /// Rerun the split-or-leaf decision for `node_idx` alone, using only the
    /// points currently routed to it. Its children, if split, stay leaves.
    pub(crate) fn rebuild_subtree(&mut self, node_idx: NodeId) {
        self.collapse(node_idx);
        self.split_leaf(node_idx);
    }

    /// Replace the subtree at `node_idx` by a full static build over its points.
    pub(crate) fn regrow_subtree(&mut self, node_idx: NodeId) {
        self.collapse(node_idx);
        self.grow(node_idx);
    }

    /// Nodes visited from the root to the leaf a feature vector routes to.
    pub(crate) fn walk<'a>(&'a self, features: &'a [Value]) -> impl Iterator<Item = NodeId> + 'a {
        std::iter::successors(Some(self.root), move |idx| self.nodes[idx].get_child_idx(features))
    }

    /// Root to leaf path followed by a feature vector.
    pub(crate) fn route(&self, features: &[Value]) -> Vec<NodeId> {
        let mut path = Vec::with_capacity(self.max_height + 1);
        path.extend(self.walk(features));
        path
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, node_idx: NodeId) -> Option<&Node> {
        self.nodes.get(&node_idx)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.values().filter(|n| n.is_leaf()).count()
    }

    /// Depth of the deepest node.
    pub fn depth(&self) -> usize {
        self.nodes.values().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Number of live points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &PointCollection {
        &self.points
    }

    /// Give back the point collection, dropping the tree.
    pub fn into_points(self) -> PointCollection {
        self.points
    }

    pub fn max_height(&self) -> usize {
        self.max_height
    }

    pub fn min_split_points(&self) -> usize {
        self.min_split_points
    }

    pub fn last_update(&self) -> UpdateCost {
        self.cost
    }

    /// Leaf currently holding the point, if the point is in the tree.
    pub fn leaf_of(&self, id: PointId) -> Option<NodeId> {
        let point = self.points.get(id)?;
        let leaf = *self.route(&point.features).last()?;
        match self.nodes[&leaf].members() {
            Some(members) if members.contains(&id) => Some(leaf),
            _ => None,
        }
    }

    /// Leaf size weighted Gini impurity over the live points.
    pub fn weighted_impurity(&self) -> f64 {
        let n = self.len();
        if n == 0 {
            return 0.0;
        }
        self.nodes
            .values()
            .filter(|node| node.is_leaf())
            .map(|node| node.point_count() as f64 / n as f64 * node.counts.gini())
            .sum()
    }
}

impl Display for DynamicTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut print_buffer: Vec<NodeId> = vec![self.root];
        let mut r = String::new();
        while let Some(idx) = print_buffer.pop() {
            let node = &self.nodes[&idx];
            r += format!("{}{}\n", DUMP_INDENT.repeat(node.depth).as_str(), node).as_str();
            if let Some((left, right)) = node.children() {
                print_buffer.push(right);
                print_buffer.push(left);
            }
        }
        write!(f, "{}", r)
    }
}
