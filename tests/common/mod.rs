#![allow(dead_code)]
use fudyadt::node::NodeId;
use fudyadt::splitter::LabelCounts;
use fudyadt::{DynamicTree, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Walk the whole tree and panic on the first broken structural property.
pub fn check_tree(tree: &DynamicTree) {
    let counts = check_subtree(tree, tree.root(), 0, None);
    assert_eq!(counts.total(), tree.len(), "root count differs from the live points");
    let members: usize = tree.nodes().filter_map(|n| n.members()).map(|m| m.len()).sum();
    assert_eq!(members, tree.len(), "leaf members differ from the live points");
    let reachable = count_reachable(tree, tree.root());
    assert_eq!(reachable, tree.n_nodes(), "unreachable nodes left in the arena");
}

fn check_subtree(tree: &DynamicTree, idx: NodeId, depth: usize, parent: Option<NodeId>) -> LabelCounts {
    let node = tree.node(idx).expect("dangling child");
    assert_eq!(node.num, idx);
    assert_eq!(node.depth, depth, "node {} at the wrong depth", idx);
    assert_eq!(node.parent_node, parent, "node {} has the wrong parent", idx);
    assert!(node.depth <= tree.max_height(), "node {} below the height limit", idx);

    let counts = match node.children() {
        Some((left, right)) => {
            let leaf_condition = node.depth >= tree.max_height()
                || node.point_count() < 2 * tree.min_split_points()
                || node.counts.is_pure();
            assert!(!leaf_condition, "internal node {} should be a leaf", idx);
            let l = check_subtree(tree, left, depth + 1, Some(idx));
            let r = check_subtree(tree, right, depth + 1, Some(idx));
            LabelCounts::new(l.positive + r.positive, l.negative + r.negative)
        }
        None => {
            let members = node.members().expect("leaf without members");
            let mut counts = LabelCounts::default();
            for id in members {
                let point = tree.points().get(*id).expect("leaf member not in the collection");
                assert_eq!(tree.predict_leaf(&point.features), idx, "{} routed elsewhere", id);
                counts.add(point.label);
            }
            counts
        }
    };
    assert_eq!(node.counts, counts, "node {} counts are stale", idx);
    counts
}

fn count_reachable(tree: &DynamicTree, idx: NodeId) -> usize {
    match tree.node(idx).and_then(|n| n.children()) {
        Some((left, right)) => 1 + count_reachable(tree, left) + count_reachable(tree, right),
        None => 1,
    }
}

/// Two numeric features, labeled by a noisy axis aligned rule.
pub fn random_points(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x0: f64 = rng.gen_range(0.0..100.0);
            let x1: f64 = rng.gen_range(0.0..100.0);
            let label = (x0 > 40.0 && x1 < 70.0) ^ rng.gen_bool(0.05);
            Point::numeric(&[x0.round(), x1.round()], label)
        })
        .collect()
}
