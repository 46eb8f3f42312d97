pub mod predict;
pub mod tree;
pub mod update;

pub use tree::{DynamicTree, UpdateCost};

// Unit-testing
#[cfg(test)]
mod tests {

    use crate::collection::PointCollection;
    use crate::config::TreeConfig;
    use crate::data::{FeatureType, Point, PointId, Schema, Value};
    use crate::errors::TreeError;
    use crate::splitter::{Split, SplitKind};
    use crate::tree::tree::DynamicTree;

    fn numeric_tree(features: &[f64], labels: &[bool], config: &TreeConfig) -> (DynamicTree, Vec<PointId>) {
        let mut points = PointCollection::new(Schema::numeric(1));
        let ids = features
            .iter()
            .zip(labels)
            .map(|(f, l)| points.insert(Point::numeric(&[*f], *l)).unwrap())
            .collect();
        (DynamicTree::build(points, config).unwrap(), ids)
    }

    fn scenario_tree() -> (DynamicTree, Vec<PointId>) {
        let config = TreeConfig::default().set_height(2).set_min_split_points(2);
        let labels = [false, false, false, true, true, true, true, true];
        numeric_tree(&[1., 2., 3., 10., 11., 12., 13., 14.], &labels, &config)
    }

    #[test]
    fn test_tree_build() {
        let (tree, _) = scenario_tree();
        println!("{}", tree);

        let root = tree.node(tree.root()).unwrap();
        let split = root.split().unwrap();
        assert_eq!(split.feature, 0);
        match split.kind {
            SplitKind::Numeric(t) => assert!(t > 3.0 && t < 10.0),
            SplitKind::Categorical(_) => panic!("expected a numeric split"),
        }
        assert_eq!(tree.n_nodes(), 3);
        let (left, right) = root.children().unwrap();
        let left = tree.node(left).unwrap();
        let right = tree.node(right).unwrap();
        assert!(left.is_leaf() && right.is_leaf());
        assert!(!left.label() && left.counts.is_pure());
        assert!(right.label() && right.counts.is_pure());

        assert!(!tree.predict(&[Value::Numeric(5.0)]));
        assert!(tree.predict(&[Value::Numeric(13.0)]));
    }

    #[test]
    fn test_insert_into_pure_leaf_keeps_structure() {
        let (mut tree, _) = scenario_tree();
        let root_split = *tree.node(tree.root()).unwrap().split().unwrap();

        let id = tree.insert(Point::numeric(&[100.0], true)).unwrap();
        let root = tree.node(tree.root()).unwrap();
        assert_eq!(*root.split().unwrap(), root_split);
        assert_eq!(root.point_count(), 9);
        assert_eq!(tree.n_nodes(), 3);

        let leaf = tree.leaf_of(id).unwrap();
        assert_eq!(leaf, root.children().unwrap().1);
        assert_eq!(tree.node(leaf).unwrap().point_count(), 6);
        let cost = tree.last_update();
        assert_eq!(cost.splits, 0);
        assert_eq!(cost.nodes_visited, 2);
        assert_eq!(cost.nodes_created, 0);
    }

    #[test]
    fn test_insert_splits_leaf() {
        let config = TreeConfig::default().set_height(3).set_min_split_points(2);
        let (mut tree, _) = numeric_tree(&[1., 2., 10.], &[false, false, true], &config);
        assert_eq!(tree.n_nodes(), 1);

        tree.insert(Point::numeric(&[11.0], true)).unwrap();
        let cost = tree.last_update();
        assert_eq!(cost.splits, 1);
        assert_eq!(cost.nodes_created, 2);
        assert_eq!(tree.n_nodes(), 3);
        assert!(!tree.predict(&[Value::Numeric(1.5)]));
        assert!(tree.predict(&[Value::Numeric(12.0)]));
    }

    #[test]
    fn test_insert_splits_one_level() {
        let config = TreeConfig::default().set_height(4).set_min_split_points(1);
        let (mut tree, _) = numeric_tree(&[1., 2., 3., 4., 5., 6.], &[true; 6], &config);
        assert_eq!(tree.n_nodes(), 1);

        tree.insert(Point::numeric(&[3.5], false)).unwrap();
        let cost = tree.last_update();
        assert_eq!(cost.splits, 1);
        assert_eq!(cost.nodes_created, 2);
        assert_eq!(tree.n_nodes(), 3);
        let root = tree.node(tree.root()).unwrap();
        assert_eq!(*root.split().unwrap(), Split::numeric(0, 3.25));
        let (left, right) = root.children().unwrap();
        assert!(tree.node(left).unwrap().is_leaf());
        // Still mixed, split by a later insert.
        let right = tree.node(right).unwrap();
        assert!(right.is_leaf());
        assert_eq!(right.point_count(), 4);
    }

    #[test]
    fn test_unsplittable_leaf_waits_before_retrying() {
        let labels = [true, false, true, false, true, false];
        let (mut tree, _) = numeric_tree(&[0.0; 6], &labels, &TreeConfig::default());
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.node(tree.root()).unwrap().split_retry_after, 6);

        for _ in 0..5 {
            tree.insert(Point::numeric(&[1.0], true)).unwrap();
            assert_eq!(tree.last_update().points_scanned, 0);
            assert_eq!(tree.n_nodes(), 1);
        }
        tree.insert(Point::numeric(&[1.0], true)).unwrap();
        let cost = tree.last_update();
        assert_eq!(cost.points_scanned, 12);
        assert_eq!(cost.splits, 1);
        assert_eq!(*tree.node(tree.root()).unwrap().split().unwrap(), Split::numeric(0, 0.5));
    }

    #[test]
    fn test_remove_collapses_once() {
        let config = TreeConfig::default().set_height(1).set_min_split_points(2);
        let labels = [false, false, true, true, true, true];
        let (mut tree, ids) = numeric_tree(&[1., 2., 3., 4., 5., 6.], &labels, &config);
        assert_eq!(tree.n_nodes(), 3);
        assert!(!tree.predict(&[Value::Numeric(1.0)]));

        let mut collapses = 0;
        for idx in [5, 4, 0, 1] {
            tree.remove(ids[idx]).unwrap();
            collapses += tree.last_update().collapses;
        }
        assert_eq!(collapses, 1);
        assert_eq!(tree.n_nodes(), 1);
        let root = tree.node(tree.root()).unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.point_count(), 2);
        // Majority of the remaining points {3: true, 4: true}.
        assert!(tree.predict(&[Value::Numeric(1.0)]));
    }

    #[test]
    fn test_remove_not_found_leaves_tree_unchanged() {
        let (mut tree, ids) = scenario_tree();
        let removed = tree.remove(ids[0]).unwrap();
        assert_eq!(removed, Point::numeric(&[1.0], false));
        let before = tree.to_string();

        assert_eq!(tree.remove(ids[0]), Err(TreeError::NotFound(ids[0])));
        assert_eq!(tree.remove(PointId(1000)), Err(TreeError::NotFound(PointId(1000))));
        assert_eq!(tree.to_string(), before);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_insert_schema_mismatch_leaves_tree_unchanged() {
        let (mut tree, _) = scenario_tree();
        let before = tree.to_string();
        let res = tree.insert(Point::numeric(&[1.0, 2.0], true));
        assert!(matches!(res, Err(TreeError::SchemaMismatch(_))));
        let res = tree.insert(Point::new(vec![Value::Categorical(1)], true));
        assert!(matches!(res, Err(TreeError::SchemaMismatch(_))));
        assert_eq!(tree.to_string(), before);
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn test_build_invalid_configuration() {
        let points = PointCollection::new(Schema::numeric(1));
        let config = TreeConfig::default().set_height(0);
        assert!(matches!(
            DynamicTree::build(points, &config),
            Err(TreeError::InvalidConfiguration(..))
        ));
    }

    #[test]
    fn test_empty_tree() {
        let points = PointCollection::new(Schema::numeric(1));
        let mut tree = DynamicTree::build(points, &TreeConfig::default()).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.n_nodes(), 1);
        assert!(!tree.predict(&[Value::Numeric(0.0)]));
        assert_eq!(tree.weighted_impurity(), 0.0);

        let id = tree.insert(Point::numeric(&[1.0], true)).unwrap();
        assert!(tree.predict(&[Value::Numeric(0.0)]));
        tree.remove(id).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.node(tree.root()).unwrap().point_count(), 0);
    }

    #[test]
    fn test_predict_batch() {
        let (tree, _) = scenario_tree();
        let rows: Vec<Vec<Value>> = (0..20).map(|i| vec![Value::Numeric(i as f64)]).collect();
        let serial = tree.predict_batch(&rows, false);
        let parallel = tree.predict_batch(&rows, true);
        assert_eq!(serial, parallel);
        assert_eq!(serial.iter().filter(|p| **p).count(), 13);
    }

    #[test]
    fn test_rebuild_ratio() {
        let config = TreeConfig::default()
            .set_height(2)
            .set_min_split_points(2)
            .set_rebuild_ratio(Some(0.5));
        let labels = [false, false, false, true, true, true, true, true];
        let (mut tree, _) = numeric_tree(&[1., 2., 3., 10., 11., 12., 13., 14.], &labels, &config);

        for i in 0..7 {
            tree.insert(Point::numeric(&[100.0 + i as f64], true)).unwrap();
            assert_eq!(tree.last_update().rebuilds, 0);
        }
        assert_eq!(tree.node(tree.root()).unwrap().dirty_count, 7);
        // 8 updates over 16 points reaches the ratio.
        tree.insert(Point::numeric(&[107.0], true)).unwrap();
        assert_eq!(tree.last_update().rebuilds, 1);
        let root = tree.node(tree.root()).unwrap();
        assert_eq!(root.dirty_count, 0);
        assert_eq!(root.point_count(), 16);
        assert!(!tree.predict(&[Value::Numeric(2.0)]));
        assert!(tree.predict(&[Value::Numeric(50.0)]));
    }

    #[test]
    fn test_categorical_tree() {
        let schema = Schema::new(vec![FeatureType::Categorical, FeatureType::Boolean]);
        let mut points = PointCollection::new(schema);
        for (cat, flag, label) in [(0, false, false), (0, true, false), (1, false, true), (1, true, true), (2, true, false)] {
            points
                .insert(Point::new(vec![Value::Categorical(cat), Value::from(flag)], label))
                .unwrap();
        }
        let config = TreeConfig::default().set_height(2).set_min_split_points(1);
        let tree = DynamicTree::build(points, &config).unwrap();
        println!("{}", tree);

        assert!(tree.predict(&[Value::Categorical(1), Value::from(false)]));
        assert!(!tree.predict(&[Value::Categorical(0), Value::from(true)]));
        // Unseen category routes right.
        assert!(!tree.predict(&[Value::Categorical(42), Value::from(true)]));
        assert_eq!(tree.weighted_impurity(), 0.0);
    }

    #[test]
    fn test_tree_display() {
        let (tree, _) = scenario_tree();
        let dump = tree.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0:[x0 <= 6.5]"));
        assert!(lines[1].starts_with("      1:leaf=false,count=3"));
        assert!(lines[2].starts_with("      2:leaf=true,count=5"));
    }
}
