//! Experiment
//!
//! Drives a tree over a loaded dataset: splits it into training and test
//! rows, builds the tree statically or replays the training rows through
//! `insert`, and collects predictions for the test rows.
use crate::collection::PointCollection;
use crate::config::TreeConfig;
use crate::data::{Point, PointId, Schema};
use crate::errors::TreeError;
use crate::tree::DynamicTree;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Labeled rows sharing one schema.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub schema: Schema,
    pub rows: Vec<Point>,
}

impl Dataset {
    pub fn new(schema: Schema, rows: Vec<Point>) -> Result<Self, TreeError> {
        for row in &rows {
            schema.validate(&row.features)?;
        }
        Ok(Dataset { schema, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Labels of the test rows next to the tree's predictions for them.
#[derive(Debug)]
pub struct Evaluation {
    pub expected: Vec<bool>,
    pub predicted: Vec<bool>,
    pub tree: DynamicTree,
}

/// Run a full experiment as described by `config`.
pub fn run_experiment(dataset: &Dataset, config: &TreeConfig) -> Result<Evaluation, TreeError> {
    config.validate()?;
    let mut rows: Vec<&Point> = dataset.rows.iter().collect();
    if let Some(seed) = config.seed {
        let mut rng = StdRng::seed_from_u64(seed);
        rows.shuffle(&mut rng);
    }

    let training_nb = (rows.len() as f64 * config.tree_size_proportion) as usize;
    let (train, test) = rows.split_at(training_nb);
    if train.is_empty() {
        warn!("The training split is empty, every prediction will be negative.");
    }
    info!(
        "Running {} experiment: {} training rows, {} test rows.",
        if config.dynamic_mode { "dynamic" } else { "static" },
        train.len(),
        test.len()
    );

    let expected: Vec<bool> = test.iter().map(|p| p.label).collect();
    let (predicted, tree) = if config.dynamic_mode {
        run_dynamic(dataset, config, train, test)?
    } else {
        let points = PointCollection::from_points(dataset.schema.clone(), train.iter().map(|p| (*p).clone()))?;
        let tree = DynamicTree::build(points, config)?;
        let predicted = test.iter().map(|p| tree.predict(&p.features)).collect();
        (predicted, tree)
    };

    Ok(Evaluation {
        expected,
        predicted,
        tree,
    })
}

fn run_dynamic(
    dataset: &Dataset,
    config: &TreeConfig,
    train: &[&Point],
    test: &[&Point],
) -> Result<(Vec<bool>, DynamicTree), TreeError> {
    let mut initial_nb = (train.len() as f64 * config.initial_proportion) as usize;
    if initial_nb == 0 && !train.is_empty() {
        initial_nb = 1;
    }
    let (initial, replay) = train.split_at(initial_nb);

    // Ids are handed out in insertion order, so the window front is the oldest point.
    let mut window: VecDeque<PointId> = VecDeque::with_capacity(train.len());
    let mut points = PointCollection::new(dataset.schema.clone());
    for p in initial {
        window.push_back(points.insert((*p).clone())?);
    }
    let mut tree = DynamicTree::build(points, config)?;

    let (mut splits, mut collapses, mut rebuilds) = (0, 0, 0);
    for p in replay {
        window.push_back(tree.insert((*p).clone())?);
        let cost = tree.last_update();
        splits += cost.splits;
        rebuilds += cost.rebuilds;
    }
    info!(
        "Replayed {} training rows: {} splits, {} rebuilds, {} nodes.",
        replay.len(),
        splits,
        rebuilds,
        tree.n_nodes()
    );

    let predicted = if config.sliding_window {
        let mut predicted = Vec::with_capacity(test.len());
        for p in test {
            predicted.push(tree.predict(&p.features));
            window.push_back(tree.insert((*p).clone())?);
            if let Some(oldest) = window.pop_front() {
                tree.remove(oldest)?;
                collapses += tree.last_update().collapses;
            }
        }
        info!(
            "Slid the window over {} test rows: {} collapses, {} live points.",
            test.len(),
            collapses,
            tree.len()
        );
        predicted
    } else {
        test.iter().map(|p| tree.predict(&p.features)).collect()
    };
    Ok((predicted, tree))
}
