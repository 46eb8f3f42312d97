//! CSV Experiment
//! ==============
//! Load a labeled CSV file, grow a tree on the training split and report
//! precision, recall and F1 on the held out rows. With `--dynamic` the tree
//! is built on part of the training rows and the rest are inserted one at a
//! time; `--window` additionally slides the training window over the test
//! rows.
//!
//! Rows are `label, feature_1, ..., feature_k` without a header. Column types
//! are inferred once: `0`/`1`/`true`/`false` columns are boolean, columns that
//! all parse as floats are numeric, anything else is categorical.
//!
//! ```bash
//! cargo run --release --example csv_experiment -- data.csv --height 5 --msp 3 --tsp 0.8 --dynamic
//! ```

use fudyadt::{run_experiment, Dataset, FeatureType, Point, Schema, TreeConfig, Value};
use std::collections::HashMap;
use std::env;
use std::error::Error;

fn parse_args() -> Result<(String, TreeConfig), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let mut path = None;
    let mut config = TreeConfig::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--height" => config = config.set_height(args.next().ok_or("--height needs a value")?.parse()?),
            "--msp" => config = config.set_min_split_points(args.next().ok_or("--msp needs a value")?.parse()?),
            "--tsp" => config = config.set_tree_size_proportion(args.next().ok_or("--tsp needs a value")?.parse()?),
            "--seed" => config = config.set_seed(Some(args.next().ok_or("--seed needs a value")?.parse()?)),
            "--dynamic" => config = config.set_dynamic_mode(true),
            "--window" => config = config.set_dynamic_mode(true).set_sliding_window(true),
            _ => path = Some(arg),
        }
    }
    let path = path.ok_or("usage: csv_experiment <file.csv> [--height N] [--msp N] [--tsp F] [--dynamic] [--window]")?;
    Ok((path, config))
}

fn is_boolean(s: &str) -> bool {
    matches!(s, "0" | "1" | "true" | "false")
}

fn is_truthy(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "y")
}

fn infer_type(column: &[&str]) -> FeatureType {
    if column.iter().all(|s| is_boolean(s)) {
        FeatureType::Boolean
    } else if column.iter().all(|s| s.parse::<f64>().map_or(false, |v| !v.is_nan())) {
        FeatureType::Numeric
    } else {
        FeatureType::Categorical
    }
}

fn load_dataset(path: &str) -> Result<Dataset, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).trim(csv::Trim::All).from_path(path)?;
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if !record.is_empty() {
            records.push(record);
        }
    }
    let n_features = records.first().map_or(0, |r| r.len().saturating_sub(1));

    let mut types = Vec::with_capacity(n_features);
    for j in 0..n_features {
        let column: Vec<&str> = records.iter().map(|r| r.get(j + 1).unwrap_or("")).collect();
        types.push(infer_type(&column));
    }

    // Symbols are interned per column in order of first appearance.
    let mut symbols: Vec<HashMap<String, u32>> = vec![HashMap::new(); n_features];
    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let label = is_truthy(record.get(0).unwrap_or(""));
        let mut features = Vec::with_capacity(n_features);
        for (j, feature_type) in types.iter().enumerate() {
            let raw = record.get(j + 1).unwrap_or("");
            let value = match feature_type {
                FeatureType::Boolean => Value::from(raw == "1" || raw == "true"),
                FeatureType::Numeric => Value::Numeric(raw.parse()?),
                FeatureType::Categorical => {
                    let next = symbols[j].len() as u32;
                    Value::Categorical(*symbols[j].entry(raw.to_string()).or_insert(next))
                }
            };
            features.push(value);
        }
        rows.push(Point::new(features, label));
    }
    Ok(Dataset::new(Schema::new(types), rows)?)
}

fn f1_score(expected: &[bool], predicted: &[bool]) -> (f64, f64, f64) {
    let tp = expected.iter().zip(predicted).filter(|(e, p)| **e && **p).count() as f64;
    let fp = expected.iter().zip(predicted).filter(|(e, p)| !**e && **p).count() as f64;
    let fn_ = expected.iter().zip(predicted).filter(|(e, p)| **e && !**p).count() as f64;
    let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
    let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    (precision, recall, f1)
}

fn main() -> Result<(), Box<dyn Error>> {
    let (path, config) = parse_args()?;
    let dataset = load_dataset(&path)?;
    println!("Loaded {} rows with {} features.", dataset.len(), dataset.schema.n_features());

    let evaluation = run_experiment(&dataset, &config)?;
    println!("{}", evaluation.tree);

    let (precision, recall, f1) = f1_score(&evaluation.expected, &evaluation.predicted);
    println!("Precision: {:.4}", precision);
    println!("Recall:    {:.4}", recall);
    println!("F1 score:  {:.4}", f1);
    Ok(())
}
