use thesis_data::{ColumnData, Dataset};

/// Evenly spaced standard normal quantiles
pub fn normal_scores(n: usize) -> Vec<f64> {
    (1..=n)
        .map(|i| thesis_core::distributions::normal_quantile((i as f64 - 0.5) / n as f64).unwrap())
        .collect()
}

/// Deterministic noise in [-1, 1]
pub fn wobble(n: usize, seed: usize) -> Vec<f64> {
    (0..n)
        .map(|i| (((i + seed) * 7919) % 13) as f64 / 6.0 - 1.0)
        .collect()
}

/// Regression-shaped dataset: y = 1 + 2 x1 - x2 + noise, with a missing row
pub fn regression_dataset() -> Dataset {
    let n = 40;
    let x1: Vec<f64> = (0..n).map(|i| i as f64 / 4.0).collect();
    let x2: Vec<f64> = wobble(n, 3).iter().map(|e| e * 5.0).collect();
    let noise = wobble(n, 0);
    let mut y: Vec<Option<f64>> = (0..n)
        .map(|i| Some(1.0 + 2.0 * x1[i] - x2[i] + noise[i]))
        .collect();
    y[5] = None;
    let group: Vec<&str> = (0..n).map(|i| ["ctl", "trt"][i % 2]).collect();
    Dataset::from_columns(
        "regression",
        vec![
            ("x1", ColumnData::numeric(x1)),
            ("x2", ColumnData::numeric(x2)),
            ("y", ColumnData::Numeric(y)),
            ("group", ColumnData::text(group)),
        ],
    )
    .unwrap()
}
