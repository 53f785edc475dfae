//! Common fixtures for thesis-engine tests

#![allow(dead_code)]

use polars::prelude::*;
use thesis_data::Dataset;

/// Two groups of five with equal spread: `A` = 1..=5, `B` = 6..=10
pub fn two_group_df() -> DataFrame {
    df![
        "group" => ["A", "A", "A", "A", "A", "B", "B", "B", "B", "B"],
        "score" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
    ]
    .unwrap()
}

pub fn two_groups() -> Dataset {
    Dataset::new("two_groups", two_group_df())
}

/// Five subjects measured before and after, rows in subject order
pub fn pre_post() -> Dataset {
    let df = df![
        "time" => ["pre", "pre", "pre", "pre", "pre", "post", "post", "post", "post", "post"],
        "score" => [10.0, 12.0, 9.0, 14.0, 11.0, 12.0, 15.0, 9.0, 17.0, 12.0],
    ]
    .unwrap();
    Dataset::new("pre_post", df)
}

/// Three teaching methods with a missing score and a missing label
pub fn three_groups() -> Dataset {
    let df = df![
        "method" => [
            Some("lecture"), Some("lecture"), Some("lecture"), Some("lecture"), Some("lecture"),
            Some("seminar"), Some("seminar"), Some("seminar"), Some("seminar"), Some("seminar"),
            Some("online"), Some("online"), Some("online"), Some("online"), None,
        ],
        "score" => [
            Some(62.0), Some(65.0), Some(70.0), Some(68.0), Some(66.0),
            Some(75.0), Some(79.0), Some(72.0), None, Some(80.0),
            Some(58.0), Some(61.0), Some(55.0), Some(60.0), Some(99.0),
        ],
    ]
    .unwrap();
    Dataset::new("three_groups", df)
}

/// Perfectly associated 2×2 table: 10 (yes, yes) and 10 (no, no)
pub fn perfect_association() -> Dataset {
    let a: Vec<&str> = (0..20).map(|i| if i < 10 { "yes" } else { "no" }).collect();
    let df = df![
        "exposed" => a.clone(),
        "outcome" => a,
    ]
    .unwrap();
    Dataset::new("association", df)
}

/// Regression frame: y = 3 + 1.5 x1 - 2 x2 + deterministic noise
pub fn regression() -> Dataset {
    let n = 30;
    let x1: Vec<f64> = (0..n).map(|i| i as f64 / 3.0).collect();
    let x2: Vec<f64> = (0..n).map(|i| ((i * 7) % 11) as f64).collect();
    let y: Vec<Option<f64>> = (0..n)
        .map(|i| {
            let noise = ((i * 13) % 7) as f64 / 7.0 - 0.5;
            if i == 4 {
                None
            } else {
                Some(3.0 + 1.5 * x1[i] - 2.0 * x2[i] + noise)
            }
        })
        .collect();
    let passed: Vec<&str> = (0..n)
        .map(|i| if (i * 5) % 9 < 4 || i > 24 { "pass" } else { "fail" })
        .collect();
    let df = df![
        "x1" => x1,
        "x2" => x2,
        "y" => y,
        "passed" => passed,
    ]
    .unwrap();
    Dataset::new("regression", df)
}
