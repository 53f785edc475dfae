//! Fixtures for thesis-report tests

#![allow(dead_code)]

use polars::prelude::*;
use thesis_data::Dataset;
use thesis_engine::{ResultRecord, TestEngine, TestParameters, TestSelector};

pub fn run(dataset: &Dataset, selector: TestSelector, params: TestParameters) -> ResultRecord {
    TestEngine::default().run(dataset, selector, &params)
}

/// Two groups from numeric slices, labelled `A` and `B`
pub fn two_groups(a: &[f64], b: &[f64]) -> Dataset {
    let labels: Vec<&str> = std::iter::repeat("A")
        .take(a.len())
        .chain(std::iter::repeat("B").take(b.len()))
        .collect();
    let scores: Vec<f64> = a.iter().chain(b).copied().collect();
    let df = df![
        "group" => labels,
        "score" => scores,
    ]
    .unwrap();
    Dataset::new("two_groups", df)
}

/// Three study conditions, six participants each
pub fn conditions() -> Dataset {
    let df = df![
        "condition" => [
            "control", "control", "control", "control", "control", "control",
            "music", "music", "music", "music", "music", "music",
            "silence", "silence", "silence", "silence", "silence", "silence",
        ],
        "recall" => [
            12.0, 14.0, 11.0, 13.0, 15.0, 12.0,
            16.0, 18.0, 17.0, 15.0, 19.0, 18.0,
            10.0, 9.0, 11.0, 8.0, 12.0, 10.0,
        ],
    ]
    .unwrap();
    Dataset::new("conditions", df)
}

/// Survey frame with a 2×3 cross-tab and a binary outcome
pub fn survey() -> Dataset {
    let n = 36;
    let gender: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "female" } else { "male" }).collect();
    let year: Vec<&str> = (0..n)
        .map(|i| match i % 3 {
            0 => "first",
            1 => "second",
            _ => "third",
        })
        .collect();
    let hours: Vec<f64> = (0..n).map(|i| 2.0 + (i % 12) as f64 * 0.5).collect();
    let anxiety: Vec<f64> = (0..n)
        .map(|i| 40.0 - 1.5 * hours[i] + ((i * 7) % 3) as f64 * 0.5)
        .collect();
    let passed: Vec<&str> = (0..n)
        .map(|i| if hours[i] + ((i * 5) % 4) as f64 > 5.5 { "yes" } else { "no" })
        .collect();
    let df = df![
        "gender" => gender,
        "year" => year,
        "hours" => hours,
        "anxiety" => anxiety,
        "passed" => passed,
    ]
    .unwrap();
    Dataset::new("survey", df)
}
