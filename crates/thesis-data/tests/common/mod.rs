//! Common test utilities for thesis-data tests

#![allow(dead_code)]

use polars::prelude::*;
use thesis_data::Dataset;

/// Small survey-like frame: an id, a two-level group, a Likert pair and an
/// age column with one missing value and one implausible value
pub fn survey_df() -> DataFrame {
    df![
        "id" => [1i64, 2, 3, 4, 5, 6, 7, 8],
        "group" => ["control", "treatment", "control", "treatment", "control", "treatment", "control", "treatment"],
        "item1" => [4.0, 5.0, 3.0, 2.0, 4.0, 5.0, 1.0, 3.0],
        "item2" => [2.0, 1.0, 3.0, 4.0, 2.0, 1.0, 5.0, 3.0],
        "age" => [Some(23.0), Some(31.0), None, Some(45.0), Some(27.0), Some(130.0), Some(38.0), Some(52.0)],
    ]
    .unwrap()
}

pub fn survey() -> Dataset {
    Dataset::new("survey", survey_df())
}

/// Frame with `n` rows of a single numeric column
pub fn create_test_df(values: &[f64]) -> DataFrame {
    df!["values" => values].unwrap()
}
