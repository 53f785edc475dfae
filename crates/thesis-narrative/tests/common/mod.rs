//! Fixtures for thesis-narrative tests

#![allow(dead_code)]

use thesis_data::{ColumnData, Dataset};
use thesis_engine::{ResultRecord, TestEngine, TestParameters, TestSelector};

pub fn two_groups() -> Dataset {
    Dataset::from_columns(
        "two_groups",
        vec![
            (
                "group",
                ColumnData::text(["A", "A", "A", "A", "A", "B", "B", "B", "B", "B"]),
            ),
            (
                "score",
                ColumnData::numeric([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]),
            ),
        ],
    )
    .unwrap()
}

pub fn t_test_record() -> ResultRecord {
    TestEngine::default().run(
        &two_groups(),
        TestSelector::TwoSample,
        &TestParameters::grouped("group", "score"),
    )
}
