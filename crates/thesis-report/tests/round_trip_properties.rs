//! Values parsed back out of rendered tables equal the record's values

mod common;

use proptest::prelude::*;
use thesis_engine::{DegreesOfFreedom, TestDetails, TestParameters, TestSelector};
use thesis_report::{build_tables, numeric_cells};

fn spread_group() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-500i32..500, 3..15)
        .prop_filter("needs spread", |v| v.iter().any(|&x| x != v[0]))
        .prop_map(|v| v.into_iter().map(|x| f64::from(x) / 7.0).collect())
}

proptest! {
    #[test]
    fn t_test_table_round_trips(a in spread_group(), b in spread_group()) {
        let ds = common::two_groups(&a, &b);
        let record = common::run(&ds, TestSelector::TwoSample, TestParameters::grouped("group", "score"));
        let r = record.result().unwrap();
        let report = build_tables(&record).unwrap();
        let table = &report.tables[0];
        let row = &numeric_cells(&table.to_markdown())[0];
        let col = |name: &str| table.column_index(name).unwrap();

        let TestDetails::TwoSample { group_statistics, welch_df, .. } = &r.details else {
            panic!("wrong details");
        };
        prop_assert_eq!(row[col("A M")], Some(group_statistics[0].mean));
        prop_assert_eq!(row[col("A SD")], Some(group_statistics[0].std));
        prop_assert_eq!(row[col("B M")], Some(group_statistics[1].mean));
        prop_assert_eq!(row[col("B SD")], Some(group_statistics[1].std));
        prop_assert_eq!(row[col("t")], Some(r.statistic));
        prop_assert_eq!(row[col("Cohen's d")], Some(r.effect_size.value));
        let df = match (welch_df, r.degrees_of_freedom) {
            (Some(w), _) => *w,
            (None, DegreesOfFreedom::Scalar(n)) => n as f64,
            _ => unreachable!(),
        };
        prop_assert_eq!(row[col("df")], Some(df));
    }

    #[test]
    fn anova_table_round_trips(a in spread_group(), b in spread_group(), c in spread_group()) {
        let labels: Vec<&str> = std::iter::repeat("a").take(a.len())
            .chain(std::iter::repeat("b").take(b.len()))
            .chain(std::iter::repeat("c").take(c.len()))
            .collect();
        let scores: Vec<f64> = a.iter().chain(&b).chain(&c).copied().collect();
        let ds = thesis_data::Dataset::from_columns(
            "k",
            vec![
                ("group", thesis_data::ColumnData::text(labels)),
                ("score", thesis_data::ColumnData::numeric(scores)),
            ],
        )
        .unwrap();
        let record = common::run(&ds, TestSelector::KGroup, TestParameters::grouped("group", "score"));
        let r = record.result().unwrap();
        let report = build_tables(&record).unwrap();
        let main = &report.tables[0];
        let cells = numeric_cells(&main.to_markdown());
        let ss = main.column_index("SS").unwrap();

        let TestDetails::KGroup { sums_of_squares, .. } = &r.details else {
            panic!("wrong details");
        };
        prop_assert_eq!(cells[0][ss], Some(sums_of_squares.between));
        prop_assert_eq!(cells[1][ss], Some(sums_of_squares.within));
        prop_assert_eq!(cells[2][ss], Some(sums_of_squares.total));
        prop_assert_eq!(cells[0][main.column_index("F").unwrap()], Some(r.statistic));
        prop_assert_eq!(cells[0][main.column_index("η²").unwrap()], Some(r.effect_size.value));
    }
}
