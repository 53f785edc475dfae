mod common;

use approx::assert_abs_diff_eq;
use common::*;
use thesis_data::quality::{OutlierSuggestion, Recommendation, VariableDetails};
use thesis_data::reliability::AlphaBand;
use thesis_data::{DataDictionary, QualityReport, ReliabilityAnalysis, INITIAL_VERSION};

#[test]
fn test_quality_report_on_survey() {
    let report = QualityReport::run(&survey()).unwrap();
    assert_eq!(report.dataset_info.rows, 8);
    assert_eq!(report.duplicates.exact_duplicates, 0);

    let age = &report.missing_data.by_column["age"];
    assert_eq!(age.missing_count, 1);
    assert_abs_diff_eq!(age.missing_percentage, 12.5);

    // 130 is outside the plausible age range
    assert!(report.value_ranges.issues.contains_key("age"));
    assert!(report.value_ranges.critical);
    assert_eq!(report.summary.recommendation, Recommendation::ProceedWithCaution);
    assert!(report.summary.data_quality_score < 100);
}

#[test]
fn test_outliers_need_four_values() {
    let ds = thesis_data::Dataset::new("o", create_test_df(&[1.0, 1.0, 100.0]));
    assert_eq!(QualityReport::run(&ds).unwrap().outliers.columns_with_outliers, 0);

    let mut values: Vec<f64> = (1..=40).map(f64::from).collect();
    values.push(500.0);
    let ds = thesis_data::Dataset::new("o", create_test_df(&values));
    let outliers = QualityReport::run(&ds).unwrap().outliers;
    let col = &outliers.by_column["values"];
    assert_eq!(col.iqr_outliers, 1);
    assert_eq!(col.suggestion, OutlierSuggestion::Investigate);
    assert!(!outliers.critical);
}

#[test]
fn test_data_dictionary() {
    let dict = DataDictionary::generate(&survey(), INITIAL_VERSION).unwrap();
    assert_eq!(dict.variables.len(), 5);
    let group = &dict.variables[1];
    match &group.details {
        VariableDetails::Categorical { unique_values, categories } => {
            assert_eq!(*unique_values, 2);
            assert_eq!(categories.as_ref().unwrap(), &vec!["control", "treatment"]);
        }
        other => panic!("expected categorical, got {:?}", other),
    }
    let json = serde_json::to_value(&dict.variables[2]).unwrap();
    assert_eq!(json["variable_type"], "discrete");
}

#[test]
fn test_reliability_of_opposed_items() {
    let items = vec!["item1".to_string(), "item2".to_string()];
    let analysis = ReliabilityAnalysis::from_dataset(&survey(), &items, "Pair").unwrap();
    // item2 runs opposite to item1, so the raw pair is unreliable
    assert!(analysis.cronbachs_alpha.map_or(true, |a| a < 0.5));
    assert!(matches!(
        analysis.interpretation,
        AlphaBand::Unacceptable | AlphaBand::NotComputable
    ));
}
