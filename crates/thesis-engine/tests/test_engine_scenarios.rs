mod common;

use approx::assert_abs_diff_eq;
use thesis_effect::EffectSizeInterpretation;
use thesis_engine::{
    CorrelationMethod, DegreesOfFreedom, EffectLabel, EffectMetric, ResultRecord, TestDetails,
    TestEngine, TestParameters, TestSelector, TestSpecification,
};

fn complete(record: &ResultRecord) -> &thesis_engine::AnalysisResult {
    match record {
        ResultRecord::Complete(r) => r,
        ResultRecord::Failed { error } => panic!("unexpected error record: {error}"),
    }
}

#[test]
fn two_group_closed_form() {
    let engine = TestEngine::default();
    let record = engine.run(
        &common::two_groups(),
        TestSelector::TwoSample,
        &TestParameters::grouped("group", "score"),
    );
    let r = complete(&record);
    assert_eq!(r.test_type, "Independent Samples t-test");
    assert_abs_diff_eq!(r.statistic, -5.0, epsilon = 1e-12);
    assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(8));
    assert!(r.p_value < 0.01);
    assert!(r.significant);
    assert_eq!(r.effect_size.metric, EffectMetric::CohensD);
    assert_eq!(
        r.effect_size.interpretation,
        EffectLabel::Magnitude(EffectSizeInterpretation::Large)
    );
    assert_eq!(r.variables.groups, vec!["A", "B"]);
}

#[test]
fn cohen_d_recomputes_from_group_statistics() {
    let engine = TestEngine::default();
    let record = engine.run(
        &common::two_groups(),
        TestSelector::TwoSample,
        &TestParameters::grouped("group", "score"),
    );
    let r = complete(&record);
    let TestDetails::TwoSample {
        group_statistics, ..
    } = &r.details
    else {
        panic!("wrong details");
    };
    let (a, b) = (&group_statistics[0], &group_statistics[1]);
    let (n1, n2) = (a.n as f64, b.n as f64);
    let pooled = (((n1 - 1.0) * a.std.powi(2) + (n2 - 1.0) * b.std.powi(2)) / (n1 + n2 - 2.0)).sqrt();
    let d = (a.mean - b.mean) / pooled;
    assert_abs_diff_eq!(d, r.effect_size.value, epsilon = 1e-4);
}

#[test]
fn three_groups_rejected_by_two_sample_test() {
    let engine = TestEngine::default();
    let record = engine.run(
        &common::three_groups(),
        TestSelector::TwoSample,
        &TestParameters::grouped("method", "score"),
    );
    assert_eq!(
        record.error(),
        Some("T-test requires exactly 2 groups, found 3")
    );
    assert!(record.result().is_none());
}

#[test]
fn anova_drops_incomplete_rows_and_decomposes() {
    let engine = TestEngine::default();
    let record = engine.run(
        &common::three_groups(),
        TestSelector::KGroup,
        &TestParameters::grouped("method", "score"),
    );
    let r = complete(&record);
    assert_eq!(r.sample_size, 13);
    assert_eq!(r.variables.groups, vec!["lecture", "seminar", "online"]);
    assert_eq!(
        r.degrees_of_freedom,
        DegreesOfFreedom::Split {
            between: 2,
            within: 10
        }
    );
    let TestDetails::KGroup {
        sums_of_squares,
        posthoc,
        ..
    } = &r.details
    else {
        panic!("wrong details");
    };
    assert_abs_diff_eq!(
        sums_of_squares.between + sums_of_squares.within,
        sums_of_squares.total,
        epsilon = 1e-3
    );
    assert_abs_diff_eq!(
        r.effect_size.value,
        sums_of_squares.between / sums_of_squares.total,
        epsilon = 1e-4
    );
    assert_eq!(posthoc.comparisons.len(), 3);
    assert!(posthoc.comparisons.iter().all(|c| c.significant == (c.p_adj < r.alpha)));
}

#[test]
fn anova_with_two_groups_points_to_t_test() {
    let engine = TestEngine::default();
    let record = engine.run(
        &common::two_groups(),
        TestSelector::KGroup,
        &TestParameters::grouped("group", "score"),
    );
    assert_eq!(
        record.error(),
        Some("ANOVA requires 3 or more groups. Use t-test for 2 groups.")
    );
}

#[test]
fn perfect_two_by_two_uses_fisher() {
    let engine = TestEngine::default();
    let record = engine.run(
        &common::perfect_association(),
        TestSelector::Association,
        &TestParameters::pair("exposed", "outcome"),
    );
    let r = complete(&record);
    assert_eq!(r.test_type, "Fisher's Exact Test");
    assert!(r.p_value < 0.001);
    assert_eq!(r.effect_size.metric, EffectMetric::CramersV);
    assert_eq!(r.effect_size.value, 1.0);
    assert_eq!(
        r.effect_size.interpretation,
        EffectLabel::Magnitude(EffectSizeInterpretation::Large)
    );
    let TestDetails::Association {
        contingency_table,
        exact_test,
        ..
    } = &r.details
    else {
        panic!("wrong details");
    };
    assert!(*exact_test);
    assert_eq!(contingency_table.observed, vec![vec![10, 0], vec![0, 10]]);
}

#[test]
fn correlation_uses_pairwise_complete_rows() {
    let engine = TestEngine::default();
    let params = TestParameters::pair("x1", "y").with_method(CorrelationMethod::Spearman);
    let record = engine.run(&common::regression(), TestSelector::Correlation, &params);
    let r = complete(&record);
    assert_eq!(r.sample_size, 29);
    assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(27));
    let ci = r.effect_size.ci_95.unwrap();
    assert!(ci.0 <= r.statistic && r.statistic <= ci.1);
}

#[test]
fn linear_model_listwise_deletion() {
    let engine = TestEngine::default();
    let record = engine.run(
        &common::regression(),
        TestSelector::LinearModel,
        &TestParameters::model("y", vec!["x1", "x2"]),
    );
    let r = complete(&record);
    assert_eq!(r.test_type, "Multiple Linear Regression");
    assert_eq!(r.sample_size, 29);
    let TestDetails::LinearModel {
        coefficients,
        multicollinearity,
        model_summary,
        ..
    } = &r.details
    else {
        panic!("wrong details");
    };
    assert_abs_diff_eq!(coefficients[1].b, 1.5, epsilon = 0.1);
    assert_abs_diff_eq!(coefficients[2].b, -2.0, epsilon = 0.1);
    assert_eq!(multicollinearity.as_ref().map(Vec::len), Some(2));
    assert!(model_summary.r_squared > 0.9);
    assert_eq!(r.statistic, model_summary.f_statistic);
}

#[test]
fn logistic_model_on_text_outcome() {
    let engine = TestEngine::default();
    let record = engine.run(
        &common::regression(),
        TestSelector::LogisticModel,
        &TestParameters::model("passed", vec!["x1"]),
    );
    let r = complete(&record);
    assert_eq!(r.test_type, "Binary Logistic Regression");
    assert_eq!(r.sample_size, 30);
    let TestDetails::LogisticModel {
        outcome_levels,
        classification,
        ..
    } = &r.details
    else {
        panic!("wrong details");
    };
    assert_eq!(outcome_levels, &["fail".to_string(), "pass".to_string()]);
    let total: usize = classification.confusion_matrix.iter().flatten().sum();
    assert_eq!(total, 30);
}

#[test]
fn logistic_model_rejects_continuous_outcome() {
    let engine = TestEngine::default();
    let record = engine.run(
        &common::regression(),
        TestSelector::LogisticModel,
        &TestParameters::model("x2", vec!["x1"]),
    );
    assert!(record
        .error()
        .unwrap()
        .starts_with("Logistic regression requires binary outcome"));
}

#[test]
fn rank_tests_dispatch() {
    let engine = TestEngine::default();
    let mw = engine.run(
        &common::two_groups(),
        TestSelector::RankTwoSample,
        &TestParameters::grouped("group", "score"),
    );
    let r = complete(&mw);
    assert_eq!(r.statistic, 0.0);
    assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::None);
    // 2 / C(10, 5)
    assert_abs_diff_eq!(r.p_value, 0.0079, epsilon = 1e-12);

    let kw = engine.run(
        &common::three_groups(),
        TestSelector::RankKGroup,
        &TestParameters::grouped("method", "score"),
    );
    let r = complete(&kw);
    assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(2));
    assert_eq!(r.effect_size.metric, EffectMetric::EpsilonSquared);
}

#[test]
fn specification_round_trips_through_engine() {
    let spec: TestSpecification =
        serde_json::from_str(r#"{"test": "paired_ttest", "group": "time", "outcome": "score"}"#)
            .unwrap();
    let record = TestEngine::default().run_spec(&common::pre_post(), &spec);
    let r = complete(&record);
    assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(4));
    assert!(!r.warnings.is_empty());
}

#[test]
fn error_record_serializes_as_error_only() {
    let record = TestEngine::default().run(
        &common::two_groups(),
        TestSelector::Correlation,
        &TestParameters::pair("group", "score"),
    );
    let json = serde_json::to_value(&record).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(object.contains_key("error"));
}

#[test]
fn describe_splits_by_column_kind() {
    let engine = TestEngine::default();
    let d = engine.describe(&common::regression(), None).unwrap();
    let continuous: Vec<&str> = d.continuous.iter().map(|s| s.variable.as_str()).collect();
    assert_eq!(continuous, vec!["x1", "x2", "y"]);
    let categorical: Vec<&str> = d.categorical.iter().map(|s| s.variable.as_str()).collect();
    assert_eq!(categorical, vec!["passed"]);
    assert_eq!(d.continuous("y").unwrap().missing, 1);
}
