//! Property tests over generated group data

use proptest::prelude::*;
use thesis_engine::anova::one_way;
use thesis_engine::two_sample::independent_t;
use thesis_engine::{DegreesOfFreedom, Groups, TestDetails};

fn spread_group(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    // integer-valued draws keep group variances away from zero
    prop::collection::vec(-50i32..50, min_len..20).prop_filter("needs spread", |v| {
        v.iter().any(|&x| x != v[0])
    })
    .prop_map(|v| v.into_iter().map(f64::from).collect())
}

proptest! {
    #[test]
    fn two_sample_df_and_significance(a in spread_group(3), b in spread_group(3), alpha in 0.01f64..0.2) {
        let (n1, n2) = (a.len(), b.len());
        let groups = Groups::from_parts(vec!["a".into(), "b".into()], vec![a, b]).unwrap();
        let r = independent_t(&groups, "g", "y", alpha).unwrap();
        prop_assert_eq!(r.degrees_of_freedom, DegreesOfFreedom::Scalar(n1 + n2 - 2));
        prop_assert_eq!(r.sample_size, n1 + n2);
        // the flag uses the unrounded p, so only check it away from the boundary
        if (r.p_value - alpha).abs() > 1e-4 {
            prop_assert_eq!(r.significant, r.p_value < alpha);
        }
    }

    #[test]
    fn anova_sums_of_squares_decompose(
        a in spread_group(2),
        b in spread_group(2),
        c in spread_group(2),
    ) {
        let groups = Groups::from_parts(
            vec!["a".into(), "b".into(), "c".into()],
            vec![a, b, c],
        )
        .unwrap();
        let r = one_way(&groups, "g", "y", 0.05).unwrap();
        let TestDetails::KGroup { sums_of_squares, .. } = &r.details else {
            panic!("wrong details");
        };
        let ss = sums_of_squares;
        prop_assert!((ss.between + ss.within - ss.total).abs() < 1e-3 * ss.total.max(1.0));
        if ss.total > 0.0 {
            prop_assert!((r.effect_size.value - ss.between / ss.total).abs() < 1e-3);
        }
    }
}

#[test]
fn significance_uses_unrounded_p_at_alpha_boundary() {
    let groups = Groups::from_parts(
        vec!["a".into(), "b".into()],
        vec![vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![6.0, 7.0, 8.0, 9.0, 10.0]],
    )
    .unwrap();
    let alpha = 0.0011;
    let r = independent_t(&groups, "g", "y", alpha).unwrap();
    assert_eq!(r.statistic, -5.0);
    // unrounded p is about 0.00105, reported as 0.0011
    assert_eq!(r.p_value, alpha);
    assert!(r.significant);

    let strict = independent_t(&groups, "g", "y", 0.001).unwrap();
    assert!(!strict.significant);
}
