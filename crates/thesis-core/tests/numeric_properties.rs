use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use thesis_core::{distributions, numeric, round4, OlsFit};

proptest! {
    #[test]
    fn round4_is_idempotent(x in -1e6f64..1e6) {
        let r = round4(x);
        prop_assert_eq!(round4(r), r);
        prop_assert!((r - x).abs() <= 0.5e-4 + 1e-9);
    }

    #[test]
    fn ranks_sum_to_triangular_number(data in prop::collection::vec(-100i32..100, 1..60)) {
        let data: Vec<f64> = data.into_iter().map(f64::from).collect();
        let n = data.len() as f64;
        let total: f64 = numeric::ranks(&data).iter().sum();
        prop_assert!((total - n * (n + 1.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn p_values_lie_in_unit_interval(t in -50.0f64..50.0, df in 1.0f64..200.0) {
        let p = distributions::t_two_sided_p(t, df).unwrap();
        prop_assert!((0.0..=1.0).contains(&p));
        let p = distributions::chi2_upper_p(t.abs(), df).unwrap();
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn t_tail_decreases_with_magnitude(t in 0.0f64..20.0, df in 2.0f64..60.0) {
        let p1 = distributions::t_two_sided_p(t, df).unwrap();
        let p2 = distributions::t_two_sided_p(t + 0.5, df).unwrap();
        prop_assert!(p2 <= p1 + 1e-12);
    }
}

#[test]
fn ols_matches_pearson_for_one_predictor() {
    let x = vec![2.0, 4.0, 5.0, 7.0, 9.0, 10.0, 12.0];
    let y = vec![1.5, 3.1, 3.0, 5.2, 6.8, 6.1, 8.9];
    let r = numeric::pearson(&x, &y).unwrap();
    let fit = OlsFit::fit(&y, &[x], true).unwrap();
    assert_abs_diff_eq!(fit.r_squared, r * r, epsilon = 1e-12);
}

#[test]
fn t_quantile_inverts_tail() {
    let q = distributions::t_quantile(0.975, 8.0).unwrap();
    let p = distributions::t_two_sided_p(q, 8.0).unwrap();
    assert_abs_diff_eq!(p, 0.05, epsilon = 1e-6);
}
