use proptest::prelude::*;
use thesis_effect::{EffectSizeInterpretation, EffectSizeType};

fn all_types() -> [EffectSizeType; 5] {
    [
        EffectSizeType::StandardizedMeanDifference,
        EffectSizeType::Correlation,
        EffectSizeType::VarianceExplained,
        EffectSizeType::Association,
        EffectSizeType::ModelFit,
    ]
}

proptest! {
    #[test]
    fn label_is_monotonic_in_magnitude(a in 0.0f64..3.0, b in 0.0f64..3.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        for t in all_types() {
            let l1 = EffectSizeInterpretation::from_magnitude(lo, t);
            let l2 = EffectSizeInterpretation::from_magnitude(hi, t);
            prop_assert!(l1 <= l2);
        }
    }

    #[test]
    fn label_ignores_sign(x in -3.0f64..3.0) {
        for t in all_types() {
            prop_assert_eq!(
                EffectSizeInterpretation::from_magnitude(x, t),
                EffectSizeInterpretation::from_magnitude(-x, t)
            );
        }
    }
}

#[test]
fn thresholds_are_lower_bounds_of_tiers() {
    for t in all_types() {
        let (s, m, l) = t.thresholds();
        assert_eq!(EffectSizeInterpretation::from_magnitude(s, t), EffectSizeInterpretation::Small);
        assert_eq!(EffectSizeInterpretation::from_magnitude(m, t), EffectSizeInterpretation::Medium);
        assert_eq!(EffectSizeInterpretation::from_magnitude(l, t), EffectSizeInterpretation::Large);
    }
}
