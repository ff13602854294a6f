use super::*;

fn eval<C: PairCostFunction>(c: &C, a: &[f64], b: &[f64]) -> f64 {
    c.cost(0, 0, 0.0, 0.0, a, b).unwrap()
}

#[test]
fn weights_default_to_one() {
    let w = Weights::default();
    assert_eq!((w.compression, w.expansion, w.diagonal), (1.0, 1.0, 1.0));
    assert!(w.validate().is_ok());
    assert!(Weights::new(-1.0, 1.0, 1.0).validate().is_err());
    assert!(Weights::new(1.0, f64::NAN, 1.0).validate().is_err());
}

#[test]
fn euclidean_and_manhattan() {
    let a = [0.0, 3.0, 0.0, 0.0, 1.0];
    let b = [4.0, 0.0, 0.0, 0.0, 1.0];
    assert!((eval(&LpDistance::euclidean(), &a, &b) - 5.0).abs() < 1e-12);
    assert!((eval(&LpDistance::new(1.0).unwrap(), &a, &b) - 7.0).abs() < 1e-12);
    let l3 = eval(&LpDistance::new(3.0).unwrap(), &a, &b);
    assert!((l3 - (64.0f64 + 27.0).powf(1.0 / 3.0)).abs() < 1e-12);
    assert!(LpDistance::euclidean().minimizing());
}

#[test]
fn lp_rejects_fractional_order() {
    assert!(LpDistance::new(0.5).is_err());
    assert!(LpDistance::new(f64::INFINITY).is_err());
}

#[test]
fn similarities_maximize() {
    let a = [1.0, 2.0, 3.0];
    let b = [2.0, 4.0, 6.0];
    assert_eq!(eval(&DotProduct::default(), &a, &b), 28.0);
    assert!((eval(&Cosine::default(), &a, &b) - 1.0).abs() < 1e-12);
    assert!((eval(&PearsonCorrelation::default(), &a, &b) - 1.0).abs() < 1e-12);
    assert!(!DotProduct::default().minimizing());
    assert!(!Cosine::default().minimizing());
    assert!(!PearsonCorrelation::default().minimizing());
}

#[test]
fn degenerate_vectors_score_zero() {
    assert_eq!(eval(&Cosine::default(), &[0.0, 0.0], &[1.0, 2.0]), 0.0);
    assert_eq!(
        eval(&PearsonCorrelation::default(), &[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
        0.0
    );
}

#[test]
fn anticorrelated_profiles() {
    let r = eval(&PearsonCorrelation::default(), &[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
    assert!((r + 1.0).abs() < 1e-12);
}

#[test]
fn time_penalty_adds_to_distances() {
    let c = TimePenalized::new(LpDistance::euclidean(), 0.5).unwrap();
    let v = c.cost(0, 0, 10.0, 14.0, &[1.0], &[1.0]).unwrap();
    assert!((v - 2.0).abs() < 1e-12);
}

#[test]
fn time_penalty_damps_similarities() {
    let c = TimePenalized::new(DotProduct::default(), 2.0).unwrap();
    let same = c.cost(0, 0, 5.0, 5.0, &[2.0], &[3.0]).unwrap();
    let far = c.cost(0, 0, 5.0, 7.0, &[2.0], &[3.0]).unwrap();
    assert_eq!(same, 6.0);
    assert!((far - 6.0 * (-0.5f64).exp()).abs() < 1e-12);
    assert!(TimePenalized::new(DotProduct::default(), 0.0).is_err());
}

#[test]
fn time_gate_short_circuits() {
    let inner = FnCost::minimizing(|_, _, _, _, _, _| Err(CostError::new("must not be called")));
    let gated = TimeGated::new(inner, 1.0, 100.0).unwrap();
    assert_eq!(gated.cost(0, 0, 0.0, 5.0, &[], &[]).unwrap(), 100.0);
    assert!(gated.cost(0, 0, 0.0, 0.5, &[], &[]).is_err());
}

#[test]
fn time_gate_rejects_bad_bounds() {
    for max_delta in [f64::NAN, f64::INFINITY, -1.0] {
        let err = TimeGated::new(LpDistance::euclidean(), max_delta, 0.0).unwrap_err();
        assert!(matches!(err, WarpError::InvalidConfig { .. }), "{max_delta}");
    }
    assert!(TimeGated::new(LpDistance::euclidean(), 2.0, f64::NAN).is_err());
    assert!(TimeGated::new(LpDistance::euclidean(), 0.0, f64::INFINITY).is_ok());
}

#[test]
fn fn_cost_reports_weights_and_direction() {
    let w = Weights::new(2.0, 1.0, 1.0);
    let c = FnCost::maximizing(|i, j, _, _, _, _| Ok((i * 10 + j) as f64)).with_weights(w);
    assert!(!c.minimizing());
    assert_eq!(c.weights(), w);
    assert_eq!(c.cost(3, 4, 0.0, 0.0, &[], &[]).unwrap(), 34.0);
}
