pub(crate) use super::*;

fn vec_of(pairs: &[(i64, f64)]) -> SparseVector {
    SparseVector::from_pairs(pairs.iter().copied())
}

#[test]
fn test_get_absent_is_nan() {
    let v = vec_of(&[(5, 1.5)]);
    assert_eq!(v.get(5), 1.5);
    assert!(v.get(6).is_nan());
    assert_eq!(v.get_or(6, -1.0), -1.0);
}

#[test]
fn test_from_pairs_sorts_and_last_wins() {
    let v = vec_of(&[(9, 1.0), (2, 2.0), (9, 3.0)]);
    assert_eq!(v.keys(), &[2, 9]);
    assert_eq!(v.values(), &[2.0, 3.0]);
}

#[test]
fn test_dot_merges_unsorted_inputs() {
    let a = vec_of(&[(7, 2.0), (1, 1.0), (4, 3.0)]);
    let b = vec_of(&[(4, 10.0), (8, 5.0), (1, -1.0)]);
    assert!((a.dot(&b) - 29.0).abs() < 1e-12);
    assert!((b.dot(&a) - 29.0).abs() < 1e-12);
}

#[test]
fn test_dot_disjoint_is_zero() {
    let a = vec_of(&[(1, 2.0), (3, 4.0)]);
    let b = vec_of(&[(2, 5.0), (4, 6.0)]);
    assert_eq!(a.dot(&b), 0.0);
}

#[test]
fn test_dot_self_is_sum_of_squares() {
    let a = vec_of(&[(1, 2.0), (3, -4.0)]);
    assert!((a.dot(&a) - a.sum_of_squares()).abs() < 1e-12);
    assert!((a.norm() - 20.0_f64.sqrt()).abs() < 1e-12);
}

#[test]
fn test_sum_mean_over_present_values() {
    let a = vec_of(&[(1, 2.0), (100, 4.0)]);
    assert!((a.sum() - 6.0).abs() < 1e-12);
    assert!((a.mean() - 3.0).abs() < 1e-12);
    assert!(SparseVector::empty().mean().is_nan());
}

#[test]
fn test_mutable_set_unset() {
    let mut v = MutableSparseVector::new();
    assert_eq!(v.set(3, 1.0), None);
    assert_eq!(v.set(1, 2.0), None);
    assert_eq!(v.set(3, 5.0), Some(1.0));
    assert_eq!(v.keys(), &[1, 3]);
    assert_eq!(v.unset(1), Some(2.0));
    assert_eq!(v.unset(1), None);
    assert!(!v.contains_key(1));
    assert_eq!(v.len(), 1);
}

#[test]
fn test_mutable_add_accumulates() {
    let mut v = MutableSparseVector::new();
    v.add(4, 1.5);
    assert_eq!(v.add(4, 1.0), 2.5);
}

#[test]
fn test_with_keys() {
    let v = MutableSparseVector::with_keys([3, 1, 3], 0.0);
    assert_eq!(v.keys(), &[1, 3]);
    assert_eq!(v.values(), &[0.0, 0.0]);
}

#[test]
fn test_freeze_and_thaw_round_trip() {
    let mut m = MutableSparseVector::new();
    m.set(2, 4.0);
    let frozen = m.freeze();
    let shared = frozen.clone();
    let mut thawed = frozen.into_mutable();
    thawed.set(2, 8.0);
    assert_eq!(shared.get(2), 4.0);
    assert_eq!(thawed.get(2), 8.0);
}

#[test]
fn test_serde_round_trip_sorts_keys() {
    let parsed: SparseVector = serde_json::from_str("[[5,1.0],[2,3.0]]").expect("deserialize");
    assert_eq!(parsed.keys(), &[2, 5]);
    let json = serde_json::to_string(&parsed).expect("serialize");
    assert_eq!(json, "[[2,3.0],[5,1.0]]");
}
