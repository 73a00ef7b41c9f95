pub(crate) use super::*;

fn two_by_two() -> MfModel {
    let users = ImmutableMatrix::from_vec(2, 2, vec![1.0, 0.0, 0.5, 2.0]).expect("2x2");
    let items = ImmutableMatrix::from_vec(3, 2, vec![1.0, 1.0, 2.0, 0.0, 0.0, 3.0]).expect("3x2");
    MfModel::new(
        users,
        items,
        KeyIndex::from_ids([10, 20]),
        KeyIndex::from_ids([100, 200, 300]),
    )
    .expect("consistent shapes")
}

#[test]
fn test_counts() {
    let m = two_by_two();
    assert_eq!(m.feature_count(), 2);
    assert_eq!(m.user_count(), 2);
    assert_eq!(m.item_count(), 3);
}

#[test]
fn test_user_vector_known_and_unknown() {
    let m = two_by_two();
    let v = m.user_vector(20).expect("known user");
    assert_eq!(v.as_slice(), &[0.5, 2.0]);
    assert!(m.user_vector(99).is_none());
    assert!(m.item_vector(99).is_none());
}

#[test]
fn test_feature_lookup_defaults_to_zero() {
    let m = two_by_two();
    assert_eq!(m.get_user_feature(10, 0), 1.0);
    assert_eq!(m.get_item_feature(300, 1), 3.0);
    assert_eq!(m.get_user_feature(99, 1), 0.0);
    assert_eq!(m.get_item_feature(-1, 0), 0.0);
}

#[test]
fn test_predict() {
    let m = two_by_two();
    assert!((m.predict(20, 300).expect("known pair") - 6.0).abs() < 1e-12);
    assert!(m.predict(20, 999).is_none());
}

#[test]
fn test_rejects_user_row_mismatch() {
    let users = ImmutableMatrix::from_vec(1, 2, vec![1.0, 2.0]).expect("1x2");
    let items = ImmutableMatrix::from_vec(1, 2, vec![1.0, 2.0]).expect("1x2");
    let result = MfModel::new(
        users,
        items,
        KeyIndex::from_ids([1, 2]),
        KeyIndex::from_ids([1]),
    );
    assert!(matches!(result, Err(MfError::DimensionMismatch { .. })));
}

#[test]
fn test_rejects_feature_count_mismatch() {
    let users = ImmutableMatrix::from_vec(1, 2, vec![1.0, 2.0]).expect("1x2");
    let items = ImmutableMatrix::from_vec(1, 3, vec![1.0, 2.0, 3.0]).expect("1x3");
    let result = MfModel::new(users, items, KeyIndex::from_ids([1]), KeyIndex::from_ids([1]));
    assert!(matches!(result, Err(MfError::DimensionMismatch { .. })));
}

#[test]
fn test_serde_round_trip() {
    let m = two_by_two();
    let bytes = bincode::serialize(&m).expect("serialize");
    let back: MfModel = bincode::deserialize(&bytes).expect("deserialize");
    assert_eq!(back, m);
}

#[test]
fn test_deserialize_rejects_inconsistent_model() {
    let json = r#"{
        "user_matrix": {"rows": 1, "cols": 1, "data": [1.0]},
        "item_matrix": {"rows": 1, "cols": 1, "data": [1.0]},
        "user_index": [1, 2],
        "item_index": [5]
    }"#;
    let result: std::result::Result<MfModel, _> = serde_json::from_str(json);
    let err = result.expect_err("user rows do not match index");
    assert!(err.to_string().contains("Invalid model format"));
}
