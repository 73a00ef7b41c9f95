//! Property-based tests using proptest.
//!
//! These tests verify invariants of the key indices, sparse and dense
//! containers, stopping conditions, and the quantizer.

use mfkit::prelude::*;
use mfkit::quantize::Quantizer;
use mfkit::stopping::IterationCountStoppingCondition;
use proptest::prelude::*;

// Strategy for generating sparse vectors with small keys so that overlaps occur
fn sparse_strategy() -> impl Strategy<Value = SparseVector> {
    proptest::collection::vec((0i64..50, -100.0f64..100.0), 0..30).prop_map(SparseVector::from_pairs)
}

// Strategy for strictly ascending representative values
fn quantizer_strategy() -> impl Strategy<Value = Quantizer> {
    proptest::collection::btree_set(-1000i32..1000, 1..20).prop_map(|set| {
        let values = set.into_iter().map(|v| f64::from(v) / 4.0).collect();
        Quantizer::new(values).expect("ascending by construction")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn key_index_is_a_bijection(ids in proptest::collection::vec(any::<i64>(), 0..100)) {
        let index = KeyIndex::from_ids(ids.iter().copied());
        for &id in &ids {
            let pos = index.index_of(id).expect("interned");
            prop_assert!(pos < index.len());
            prop_assert_eq!(index.id_at(pos).expect("in range"), id);
        }
        for pos in 0..index.len() {
            let id = index.id_at(pos).expect("in range");
            prop_assert_eq!(index.index_of(id).expect("interned"), pos);
        }
        prop_assert!(index.id_at(index.len()).is_err());
    }

    #[test]
    fn builder_indices_are_dense(ids in proptest::collection::vec(-20i64..20, 0..60)) {
        let mut builder = KeyIndexBuilder::new();
        for id in ids {
            let before = builder.len();
            let pos = builder.intern(id);
            prop_assert!(pos <= before);
            prop_assert!(builder.len() == before || pos == before);
        }
    }

    #[test]
    fn sparse_dot_is_symmetric(a in sparse_strategy(), b in sparse_strategy()) {
        prop_assert!((a.dot(&b) - b.dot(&a)).abs() < 1e-9);
    }

    #[test]
    fn sparse_self_dot_is_sum_of_squares(v in sparse_strategy()) {
        prop_assert!((v.dot(&v) - v.sum_of_squares()).abs() < 1e-6);
        prop_assert!((v.norm() * v.norm() - v.sum_of_squares()).abs() < 1e-6);
    }

    #[test]
    fn sparse_disjoint_dot_is_zero(
        a in proptest::collection::vec((0i64..50, -10.0f64..10.0), 0..20),
        b in proptest::collection::vec((50i64..100, -10.0f64..10.0), 0..20),
    ) {
        let a = SparseVector::from_pairs(a);
        let b = SparseVector::from_pairs(b);
        prop_assert_eq!(a.dot(&b), 0.0);
    }

    #[test]
    fn sparse_mutation_round_trip(pairs in proptest::collection::vec((0i64..30, -5.0f64..5.0), 0..30)) {
        let v = SparseVector::from_pairs(pairs.clone());
        let mut m = v.clone().into_mutable();
        for (key, value) in v.iter() {
            prop_assert_eq!(m.get(key), value);
        }
        for &(key, _) in &pairs {
            m.unset(key);
        }
        prop_assert!(m.is_empty());
        prop_assert_eq!(v.len(), v.keys().len());
    }

    #[test]
    fn matrix_set_then_get(
        rows in 1usize..8,
        cols in 1usize..8,
        r in 0usize..8,
        c in 0usize..8,
        value in -1e6f64..1e6,
    ) {
        let mut m = Matrix::zeros(rows, cols);
        if r < rows && c < cols {
            m.set(r, c, value).expect("in bounds");
            prop_assert_eq!(m.get(r, c).expect("in bounds"), value);
            prop_assert_eq!(m.as_slice()[mfkit::primitives::address(r, c, cols)], value);
        } else {
            prop_assert!(m.set(r, c, value).is_err());
            prop_assert!(m.get(r, c).is_err());
        }
    }

    #[test]
    fn matrix_views_alias_storage(
        rows in 1usize..6,
        cols in 1usize..6,
        value in -100.0f64..100.0,
    ) {
        let mut m = Matrix::zeros(rows, cols);
        let (r, c) = (rows - 1, cols - 1);
        m.row_mut(r).expect("in bounds")[0] = value;
        prop_assert_eq!(m.get(r, 0).expect("in bounds"), value);
        {
            let mut col = m.column_mut(c).expect("in bounds");
            col[0] = value + 1.0;
        }
        prop_assert_eq!(m.get(0, c).expect("in bounds"), value + 1.0);

        let frozen = m.clone().freeze();
        prop_assert_eq!(frozen.as_slice(), m.as_slice());
    }

    #[test]
    fn iteration_count_runs_exactly_n(n in 1usize..200) {
        let stop = IterationCountStoppingCondition::new(n).expect("positive");
        let mut controller = stop.new_loop();
        let mut trues = 0;
        while controller.keep_training(1.0) {
            trues += 1;
        }
        prop_assert_eq!(trues, n);
        prop_assert_eq!(controller.iteration_count(), n);
    }

    #[test]
    fn quantize_is_idempotent(q in quantizer_strategy(), x in -500.0f64..500.0) {
        let once = q.quantize(x);
        prop_assert_eq!(q.quantize(once), once);
    }

    #[test]
    fn quantize_picks_a_closest_value(q in quantizer_strategy(), x in -500.0f64..500.0) {
        let chosen = q.quantize(x);
        let best = q
            .values()
            .iter()
            .map(|v| (v - x).abs())
            .fold(f64::INFINITY, f64::min);
        prop_assert!(((chosen - x).abs() - best).abs() < 1e-9);
    }
}
