// =========================================================================
// Matrix addressing contract
//
// Row-major addressing, bounds checking, and view aliasing are what the
// factor training loop relies on; these checks sweep small shapes.
// =========================================================================

use super::*;

/// Address mapping is row-major: address(r, c) = r * cols + c
#[test]
fn contract_address_is_row_major() {
    let m = Matrix::from_vec(3, 4, (0..12).map(|x| x as f64).collect()).expect("valid");
    for r in 0..3 {
        for c in 0..4 {
            let expected = (r * 4 + c) as f64;
            assert_eq!(
                m.get(r, c).expect("in bounds"),
                expected,
                "address({r},{c}) should be {expected}"
            );
            assert_eq!(address(r, c, 4), r * 4 + c);
        }
    }
}

/// set(r, c, v) then get(r, c) returns v, and no other cell changes
#[test]
fn contract_set_get_round_trip() {
    for (rows, cols) in [(1, 1), (2, 5), (5, 2), (4, 4)] {
        for r in 0..rows {
            for c in 0..cols {
                let mut m = Matrix::zeros(rows, cols);
                let v = (r * 10 + c) as f64 + 0.25;
                m.set(r, c, v).expect("in bounds");
                assert_eq!(m.get(r, c).expect("in bounds"), v);
                let nonzero = m.as_slice().iter().filter(|&&x| x != 0.0).count();
                assert_eq!(nonzero, 1, "set({r},{c}) touched other cells");
            }
        }
    }
}

/// Writes through row and column views are visible through get
#[test]
fn contract_views_alias_matrix() {
    let mut m = Matrix::zeros(3, 3);
    for (i, x) in m.row_mut(1).expect("row").iter_mut().enumerate() {
        *x = i as f64 + 1.0;
    }
    {
        let mut col = m.column_mut(2).expect("column");
        col[0] = -1.0;
    }
    assert_eq!(m.get(1, 0).expect("in bounds"), 1.0);
    assert_eq!(m.get(1, 2).expect("in bounds"), 3.0);
    assert_eq!(m.get(0, 2).expect("in bounds"), -1.0);
}

/// Every out-of-range access is an error, never a clamp
#[test]
fn contract_out_of_range_fails() {
    let mut m = Matrix::zeros(2, 3);
    assert!(m.get(2, 0).is_err());
    assert!(m.get(0, 3).is_err());
    assert!(m.set(2, 2, 1.0).is_err());
    assert!(m.row_mut(2).is_err());
    assert!(m.column_mut(3).is_err());
    assert!(m.row_slice(7).is_err());
}
