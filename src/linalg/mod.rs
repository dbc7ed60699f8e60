use nalgebra::*;
use tracing::debug;

/// Singular values (and pseudo-inverse entries) smaller than this are taken as
/// rounding noise and set to zero. Changing it moves the decision boundaries of
/// every discriminant built over a rank-deficient covariance.
pub const PINV_EPS : f64 = 1E-8;

fn square(m : &DMatrix<f64>) {
    assert!(m.nrows() == m.ncols(), "Informed non-square matrix ({}x{})", m.nrows(), m.ncols());
}

/// Inverse of m when its determinant is non-zero. Otherwise the Moore-Penrose
/// pseudo-inverse V S^+ U^T, where singular values below PINV_EPS are dropped
/// before inversion and entries with magnitude below PINV_EPS are zeroed
/// after reconstruction.
///
/// ```
/// use nalgebra::DMatrix;
/// let m = DMatrix::from_row_slice(2, 2, &[2., 0., 0., 0.]);
/// let inv = discern::linalg::pseudo_inverse(&m);
/// assert!((inv[(0, 0)] - 0.5).abs() < 1E-12);
/// assert_eq!(inv[(1, 1)], 0.0);
/// ```
pub fn pseudo_inverse(m : &DMatrix<f64>) -> DMatrix<f64> {
    square(m);
    if m.determinant() != 0.0 {
        if let Some(inv) = m.clone().try_inverse() {
            return inv;
        }
    }
    debug!(dim = m.nrows(), "singular matrix: using pseudo-inverse");
    let svd = nalgebra::linalg::SVD::new(m.clone(), true, true);
    let s_inv = svd.singular_values.map(|s| if s < PINV_EPS { 0.0 } else { 1. / s });
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => unreachable!("SVD requested with both singular vector sets")
    };
    let mut pinv = v_t.transpose() * DMatrix::from_diagonal(&s_inv) * u.transpose();
    pinv.iter_mut().for_each(|e| if e.abs() < PINV_EPS { *e = 0.0 } );
    pinv
}

/// Determinant of m when it is non-zero. Otherwise the product of the singular
/// values above PINV_EPS (the volume spanned over the non-null subspace).
/// The zero matrix yields the empty product, 1.
pub fn pseudo_determinant(m : &DMatrix<f64>) -> f64 {
    square(m);
    let det = m.determinant();
    if det != 0.0 {
        return det;
    }
    m.clone().singular_values()
        .iter()
        .filter(|s| **s > PINV_EPS )
        .product()
}
