use nalgebra::*;
use crate::Label;
use crate::linalg::{pseudo_inverse, pseudo_determinant};

/// Gaussian summary of a single class: its mean vector, the (pseudo-)inverse
/// of its covariance matrix and the (pseudo-)determinant of that covariance.
/// Built once from training data and never modified afterwards.
#[derive(Debug, Clone)]
pub struct ClassModel {

    mean : DVector<f64>,

    sigma_inv : DMatrix<f64>,

    sigma_det : f64,

}

impl ClassModel {

    /// Summarizes a class from its mean and covariance. Singular covariances
    /// are handled by the pseudo-inverse and pseudo-determinant.
    pub fn new(mean : DVector<f64>, sigma : &DMatrix<f64>) -> Self {
        assert!(mean.nrows() == sigma.nrows(), "Mean and covariance dimensions differ");
        let sigma_inv = pseudo_inverse(sigma);
        let sigma_det = pseudo_determinant(sigma);
        Self { mean, sigma_inv, sigma_det }
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    pub fn sigma_inv(&self) -> &DMatrix<f64> {
        &self.sigma_inv
    }

    pub fn sigma_det(&self) -> f64 {
        self.sigma_det
    }

    pub fn dim(&self) -> usize {
        self.mean.nrows()
    }

    /// Squared Mahalanobis distance (x - mu)^T sigma^-1 (x - mu).
    pub fn mahalanobis(&self, x : &DVector<f64>) -> f64 {
        let centered = x - &self.mean;
        centered.dot(&(&self.sigma_inv * &centered))
    }

}

/// Discriminant over a set of Gaussian class models, compared under equal priors.
///
/// For a candidate class a and an alternative b, the value
///
/// ln|Σb| - ln|Σa| + (x-μb)ᵀΣb⁻¹(x-μb) - (x-μa)ᵀΣa⁻¹(x-μa)
///
/// is twice the log of the ratio between the density of x under a and its density under b.
/// A negative value means b explains x better than a does, which is enough to reject a.
/// Candidates are visited in class order and each one is compared against every other
/// class. The first candidate that no alternative rejects is the answer.
///
/// Which covariance enters each class model (full, diagonal or identity) is decided by
/// the caller; see crate::classifier::ClassifierKind.
#[derive(Debug, Clone)]
pub struct Discriminant {

    /// Model for label i + 1 lives at position i.
    models : Vec<ClassModel>

}

impl Discriminant {

    pub fn new(models : Vec<ClassModel>) -> Self {
        assert!(!models.is_empty(), "Discriminant requires at least one class");
        let dim = models[0].dim();
        assert!(models.iter().all(|m| m.dim() == dim ), "Class models differ in dimension");
        Self { models }
    }

    pub fn n_classes(&self) -> usize {
        self.models.len()
    }

    pub fn models(&self) -> &[ClassModel] {
        &self.models[..]
    }

    /// Model for the 1-based label.
    pub fn model(&self, label : Label) -> Option<&ClassModel> {
        label.checked_sub(1).and_then(|ix| self.models.get(ix) )
    }

    /// The pairwise comparison value between candidate a and alternative b at x
    /// (both 0-based). Non-negative values favour a.
    pub fn log_ratio(&self, a : usize, b : usize, x : &DVector<f64>) -> f64 {
        let (ma, mb) = (&self.models[a], &self.models[b]);
        mb.sigma_det.ln() - ma.sigma_det.ln() + mb.mahalanobis(x) - ma.mahalanobis(x)
    }

    /// Returns the 1-based label of the first class not rejected by any other class.
    ///
    /// # Panics
    ///
    /// If the point dimension differs from the model dimension, or if every class is
    /// rejected by some other class (an internal defect, never expected for
    /// well-formed models).
    pub fn classify(&self, point : &[f64]) -> Label {
        let dim = self.models[0].dim();
        assert!(point.len() == dim, "Point has {} fields, model expects {}", point.len(), dim);
        let x = DVector::from_column_slice(point);
        let n = self.models.len();
        for a in 0..n {
            let rejected = (0..n).filter(|b| *b != a ).any(|b| self.log_ratio(a, b, &x) < 0.0 );
            if !rejected {
                return a + 1;
            }
        }
        panic!("Every class was rejected by another class for point {:?}", point);
    }

}
