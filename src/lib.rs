//! Statistical pattern classification over labeled tabular data: Gaussian discriminants
//! built from per-class covariance statistics, categorical decision trees grown by
//! information gain, and k-fold / leave-one-out cross-validation to compare them.

/// Class labels are 1-based; a dataset with k classes uses labels 1..=k.
pub type Label = usize;

/// Errors for precondition violations (malformed datasets, empty classes, invalid folds).
pub mod error;

/// Shannon entropy and information gain over label subsets.
pub mod calc;

/// Matrix inverse and determinant with SVD fallbacks for singular matrices.
pub mod linalg;

// Pairwise comparison of per-class Gaussian log-densities (quadratic discriminant).
pub mod decision;

/// Categorical decision tree grown by information gain.
pub mod tree;

/// Model families and the trained classifier sum type.
pub mod classifier;

/// Labeled datasets, partitioning for cross-validation and CSV loading.
pub mod sample;

/// K-fold and leave-one-out cross-validation.
pub mod validate;

pub use error::ClassifyError;

pub use classifier::{Classifier, ClassifierKind, Outcome};

pub use sample::{Dataset, Partition, DatasetFormat};
