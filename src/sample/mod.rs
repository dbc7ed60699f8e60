use nalgebra::*;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;
use crate::Label;
use crate::error::ClassifyError;
use crate::classifier::{Classifier, ClassifierKind};
use crate::decision::{ClassModel, Discriminant};
use crate::tree::DecisionTree;

/// Loaders for the comma-separated dataset layouts.
pub mod csv;

pub use self::csv::*;

/// Labeled sample: a matrix with one observation per row, a label per row and
/// the number of classes labels are drawn from. Labels are 1-based; every
/// label lies in [1, n_classes]. A class may be absent from a dataset (after
/// partitioning, for example), but building a discriminant requires all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {

    features : DMatrix<f64>,

    labels : Vec<Label>,

    n_classes : usize

}

/// Disjoint split of a dataset: testing holds a contiguous row range and training
/// holds every other row, in their original order.
#[derive(Debug, Clone)]
pub struct Partition {

    pub training : Dataset,

    pub testing : Dataset

}

impl Dataset {

    pub fn new(features : DMatrix<f64>, labels : Vec<Label>, n_classes : usize) -> Result<Self, ClassifyError> {
        if features.nrows() == 0 {
            return Err(ClassifyError::EmptyDataset);
        }
        if labels.len() != features.nrows() {
            return Err(ClassifyError::LabelCount { rows : features.nrows(), labels : labels.len() });
        }
        if let Some((row, label)) = labels.iter().enumerate().find(|(_, l)| **l < 1 || **l > n_classes ) {
            return Err(ClassifyError::LabelRange { label : *label, row, n_classes });
        }
        for (column, col) in features.column_iter().enumerate() {
            if let Some(row) = col.iter().position(|v| !v.is_finite() ) {
                return Err(ClassifyError::NonFinite { row, column });
            }
        }
        Ok(Self { features, labels, n_classes })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_fields(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn features(&self) -> &DMatrix<f64> {
        &self.features
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels[..]
    }

    pub fn point(&self, i : usize) -> Vec<f64> {
        self.features.row(i).iter().cloned().collect()
    }

    pub fn label(&self, i : usize) -> Label {
        self.labels[i]
    }

    /// Column-wise mean vector.
    pub fn means(&self) -> DVector<f64> {
        let n = self.features.nrows() as f64;
        DVector::from_iterator(self.n_fields(), self.features.column_iter().map(|c| c.sum() / n ))
    }

    /// Builds a dataset from a subset of rows (in the informed order).
    fn select(&self, rows : &[usize]) -> Result<Self, ClassifyError> {
        let features = DMatrix::from_fn(rows.len(), self.n_fields(), |i, j| self.features[(rows[i], j)] );
        let labels = rows.iter().map(|r| self.labels[*r] ).collect();
        Self::new(features, labels, self.n_classes)
    }

    /// Rows holding the informed label. Fails if the label is outside the class
    /// range or if no row holds it.
    pub fn subset_by_class(&self, label : Label) -> Result<Self, ClassifyError> {
        if label < 1 || label > self.n_classes {
            return Err(ClassifyError::UnknownClass { label, n_classes : self.n_classes });
        }
        let rows : Vec<usize> = (0..self.len()).filter(|i| self.labels[*i] == label ).collect();
        if rows.is_empty() {
            return Err(ClassifyError::EmptyClass { label });
        }
        self.select(&rows[..])
    }

    /// Separates the dataset in a testing set with rows [start, end] (inclusive)
    /// and a training set with the remaining rows.
    pub fn partition(&self, start : usize, end : usize) -> Result<Partition, ClassifyError> {
        if start > end || end >= self.len() || end - start + 1 == self.len() {
            return Err(ClassifyError::Partition { start, end, size : self.len() });
        }
        let (testing, training) : (Vec<usize>, Vec<usize>) = (0..self.len())
            .partition(|i| *i >= start && *i <= end );
        let part = Partition {
            training : self.select(&training[..])?,
            testing : self.select(&testing[..])?
        };
        assert!(part.training.len() + part.testing.len() == self.len());
        Ok(part)
    }

    /// Covariance matrix of the rows for the informed model family:
    /// the unbiased sample covariance (Optimal), its diagonal (Naive),
    /// or the identity (Linear and DecisionTree, which do not use it).
    /// A single-row dataset has zero covariance.
    pub fn covariance(&self, kind : ClassifierKind) -> DMatrix<f64> {
        let p = self.n_fields();
        if kind == ClassifierKind::Linear || kind == ClassifierKind::DecisionTree {
            return DMatrix::identity(p, p);
        }
        let means = self.means();
        let centered = DMatrix::from_fn(self.len(), p, |i, j| self.features[(i, j)] - means[j] );
        let dof = (self.len().max(2) - 1) as f64;
        let cov = (centered.transpose() * &centered) / dof;
        match kind {
            ClassifierKind::Naive => DMatrix::from_diagonal(&cov.diagonal()),
            _ => cov
        }
    }

    /// Permutes rows (and their labels) in place.
    pub fn shuffle<R : Rng + ?Sized>(&mut self, rng : &mut R) {
        let mut order : Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        let features = DMatrix::from_fn(self.len(), self.n_fields(), |i, j| self.features[(order[i], j)] );
        self.labels = order.iter().map(|r| self.labels[*r] ).collect();
        self.features = features;
    }

    /// Trains a classifier of the informed kind over all rows. Discriminants
    /// summarize each class 1..=n_classes by its mean and covariance, and fail
    /// with ClassifyError::EmptyClass if any class has no rows.
    pub fn classifier(&self, kind : ClassifierKind) -> Result<Classifier, ClassifyError> {
        if kind == ClassifierKind::DecisionTree {
            return Ok(DecisionTree::new(&self.labels[..], &self.features)?.into());
        }
        let mut models = Vec::with_capacity(self.n_classes);
        for label in 1..=self.n_classes {
            let class = self.subset_by_class(label)?;
            models.push(ClassModel::new(class.means(), &class.covariance(kind)));
        }
        debug!(%kind, classes = models.len(), rows = self.len(), "discriminant trained");
        Ok(Discriminant::new(models).into())
    }

}

/// Start and end (inclusive) row indices of the testing block for the
/// 1-based fold out of k over a dataset with size rows. Every fold has
/// size / k rows, except the last one, which also takes the remainder.
///
/// ```
/// assert_eq!(discern::sample::k_fold_indices(3, 3, 100).unwrap(), (66, 99));
/// ```
pub fn k_fold_indices(fold : usize, k : usize, size : usize) -> Result<(usize, usize), ClassifyError> {
    if fold < 1 || fold > k || k < 2 || k > size {
        return Err(ClassifyError::Fold { fold, k, size });
    }
    let n_test = size / k;
    let start = n_test * (fold - 1);
    let end = if fold == k { size - 1 } else { start + n_test - 1 };
    Ok((start, end))
}

#[cfg(test)]
mod tests {

    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample() -> Dataset {
        let features = DMatrix::from_row_slice(6, 2, &[
            1., 2.,
            3., 2.,
            5., 5.,
            10., 1.,
            12., 1.,
            11., 1.
        ]);
        Dataset::new(features, vec![1, 1, 1, 2, 2, 2], 2).unwrap()
    }

    #[test]
    fn k_fold_even_split() {
        assert_eq!(k_fold_indices(1, 2, 100).unwrap(), (0, 49));
        assert_eq!(k_fold_indices(2, 2, 100).unwrap(), (50, 99));
    }

    #[test]
    fn k_fold_last_fold_takes_remainder() {
        assert_eq!(k_fold_indices(1, 3, 100).unwrap(), (0, 32));
        assert_eq!(k_fold_indices(2, 3, 100).unwrap(), (33, 65));
        assert_eq!(k_fold_indices(3, 3, 100).unwrap(), (66, 99));
        assert_eq!(k_fold_indices(4, 4, 178).unwrap(), (132, 177));
    }

    #[test]
    fn k_fold_small_numbers() {
        assert_eq!(k_fold_indices(1, 2, 2).unwrap(), (0, 0));
        assert_eq!(k_fold_indices(2, 2, 2).unwrap(), (1, 1));
    }

    #[test]
    fn k_fold_covers_every_row_once() {
        for &(k, size) in [(3, 10), (7, 100), (10, 10), (4, 178)].iter() {
            let mut covered = 0;
            let mut next = 0;
            for fold in 1..=k {
                let (start, end) = k_fold_indices(fold, k, size).unwrap();
                assert_eq!(start, next);
                covered += end - start + 1;
                next = end + 1;
            }
            assert_eq!(covered, size);
        }
    }

    #[test]
    fn k_fold_rejects_invalid_folds() {
        assert!(k_fold_indices(0, 2, 10).is_err());
        assert!(k_fold_indices(3, 2, 10).is_err());
        assert!(k_fold_indices(1, 1, 10).is_err());
        assert!(k_fold_indices(1, 11, 10).is_err());
    }

    #[test]
    fn rejects_malformed_datasets() {
        let m = DMatrix::from_row_slice(2, 1, &[0., 1.]);
        assert!(matches!(Dataset::new(m.clone(), vec![1], 2), Err(ClassifyError::LabelCount { .. })));
        assert!(matches!(Dataset::new(m.clone(), vec![1, 3], 2), Err(ClassifyError::LabelRange { label : 3, row : 1, .. })));
        assert!(matches!(Dataset::new(m, vec![0, 1], 2), Err(ClassifyError::LabelRange { label : 0, .. })));
        let nan = DMatrix::from_row_slice(2, 1, &[0., f64::NAN]);
        assert!(matches!(Dataset::new(nan, vec![1, 1], 1), Err(ClassifyError::NonFinite { row : 1, column : 0 })));
    }

    #[test]
    fn subset_by_class_keeps_only_that_class() {
        let data = sample();
        let class = data.subset_by_class(2).unwrap();
        assert_eq!(class.len(), 3);
        assert!(class.labels().iter().all(|l| *l == 2 ));
        assert_eq!(class.means(), DVector::from_column_slice(&[11., 1.]));
    }

    #[test]
    fn empty_class_is_an_error() {
        let data = Dataset::new(DMatrix::from_row_slice(2, 1, &[0., 1.]), vec![1, 1], 2).unwrap();
        assert!(matches!(data.subset_by_class(2), Err(ClassifyError::EmptyClass { label : 2 })));
        assert!(data.classifier(ClassifierKind::Optimal).is_err());
        assert!(data.classifier(ClassifierKind::DecisionTree).is_ok());
    }

    #[test]
    fn class_outside_range_is_unknown() {
        let data = sample();
        assert!(matches!(data.subset_by_class(0), Err(ClassifyError::UnknownClass { label : 0, n_classes : 2 })));
        let err = data.subset_by_class(3).unwrap_err();
        assert!(matches!(err, ClassifyError::UnknownClass { label : 3, n_classes : 2 }));
        assert!(!err.to_string().contains("row"));
    }

    #[test]
    fn partition_sizes() {
        let data = sample();
        let part = data.partition(0, 0).unwrap();
        assert_eq!((part.training.len(), part.testing.len()), (5, 1));
        let part = data.partition(2, 3).unwrap();
        assert_eq!((part.training.len(), part.testing.len()), (4, 2));
        assert_eq!(part.testing.point(0), vec![5., 5.]);
        assert_eq!(part.testing.labels(), &[1, 2]);
        assert_eq!(part.training.labels(), &[1, 1, 2, 2]);
        assert!(data.partition(3, 2).is_err());
        assert!(data.partition(0, 6).is_err());
        assert!(data.partition(0, 5).is_err());
    }

    #[test]
    fn covariance_families() {
        let class = sample().subset_by_class(1).unwrap();
        // x = [1, 3, 5], y = [2, 2, 5]
        let full = class.covariance(ClassifierKind::Optimal);
        let expected = DMatrix::from_row_slice(2, 2, &[4., 3., 3., 3.]);
        assert!((full - &expected).amax() < 1E-12);
        let diag = class.covariance(ClassifierKind::Naive);
        assert_eq!(diag, DMatrix::from_diagonal(&expected.diagonal()));
        assert_eq!(class.covariance(ClassifierKind::Linear), DMatrix::identity(2, 2));
    }

    #[test]
    fn single_row_has_zero_covariance() {
        let data = Dataset::new(DMatrix::from_row_slice(1, 2, &[4., 2.]), vec![1], 1).unwrap();
        assert_eq!(data.covariance(ClassifierKind::Optimal), DMatrix::zeros(2, 2));
    }

    #[test]
    fn classifier_factory_dispatches_on_kind() {
        let data = sample();
        for kind in ClassifierKind::ALL.iter() {
            let clf = data.classifier(*kind).unwrap();
            assert_eq!(clf.as_tree().is_some(), !kind.is_discriminant());
            assert_eq!(clf.classify(&[1., 2.]).label(), Some(1));
            assert_eq!(clf.classify(&[11., 1.]).label(), Some(2));
        }
    }

    #[test]
    fn shuffle_keeps_rows_paired_with_labels() {
        let data = sample();
        let mut shuffled = data.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(42));
        assert_eq!(shuffled.len(), data.len());
        for i in 0..shuffled.len() {
            let point = shuffled.point(i);
            let orig = (0..data.len()).find(|j| data.point(*j) == point ).unwrap();
            assert_eq!(data.label(orig), shuffled.label(i));
        }
    }

}
