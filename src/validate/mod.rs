use std::fmt::{self, Display};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};
use crate::Label;
use crate::classifier::{ClassifierKind, Outcome};
use crate::error::ClassifyError;
use crate::sample::{Dataset, k_fold_indices};

/// Settings of a cross-validation run.
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `folds`   | `Some(10)`; `None` means leave-one-out |
/// | `seed`    | `None` (rows are used in file order) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {

    folds : Option<usize>,

    seed : Option<u64>

}

impl Default for ValidationConfig {

    fn default() -> Self {
        Self { folds : Some(10), seed : None }
    }

}

impl ValidationConfig {

    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_folds(mut self, k : usize) -> Self {
        self.folds = Some(k);
        self
    }

    /// One fold per row.
    pub fn leave_one_out(mut self) -> Self {
        self.folds = None;
        self
    }

    /// Shuffle a copy of the dataset with this seed before splitting it, so folds
    /// do not follow the (usually class-sorted) file order.
    pub fn with_seed(mut self, seed : u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn folds(&self) -> Option<usize> {
        self.folds
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

}

/// Counts of classification outcomes. Undecided outcomes (decision tree
/// queries reaching an unseen value) are neither correct nor incorrect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {

    pub correct : usize,

    pub incorrect : usize,

    pub undecided : usize

}

impl Tally {

    pub fn record(&mut self, truth : Label, outcome : Outcome) {
        match outcome {
            Outcome::Label(l) if l == truth => self.correct += 1,
            Outcome::Label(_) => self.incorrect += 1,
            Outcome::Undecided => self.undecided += 1
        }
    }

    pub fn merge(&mut self, other : &Tally) {
        self.correct += other.correct;
        self.incorrect += other.incorrect;
        self.undecided += other.undecided;
    }

    pub fn total(&self) -> usize {
        self.correct + self.incorrect + self.undecided
    }

    /// Ratio of correct outcomes over all outcomes (zero when nothing was classified).
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => self.correct as f64 / n as f64
        }
    }

}

impl Display for Tally {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} correct ({:.2}%), {} incorrect, {} undecided",
            self.correct,
            self.total(),
            100. * self.accuracy(),
            self.incorrect,
            self.undecided
        )
    }

}

#[derive(Debug, Clone, Serialize)]
pub struct FoldReport {

    /// 1-based fold number.
    pub fold : usize,

    /// First and last (inclusive) testing rows.
    pub start : usize,

    pub end : usize,

    pub tally : Tally

}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {

    pub kind : ClassifierKind,

    pub folds : Vec<FoldReport>,

    pub total : Tally

}

impl Display for ValidationReport {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} folds): {}", self.kind, self.folds.len(), self.total)
    }

}

/// Trains a classifier of the informed kind on each training partition and tallies its
/// outcomes on the matching testing block. Any precondition failure (a fold whose training
/// rows miss a class, for a discriminant) aborts the whole run. on_fold is called after
/// every fold, which lets callers report progress.
pub fn cross_validate<F>(
    data : &Dataset,
    kind : ClassifierKind,
    config : &ValidationConfig,
    mut on_fold : F
) -> Result<ValidationReport, ClassifyError>
where
    F : FnMut(&FoldReport)
{
    let shuffled;
    let data = match config.seed {
        Some(seed) => {
            let mut copy = data.clone();
            copy.shuffle(&mut StdRng::seed_from_u64(seed));
            shuffled = copy;
            &shuffled
        },
        None => data
    };
    let k = config.folds.unwrap_or(data.len());
    let mut folds = Vec::with_capacity(k);
    let mut total = Tally::default();
    for fold in 1..=k {
        let (start, end) = k_fold_indices(fold, k, data.len())?;
        let part = data.partition(start, end)?;
        let clf = part.training.classifier(kind)?;
        let mut tally = Tally::default();
        for i in 0..part.testing.len() {
            tally.record(part.testing.label(i), clf.classify(&part.testing.point(i)[..]));
        }
        debug!(%kind, fold, start, end, correct = tally.correct, incorrect = tally.incorrect, undecided = tally.undecided, "fold evaluated");
        total.merge(&tally);
        let report = FoldReport { fold, start, end, tally };
        on_fold(&report);
        folds.push(report);
    }
    info!(%kind, folds = k, accuracy = total.accuracy(), undecided = total.undecided, "cross-validation finished");
    Ok(ValidationReport { kind, folds, total })
}

/// k-fold cross-validation over the rows in their current order.
pub fn k_fold(data : &Dataset, kind : ClassifierKind, k : usize) -> Result<ValidationReport, ClassifyError> {
    cross_validate(data, kind, &ValidationConfig::new().with_folds(k), |_| { })
}

/// Cross-validation with one testing row per fold.
pub fn leave_one_out(data : &Dataset, kind : ClassifierKind) -> Result<ValidationReport, ClassifyError> {
    cross_validate(data, kind, &ValidationConfig::new().leave_one_out(), |_| { })
}
