use thiserror::Error;
use crate::Label;

/// Precondition violations raised while building datasets, partitions
/// and classifiers. None of those are recoverable inside the crate: the operation
/// that returned them is aborted and the caller decides what to do.
#[derive(Debug, Error)]
pub enum ClassifyError {

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("dataset has {rows} rows but {labels} labels")]
    LabelCount { rows : usize, labels : usize },

    #[error("label {label} at row {row} outside class range [1, {n_classes}]")]
    LabelRange { label : Label, row : usize, n_classes : usize },

    #[error("non-finite value at row {row}, column {column}")]
    NonFinite { row : usize, column : usize },

    #[error("class {label} outside class range [1, {n_classes}]")]
    UnknownClass { label : Label, n_classes : usize },

    #[error("class {label} has no members")]
    EmptyClass { label : Label },

    #[error("invalid partition [{start}, {end}] for dataset of size {size}")]
    Partition { start : usize, end : usize, size : usize },

    #[error("invalid fold {fold} of {k} for dataset of size {size}")]
    Fold { fold : usize, k : usize, size : usize },

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount { line : usize, expected : usize, found : usize },

    #[error("line {line}: could not parse '{value}'")]
    Parse { line : usize, value : String },

    #[error(transparent)]
    Csv(#[from] csv::Error)

}
