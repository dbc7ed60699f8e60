use std::fmt::{self, Display};
use std::str::FromStr;
use serde::Serialize;
use crate::Label;
use crate::decision::Discriminant;
use crate::tree::DecisionTree;

/// Model family built by crate::sample::Dataset::classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClassifierKind {

    /// Gaussian discriminant with the full sample covariance of each class.
    Optimal,

    /// Gaussian discriminant with diagonal covariances (features assumed independent).
    Naive,

    /// Gaussian discriminant with identity covariances (unit variance shared by all
    /// classes and dimensions), which reduces to a nearest-mean rule.
    Linear,

    /// Categorical decision tree grown by information gain.
    DecisionTree

}

impl ClassifierKind {

    pub const ALL : [ClassifierKind; 4] = [
        ClassifierKind::Optimal,
        ClassifierKind::Naive,
        ClassifierKind::Linear,
        ClassifierKind::DecisionTree
    ];

    pub fn is_discriminant(&self) -> bool {
        !matches!(self, ClassifierKind::DecisionTree)
    }

}

impl Display for ClassifierKind {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Optimal => write!(f, "optimal"),
            ClassifierKind::Naive => write!(f, "naive"),
            ClassifierKind::Linear => write!(f, "linear"),
            ClassifierKind::DecisionTree => write!(f, "tree")
        }
    }

}

impl FromStr for ClassifierKind {

    type Err = String;

    fn from_str(s : &str) -> Result<Self, Self::Err> {
        match &s.to_lowercase()[..] {
            "optimal" => Ok(ClassifierKind::Optimal),
            "naive" => Ok(ClassifierKind::Naive),
            "linear" => Ok(ClassifierKind::Linear),
            "tree" | "decision-tree" => Ok(ClassifierKind::DecisionTree),
            other => Err(format!("Unknown classifier kind: {}", other))
        }
    }

}

/// Result of classifying a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {

    Label(Label),

    /// The decision tree reached a split with no branch for the value held by the
    /// point. This is neither a correct nor an incorrect answer.
    Undecided

}

impl Outcome {

    pub fn label(&self) -> Option<Label> {
        match self {
            Outcome::Label(l) => Some(*l),
            Outcome::Undecided => None
        }
    }

    pub fn is_undecided(&self) -> bool {
        *self == Outcome::Undecided
    }

}

impl Display for Outcome {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Label(l) => write!(f, "{}", l),
            Outcome::Undecided => write!(f, "undecided")
        }
    }

}

/// A trained classifier. Both variants are immutable after training, so a
/// classifier can be shared between threads and queried concurrently.
#[derive(Debug, Clone)]
pub enum Classifier {
    Discriminant(Discriminant),
    Tree(DecisionTree)
}

impl Classifier {

    pub fn classify(&self, point : &[f64]) -> Outcome {
        match self {
            Classifier::Discriminant(d) => Outcome::Label(d.classify(point)),
            Classifier::Tree(t) => t.classify(point)
        }
    }

    pub fn as_tree(&self) -> Option<&DecisionTree> {
        match self {
            Classifier::Tree(t) => Some(t),
            _ => None
        }
    }

}

impl From<Discriminant> for Classifier {

    fn from(d : Discriminant) -> Self {
        Classifier::Discriminant(d)
    }

}

impl From<DecisionTree> for Classifier {

    fn from(t : DecisionTree) -> Self {
        Classifier::Tree(t)
    }

}
