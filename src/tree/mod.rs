use nalgebra::*;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::dot::Dot;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::fmt::{self, Display};
use tracing::debug;
use crate::Label;
use crate::calc::{entropy, gain, group_by_value, majority};
use crate::classifier::Outcome;
use crate::error::ClassifyError;

/// Splits whose information gain does not exceed this value are considered
/// uninformative, so accumulated rounding error in the conditional entropy
/// never produces a branch.
pub const MIN_GAIN : f64 = 1E-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {

    /// Internal node branching on the exact value of an attribute (column index).
    Split { attribute : usize },

    /// Terminal node predicting a label.
    Leaf { label : Label }

}

/// A node of the decision tree. Besides its kind, a node records how many training
/// rows reached it, the entropy of their labels and how many attributes were
/// checked on the path from the root (its depth).
#[derive(Debug, Clone)]
pub struct TreeNode {

    pub kind : NodeKind,

    pub n_samples : usize,

    pub entropy : f64,

    pub depth : usize

}

impl Display for TreeNode {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Split { attribute } => write!(f, "attr {}", attribute)?,
            NodeKind::Leaf { label } => write!(f, "type {}", label)?
        }
        write!(f, " (n = {}, H = {:.3})", self.n_samples, self.entropy)
    }

}

/// Categorical decision tree grown greedily by information gain (ID3).
///
/// Columns are treated as discrete attributes: a split creates one branch per
/// distinct value observed in the rows that reached the node, and inference follows
/// the branch whose value equals the query value exactly. There are no thresholds,
/// so the tree suits datasets with small value domains per column (booleans, counts,
/// coded categories).
///
/// Nodes live in a petgraph arena. Edges go from parent to child and carry the
/// attribute value that selects the child, so parents are recovered from incoming
/// edges and no node is shared between two parents.
///
/// A node becomes a leaf when its labels are pure, when its depth reaches the number
/// of columns, or when no column has positive gain. Impure leaves predict the most
/// frequent label (lowest label on ties).
#[derive(Debug, Clone)]
pub struct DecisionTree {

    graph : DiGraph<TreeNode, f64>,

    root : NodeIndex,

    n_fields : usize

}

impl DecisionTree {

    /// Grows a tree over the rows of data, where labels[i] is the label of row i.
    pub fn new(labels : &[Label], data : &DMatrix<f64>) -> Result<Self, ClassifyError> {
        if data.nrows() == 0 {
            return Err(ClassifyError::EmptyDataset);
        }
        if labels.len() != data.nrows() {
            return Err(ClassifyError::LabelCount { rows : data.nrows(), labels : labels.len() });
        }
        let mut graph = DiGraph::new();
        let rows : Vec<usize> = (0..data.nrows()).collect();
        let root = grow(&mut graph, labels, data, &rows[..], 0);
        debug!(nodes = graph.node_count(), rows = data.nrows(), "decision tree grown");
        Ok(Self { graph, root, n_fields : data.ncols() })
    }

    /// Descends from the root following the branch matching each split attribute.
    /// Returns Outcome::Undecided when a split has no branch for the value held by
    /// the point (a value never seen at that node during training).
    pub fn classify(&self, point : &[f64]) -> Outcome {
        assert!(point.len() == self.n_fields, "Point has {} fields, tree expects {}", point.len(), self.n_fields);
        let mut node = self.root;
        loop {
            match self.graph[node].kind {
                NodeKind::Leaf { label } => return Outcome::Label(label),
                NodeKind::Split { attribute } => {
                    let value = point[attribute];
                    match self.graph.edges(node).find(|e| *e.weight() == value ) {
                        Some(edge) => node = edge.target(),
                        None => return Outcome::Undecided
                    }
                }
            }
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node(&self, ix : NodeIndex) -> &TreeNode {
        &self.graph[ix]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn n_fields(&self) -> usize {
        self.n_fields
    }

    /// Number of split levels below the root (zero when the root is a leaf).
    pub fn depth(&self) -> usize {
        self.graph.node_indices().map(|ix| self.graph[ix].depth ).max().unwrap_or(0)
    }

    pub fn parent(&self, ix : NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(ix, Direction::Incoming).next()
    }

    /// Attribute value on the edge that leads into the node (None for the root).
    pub fn branch_value(&self, ix : NodeIndex) -> Option<f64> {
        self.graph.edges_directed(ix, Direction::Incoming).next().map(|e| *e.weight() )
    }

    /// Children of the node, paired with the attribute value selecting each one.
    pub fn children(&self, ix : NodeIndex) -> Vec<(f64, NodeIndex)> {
        let mut children : Vec<_> = self.graph.edges(ix).map(|e| (*e.weight(), e.target()) ).collect();
        children.sort_by_key(|(_, n)| n.index() );
        children
    }

    pub fn leaves(&self) -> impl Iterator<Item=NodeIndex> + '_ {
        self.graph.node_indices().filter(move |ix| matches!(self.graph[*ix].kind, NodeKind::Leaf { .. }) )
    }

    /// Graphviz dot rendering of the tree, for offline inspection.
    pub fn dot(&self) -> String {
        format!("{}", Dot::with_config(&self.graph, &[]))
    }

}

impl Display for DecisionTree {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dot())
    }

}

fn grow(
    graph : &mut DiGraph<TreeNode, f64>,
    labels : &[Label],
    data : &DMatrix<f64>,
    rows : &[usize],
    depth : usize
) -> NodeIndex {
    let node_labels : Vec<Label> = rows.iter().map(|r| labels[*r] ).collect();
    let node_entropy = entropy(&node_labels[..]);
    let split = if node_entropy == 0.0 || depth >= data.ncols() {
        None
    } else {
        best_attribute(&node_labels[..], data, rows)
    };
    let node = |kind : NodeKind| TreeNode { kind, n_samples : rows.len(), entropy : node_entropy, depth };
    match split {
        Some(attribute) => {
            let ix = graph.add_node(node(NodeKind::Split { attribute }));
            let column : Vec<f64> = rows.iter().map(|r| data[(*r, attribute)] ).collect();
            for (value, positions) in group_by_value(&column[..]) {
                let child_rows : Vec<usize> = positions.iter().map(|p| rows[*p] ).collect();
                let child = grow(graph, labels, data, &child_rows[..], depth + 1);
                graph.add_edge(ix, child, value);
            }
            ix
        },
        None => {
            let label = match majority(&node_labels[..]) {
                Some(label) => label,
                None => unreachable!("Tree nodes always hold at least one row")
            };
            graph.add_node(node(NodeKind::Leaf { label }))
        }
    }
}

/// Column with the largest information gain over the informed rows (first column
/// on ties), or None when no column has a gain above MIN_GAIN.
fn best_attribute(node_labels : &[Label], data : &DMatrix<f64>, rows : &[usize]) -> Option<usize> {
    let mut best : Option<(usize, f64)> = None;
    for attr in 0..data.ncols() {
        let column : Vec<f64> = rows.iter().map(|r| data[(*r, attr)] ).collect();
        let g = gain(node_labels, &column[..]);
        if best.map(|(_, best_g)| g > best_g ).unwrap_or(true) {
            best = Some((attr, g));
        }
    }
    best.filter(|(_, g)| *g > MIN_GAIN ).map(|(attr, _)| attr )
}
