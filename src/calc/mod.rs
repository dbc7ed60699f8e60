use crate::Label;

/* The entropy of a label subset only accounts for the classes observed in that
subset. Classes absent from the subset contribute nothing, so the same function
serves the root of a tree (where all classes are usually present) and its
deeper nodes (where most are not). */

/// Absolute frequency of each distinct label, in the order labels are first encountered.
pub fn counts(labels : &[Label]) -> Vec<(Label, usize)> {
    let mut counts : Vec<(Label, usize)> = Vec::new();
    for label in labels.iter() {
        match counts.iter_mut().find(|(l, _)| l == label ) {
            Some((_, n)) => *n += 1,
            None => counts.push((*label, 1))
        }
    }
    counts
}

/* Normalizing wrt sum of values is useful if values are absolute
frequencies. The ratio to the sum then gives a probability */
pub fn counts_to_probs(counts : &[usize]) -> Vec<f64> {
    let total = counts.iter().sum::<usize>() as f64;
    counts.iter().map(move |count| *count as f64 / total ).collect()
}

/// Shannon entropy (in bits) of an iterator over probabilities. Zero probabilities
/// contribute nothing (the limit of p log p as p goes to zero).
pub fn entropy_from_probs(probs : impl Iterator<Item=f64>) -> f64 {
    -1. * probs.filter(|p| *p > 0.0 ).fold(0.0, |total, p| total + p * p.log2() )
}

/// Base-2 Shannon entropy of the label distribution. Zero for an empty slice
/// or a slice holding a single class.
pub fn entropy(labels : &[Label]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let freqs : Vec<usize> = counts(labels).iter().map(|(_, n)| *n ).collect();
    if freqs.len() == 1 {
        return 0.0;
    }
    entropy_from_probs(counts_to_probs(&freqs[..]).into_iter())
}

/// Partitions row positions by the exact value held at the column. Groups are
/// ordered by first encounter of each value; positions are ascending within a group.
pub fn group_by_value(column : &[f64]) -> Vec<(f64, Vec<usize>)> {
    let mut groups : Vec<(f64, Vec<usize>)> = Vec::new();
    for (i, v) in column.iter().enumerate() {
        match groups.iter_mut().find(|(g, _)| g == v ) {
            Some((_, ixs)) => ixs.push(i),
            None => groups.push((*v, vec![i]))
        }
    }
    groups
}

/// Information gain from splitting the labels by the distinct values of column:
/// the entropy of the labels minus the size-weighted entropy of every value subset.
pub fn gain(labels : &[Label], column : &[f64]) -> f64 {
    assert!(labels.len() == column.len());
    if labels.is_empty() {
        return 0.0;
    }
    let n = labels.len() as f64;
    let conditional = group_by_value(column).iter()
        .map(|(_, ixs)| {
            let subset : Vec<Label> = ixs.iter().map(|i| labels[*i] ).collect();
            (subset.len() as f64 / n) * entropy(&subset[..])
        })
        .sum::<f64>();
    entropy(labels) - conditional
}

/// Most frequent label. Ties resolve to the lowest label value, so the result
/// does not depend on row order.
pub fn majority(labels : &[Label]) -> Option<Label> {
    counts(labels).into_iter()
        .max_by(|(la, na), (lb, nb)| na.cmp(nb).then(lb.cmp(la)) )
        .map(|(l, _)| l )
}
