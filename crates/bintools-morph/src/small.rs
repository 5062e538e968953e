use std::collections::HashMap;

use bintools_core::{Label, LabelField};
use log::debug;

/// Reassign every component with fewer than `min_size` cells to background.
///
/// Surviving ids are kept as they are; `min_size` of 0 or 1 returns an
/// identical field.
pub fn remove_small_components(labels: &LabelField, min_size: usize) -> LabelField {
    if min_size <= 1 {
        return labels.clone();
    }
    let counts = labels.counts();
    let removed = counts.values().filter(|&&c| c < min_size).count();
    debug!("removing {removed} components below {min_size} cells");
    labels.map_labels(|l| match counts.get(&l) {
        Some(&c) if c < min_size => 0,
        _ => l,
    })
}

/// Renumber ids densely from 1 in order of first appearance in raster order.
pub fn relabel_sequential(labels: &LabelField) -> LabelField {
    let mut map: HashMap<Label, Label> = HashMap::from([(0, 0)]);
    for &l in labels.as_slice() {
        let next = map.len() as Label;
        map.entry(l).or_insert(next);
    }
    labels.map_labels(|l| map.get(&l).copied().unwrap_or(0))
}
