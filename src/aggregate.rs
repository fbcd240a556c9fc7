use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::dataset::Dataset;
use crate::error::{GraphError, SchemaError};
use crate::graph::Link;
use crate::matrix::Matrix;

/// Sums each metric over the records sharing a value of `group_field`.
///
/// Rows are the distinct observed group values in ascending order, columns are
/// `metric_fields` in the order given. Empty metric cells count as zero. An
/// empty group value is a category of its own, so every record lands in
/// exactly one row.
pub fn aggregate(
    dataset: &Dataset,
    group_field: &str,
    metric_fields: &[String],
) -> Result<Matrix, SchemaError> {
    let group_slot = dataset.text_slot(group_field)?;
    let metric_slots = metric_fields
        .iter()
        .map(|name| dataset.number_slot(name))
        .collect::<Result<Vec<_>, _>>()?;

    let groups: BTreeSet<&str> = dataset
        .records()
        .iter()
        .map(|r| r.text(group_slot))
        .collect();
    let row_of: HashMap<&str, usize> = groups
        .iter()
        .enumerate()
        .map(|(idx, name)| (*name, idx))
        .collect();

    let mut matrix = Matrix::zeros(
        groups.iter().map(|g| g.to_string()).collect(),
        metric_fields.to_vec(),
    );
    for record in dataset.records() {
        let row = row_of[record.text(group_slot)];
        for (cell, &slot) in matrix.row_mut(row).iter_mut().zip(&metric_slots) {
            *cell += record.number_or_zero(slot);
        }
    }

    tracing::debug!(
        "Aggregated {} records into {} groups x {} metrics by {group_field}",
        dataset.len(),
        matrix.rows(),
        matrix.columns()
    );
    Ok(matrix)
}

/// Divides every cell by its row total. Rows totalling zero stay all-zero.
pub fn ratios(matrix: &Matrix) -> Matrix {
    let mut out = matrix.clone();
    for (row, total) in matrix.row_sums().into_iter().enumerate() {
        for cell in out.row_mut(row) {
            *cell = if total == 0.0 { 0.0 } else { *cell / total };
        }
    }
    out
}

/// Mean of `value_field` per observed group value.
///
/// Only groups with at least one record appear in the result; callers joining
/// against a declared set of groups must treat an absent key as "no data".
pub fn average_by_group(
    dataset: &Dataset,
    group_field: &str,
    value_field: &str,
) -> Result<BTreeMap<String, f64>, SchemaError> {
    let group_slot = dataset.text_slot(group_field)?;
    let value_slot = dataset.number_slot(value_field)?;

    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in dataset.records() {
        let entry = sums.entry(record.text(group_slot)).or_insert((0.0, 0));
        entry.0 += record.number_or_zero(value_slot);
        entry.1 += 1;
    }

    Ok(sums
        .into_iter()
        .map(|(group, (sum, count))| (group.to_string(), sum / count as f64))
        .collect())
}

/// Number of records per observed group value.
pub fn count_by_group(
    dataset: &Dataset,
    group_field: &str,
) -> Result<BTreeMap<String, usize>, SchemaError> {
    let group_slot = dataset.text_slot(group_field)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in dataset.records() {
        *counts.entry(record.text(group_slot).to_string()).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Symmetric `node_count x node_count` matrix of link weights.
///
/// Both `[source][target]` and `[target][source]` take the link value; when a
/// pair is linked more than once the last link wins. Rows and columns are
/// labelled by node index.
pub fn co_occurrence(links: &[Link], node_count: usize) -> Result<Matrix, GraphError> {
    let labels: Vec<String> = (0..node_count).map(|i| i.to_string()).collect();
    let mut matrix = Matrix::zeros(labels.clone(), labels);

    for (position, link) in links.iter().enumerate() {
        if link.source >= node_count || link.target >= node_count {
            return Err(GraphError::LinkOutOfRange {
                position,
                from: link.source,
                to: link.target,
                node_count,
            });
        }
        matrix.set(link.source, link.target, link.value);
        matrix.set(link.target, link.source, link.value);
    }
    debug_assert!(matrix.is_symmetric());
    Ok(matrix)
}
