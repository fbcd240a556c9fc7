use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;
use std::path::Path;

use crate::common::{write_atomic, write_staged};
use crate::matrix::Matrix;
use crate::regions::RegionRate;

/// Writes `matrix` with a header of `corner` followed by the column labels,
/// then one line per row led by its label.
pub fn write_matrix_csv(matrix: &Matrix, corner: &str, path: &Path) -> Result<()> {
    write_staged(path, |tmp_path| {
        let mut writer = Writer::from_path(tmp_path)
            .with_context(|| format!("Failed creating {}", tmp_path.display()))?;

        let mut header = Vec::with_capacity(matrix.columns() + 1);
        header.push(corner.to_string());
        header.extend(matrix.column_labels().iter().cloned());
        writer
            .write_record(&header)
            .context("Failed writing matrix header")?;

        for (idx, label) in matrix.row_labels().iter().enumerate() {
            let mut line = Vec::with_capacity(matrix.columns() + 1);
            line.push(label.clone());
            line.extend(matrix.row(idx).iter().map(|v| v.to_string()));
            writer
                .write_record(&line)
                .with_context(|| format!("Failed writing matrix row {label}"))?;
        }

        writer.flush().context("Failed flushing matrix writer")
    })
}

pub fn write_rates_csv(rates: &[RegionRate], path: &Path) -> Result<()> {
    write_staged(path, |tmp_path| {
        let mut writer = Writer::from_path(tmp_path)
            .with_context(|| format!("Failed creating {}", tmp_path.display()))?;
        writer
            .write_record(["state", "name", "providers", "rate"])
            .context("Failed writing rates header")?;

        for item in rates {
            let Some(rate) = item.rate else {
                continue;
            };
            let providers = item.providers.to_string();
            let rate = rate.to_string();
            writer
                .write_record([
                    item.code.as_str(),
                    item.name.as_str(),
                    providers.as_str(),
                    rate.as_str(),
                ])
                .with_context(|| format!("Failed writing rate for {}", item.code))?;
        }

        writer.flush().context("Failed flushing rates writer")
    })
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let body = serde_json::to_vec_pretty(value).context("Failed serializing render request")?;
    write_atomic(path, &body)
}
