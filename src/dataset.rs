use std::{
    collections::HashMap,
    fs::File,
    io::{IsTerminal, Read},
    path::Path,
    time::Duration,
};

use csv::{ReaderBuilder, StringRecord};
use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::{DEFAULT_INDICATOR_COLUMNS, DEFAULT_TEXT_COLUMNS, REQUIRED_COLUMNS};
use crate::error::{LoadError, SchemaError};

/// Which columns of the prescriber file are not drug counts.
///
/// Everything not listed as text or indicator is a metric column, resolved by
/// header name so column order in the file never changes the metric set.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub text_columns: Vec<String>,
    pub indicator_columns: Vec<String>,
    pub required_columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            text_columns: to_owned_list(DEFAULT_TEXT_COLUMNS),
            indicator_columns: to_owned_list(DEFAULT_INDICATOR_COLUMNS),
            required_columns: to_owned_list(REQUIRED_COLUMNS),
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Indicator,
    Metric,
}

impl ColumnKind {
    fn label(self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Indicator => "indicator",
            ColumnKind::Metric => "metric",
        }
    }
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    kind: ColumnKind,
    /// Index into `Record::text` for text columns, `Record::numbers` otherwise.
    slot: usize,
}

/// One provider row. Numeric cells are `None` when the source cell was empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    text: Vec<String>,
    numbers: Vec<Option<f64>>,
}

impl Record {
    pub fn text(&self, slot: usize) -> &str {
        self.text.get(slot).map(String::as_str).unwrap_or("")
    }

    pub fn number(&self, slot: usize) -> Option<f64> {
        self.numbers.get(slot).copied().flatten()
    }

    /// Missing cells count as zero when summing.
    pub fn number_or_zero(&self, slot: usize) -> f64 {
        self.number(slot).unwrap_or(0.0)
    }
}

/// Immutable in-memory copy of the prescriber file.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
    positions: HashMap<String, usize>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_path(path: &Path, opts: &LoadOptions) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|err| LoadError::Open {
            path: path.to_path_buf(),
            source: csv::Error::from(err),
        })?;
        let dataset = Self::from_reader(file, opts)?;
        tracing::info!(
            "Loaded {} records with {} metric columns from {}",
            dataset.len(),
            dataset.metric_columns().len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(input: R, opts: &LoadOptions) -> Result<Self, LoadError> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);
        let headers = reader.headers().map_err(LoadError::Header)?.clone();
        let (columns, positions) = resolve_columns(&headers, opts)?;

        let text_width = columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Text)
            .count();
        let number_width = columns.len() - text_width;

        let records = with_progress(load_progress(), |progress| {
            let mut records = Vec::new();
            let mut row = StringRecord::new();
            loop {
                let has_row = reader.read_record(&mut row).map_err(|err| LoadError::Row {
                    line: err.position().map(|p| p.line()).unwrap_or_default(),
                    source: err,
                })?;
                if !has_row {
                    break;
                }
                let line = row.position().map(|p| p.line()).unwrap_or_default();
                records.push(parse_record(&row, line, &columns, text_width, number_width)?);
                if records.len() % 1000 == 0 {
                    progress.set_position(records.len() as u64);
                }
            }
            Ok::<_, LoadError>(records)
        })?;

        Ok(Self {
            columns,
            positions,
            records,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Metric column names in header order.
    pub fn metric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Metric)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Record slot of a text column.
    pub fn text_slot(&self, name: &str) -> Result<usize, SchemaError> {
        let column = self.column(name)?;
        match column.kind {
            ColumnKind::Text => Ok(column.slot),
            other => Err(SchemaError::WrongKind {
                column: name.to_string(),
                expected: ColumnKind::Text.label(),
                actual: other.label(),
            }),
        }
    }

    /// Record slot of a numeric (metric or indicator) column.
    pub fn number_slot(&self, name: &str) -> Result<usize, SchemaError> {
        let column = self.column(name)?;
        match column.kind {
            ColumnKind::Metric | ColumnKind::Indicator => Ok(column.slot),
            ColumnKind::Text => Err(SchemaError::WrongKind {
                column: name.to_string(),
                expected: ColumnKind::Metric.label(),
                actual: ColumnKind::Text.label(),
            }),
        }
    }

    /// Appends a derived metric holding, for each record, the sum of `metrics`.
    pub fn with_row_total(mut self, name: &str, metrics: &[String]) -> Result<Self, SchemaError> {
        if self.positions.contains_key(name) {
            return Err(SchemaError::DuplicateColumn {
                column: name.to_string(),
            });
        }
        let slots = metrics
            .iter()
            .map(|m| self.number_slot(m))
            .collect::<Result<Vec<_>, _>>()?;

        let slot = self
            .columns
            .iter()
            .filter(|c| c.kind != ColumnKind::Text)
            .count();
        for record in &mut self.records {
            let total: f64 = slots.iter().map(|&s| record.number_or_zero(s)).sum();
            record.numbers.push(Some(total));
        }

        self.positions.insert(name.to_string(), self.columns.len());
        self.columns.push(Column {
            name: name.to_string(),
            kind: ColumnKind::Metric,
            slot,
        });
        Ok(self)
    }

    fn column(&self, name: &str) -> Result<&Column, SchemaError> {
        self.positions
            .get(name)
            .map(|&idx| &self.columns[idx])
            .ok_or_else(|| SchemaError::MissingColumn {
                column: name.to_string(),
            })
    }
}

fn resolve_columns(
    headers: &StringRecord,
    opts: &LoadOptions,
) -> Result<(Vec<Column>, HashMap<String, usize>), SchemaError> {
    let mut columns = Vec::with_capacity(headers.len());
    let mut positions = HashMap::with_capacity(headers.len());
    let mut text_slots = 0usize;
    let mut number_slots = 0usize;

    for raw in headers.iter() {
        let name = raw.trim().to_string();
        if positions.contains_key(&name) {
            return Err(SchemaError::DuplicateColumn { column: name });
        }
        let kind = if opts.text_columns.iter().any(|c| *c == name) {
            ColumnKind::Text
        } else if opts.indicator_columns.iter().any(|c| *c == name) {
            ColumnKind::Indicator
        } else {
            ColumnKind::Metric
        };
        let slot = if kind == ColumnKind::Text {
            text_slots += 1;
            text_slots - 1
        } else {
            number_slots += 1;
            number_slots - 1
        };
        positions.insert(name.clone(), columns.len());
        columns.push(Column { name, kind, slot });
    }

    for required in &opts.required_columns {
        if !positions.contains_key(required) {
            return Err(SchemaError::MissingColumn {
                column: required.clone(),
            });
        }
    }

    Ok((columns, positions))
}

fn parse_record(
    row: &StringRecord,
    line: u64,
    columns: &[Column],
    text_width: usize,
    number_width: usize,
) -> Result<Record, LoadError> {
    let mut text = Vec::with_capacity(text_width);
    let mut numbers = Vec::with_capacity(number_width);

    for (column, raw) in columns.iter().zip(row.iter()) {
        let value = raw.trim();
        match column.kind {
            ColumnKind::Text => text.push(value.to_string()),
            ColumnKind::Metric => {
                let count = parse_metric(value).ok_or_else(|| LoadError::NonNumeric {
                    line,
                    column: column.name.clone(),
                    value: value.to_string(),
                })?;
                if count.is_some_and(|v| v < 0.0 || v.fract() != 0.0) {
                    return Err(LoadError::BadCount {
                        line,
                        column: column.name.clone(),
                        value: value.to_string(),
                    });
                }
                numbers.push(count)
            }
            ColumnKind::Indicator => {
                numbers.push(Some(parse_indicator(value).ok_or_else(|| {
                    LoadError::BadIndicator {
                        line,
                        column: column.name.clone(),
                        value: value.to_string(),
                    }
                })?))
            }
        }
    }

    Ok(Record { text, numbers })
}

/// `Some(None)` for an empty cell, `None` when the text is not a finite number.
fn parse_metric(value: &str) -> Option<Option<f64>> {
    if value.is_empty() {
        return Some(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
}

fn parse_indicator(value: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(v) if v == 0.0 || v == 1.0 => Some(v),
        _ => None,
    }
}

/// Runs `work` with the bar ticking and clears it whether or not `work` failed.
fn with_progress<T>(progress: ProgressBar, work: impl FnOnce(&ProgressBar) -> T) -> T {
    let out = work(&progress);
    progress.finish_and_clear();
    out
}

fn load_progress() -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} records read")
    {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}
