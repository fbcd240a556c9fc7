use anyhow::{Result, ensure};
use serde::Serialize;

use crate::constants::{ALPHA_CAP, ALPHA_FLOOR};
use crate::matrix::Matrix;
use crate::regions::{Region, RegionRate};

/// Which axis the matrix rows are drawn along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Row label on y, column label on x.
    RowsOnY,
    /// Row label on x, column label on y.
    RowsOnX,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub tools: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label_orientation: Option<f64>,
    /// `(label, field)` pairs.
    pub tooltips: Vec<(String, String)>,
}

/// Flat, index-aligned arrays handed to the charting front end.
///
/// Entry `k` of every array describes the same cell. Drawing, colour mapping and
/// tooltips are left to whatever consumes the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapSeries {
    pub x_categories: Vec<String>,
    pub y_categories: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
}

impl HeatmapSeries {
    /// One entry per cell, walking the matrix row after row.
    pub fn from_matrix(matrix: &Matrix, orientation: Orientation) -> Self {
        let cells = matrix.rows() * matrix.columns();
        let mut series = Self {
            x_categories: Vec::with_capacity(cells),
            y_categories: Vec::with_capacity(cells),
            values: matrix.cells().to_vec(),
            opacity: None,
            colors: None,
        };
        for row in matrix.row_labels() {
            for column in matrix.column_labels() {
                let (x, y) = match orientation {
                    Orientation::RowsOnY => (column, row),
                    Orientation::RowsOnX => (row, column),
                };
                series.x_categories.push(x.clone());
                series.y_categories.push(y.clone());
            }
        }
        series
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn with_opacity(mut self, opacity: Vec<f64>) -> Result<Self> {
        ensure!(
            opacity.len() == self.len(),
            "opacity has {} entries, series has {}",
            opacity.len(),
            self.len()
        );
        self.opacity = Some(opacity);
        Ok(self)
    }

    pub fn with_colors(mut self, colors: Vec<String>) -> Result<Self> {
        ensure!(
            colors.len() == self.len(),
            "colors has {} entries, series has {}",
            colors.len(),
            self.len()
        );
        self.colors = Some(colors);
        Ok(self)
    }
}

/// Maps a weight onto `[ALPHA_FLOOR, ALPHA_FLOOR + ALPHA_CAP]`.
pub fn alpha(weight: f64) -> f64 {
    weight.clamp(0.0, ALPHA_CAP) + ALPHA_FLOOR
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapRequest {
    pub display: DisplayConfig,
    pub x_range: Vec<String>,
    pub y_range: Vec<String>,
    #[serde(flatten)]
    pub series: HeatmapSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorMapper {
    pub kind: String,
    pub palette: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethRequest {
    pub display: DisplayConfig,
    pub color_mapper: ColorMapper,
    pub region_codes: Vec<String>,
    pub region_names: Vec<String>,
    pub xs: Vec<Vec<f64>>,
    pub ys: Vec<Vec<f64>>,
    /// Colour field; `null` where the region has no data.
    pub rates: Vec<Option<f64>>,
}

impl ChoroplethRequest {
    pub fn new(
        display: DisplayConfig,
        color_mapper: ColorMapper,
        regions: &[Region],
        rates: &[RegionRate],
    ) -> Result<Self> {
        ensure!(
            regions.len() == rates.len(),
            "{} regions but {} rates",
            regions.len(),
            rates.len()
        );
        for (region, rate) in regions.iter().zip(rates) {
            ensure!(
                region.code == rate.code,
                "region {} paired with rate for {}",
                region.code,
                rate.code
            );
        }

        Ok(Self {
            display,
            color_mapper,
            region_codes: regions.iter().map(|r| r.code.clone()).collect(),
            region_names: regions.iter().map(|r| r.name.clone()).collect(),
            xs: regions.iter().map(|r| r.lons.clone()).collect(),
            ys: regions.iter().map(|r| r.lats.clone()).collect(),
            rates: rates.iter().map(|r| r.rate).collect(),
        })
    }
}
