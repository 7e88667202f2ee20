//! Configuration loading and parsing.
//!
//! This module handles:
//! - Loading and parsing settings.json (page, grid, label style, font)
//! - Loading and parsing data.csv (one label per row, with copies)
//! - Unit conversion for dimensions (mm, cm, in, pt)

use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use crate::label::{LabelFields, LabelStyle};
use crate::layout::{GridSpec, TextFitter, MIN_STEP};

/// Length in points. Deserializes from a number (points) or a string with a
/// unit: "100 mm", "10cm", "1 in", "12 pt".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension(pub f64);

impl Dimension {
    /// Convert to points (internal PDF unit)
    pub fn as_points(&self) -> f64 {
        self.0
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let split = value
            .find(|c: char| c.is_ascii_alphabetic() || c.is_whitespace())
            .unwrap_or(value.len());
        let (num_str, unit) = value.split_at(split);

        let num: f64 = num_str
            .trim()
            .parse()
            .map_err(|_| format!("invalid number in dimension: {:?}", num_str.trim()))?;

        // 1 inch = 72 points (PDF default unit)
        let points = match unit.trim().to_lowercase().as_str() {
            "" | "pt" | "point" | "points" => num,
            "mm" => num * 72.0 / 25.4,
            "cm" => num * 72.0 / 2.54,
            "in" | "inch" | "inches" => num * 72.0,
            other => return Err(format!("unknown unit '{}'. Supported: mm, cm, in, pt", other)),
        };
        Ok(Dimension(points))
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(points) => Ok(Dimension(points)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Contents of settings.json. Every section and field is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub page: PageSection,
    pub grid: GridSection,
    pub label: LabelSection,
    pub settings: SettingsSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageSection {
    pub width: Dimension,
    pub height: Dimension,
}

impl Default for PageSection {
    fn default() -> Self {
        let spec = GridSpec::default();
        Self {
            width: Dimension(spec.page_width),
            height: Dimension(spec.page_height),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSection {
    pub cols: usize,
    pub rows: usize,
    pub margin_x: Dimension,
    pub margin_y: Dimension,
    pub gap_x: Dimension,
    pub gap_y: Dimension,
}

impl Default for GridSection {
    fn default() -> Self {
        let spec = GridSpec::default();
        Self {
            cols: spec.cols,
            rows: spec.rows,
            margin_x: Dimension(spec.margin_x),
            margin_y: Dimension(spec.margin_y),
            gap_x: Dimension(spec.gap_x),
            gap_y: Dimension(spec.gap_y),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelSection {
    pub barcode_height_ratio: f64,
    pub barcode_width_ratio: f64,
    pub min_module_width: Dimension,
    pub status_text: String,
    pub draw_border: bool,
    pub description_min_size: Dimension,
    pub description_max_size: Dimension,
    pub description_line_gap: Dimension,
    pub fit_step: Dimension,
}

impl Default for LabelSection {
    fn default() -> Self {
        let style = LabelStyle::default();
        Self {
            barcode_height_ratio: style.barcode_height_ratio,
            barcode_width_ratio: style.barcode_width_ratio,
            min_module_width: Dimension(style.min_module_width),
            status_text: style.status_text,
            draw_border: style.draw_border,
            description_min_size: Dimension(style.description.min_size),
            description_max_size: Dimension(style.description.max_size),
            description_line_gap: Dimension(style.description.line_gap),
            fit_step: Dimension(style.description.step),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsSection {
    /// Standard font name (e.g. "Helvetica", "Courier") or an installed
    /// TrueType family.
    pub font: Option<String>,
}

impl Settings {
    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            page_width: self.page.width.as_points(),
            page_height: self.page.height.as_points(),
            margin_x: self.grid.margin_x.as_points(),
            margin_y: self.grid.margin_y.as_points(),
            gap_x: self.grid.gap_x.as_points(),
            gap_y: self.grid.gap_y.as_points(),
            cols: self.grid.cols,
            rows: self.grid.rows,
        }
    }

    pub fn label_style(&self) -> LabelStyle {
        let label = &self.label;
        LabelStyle {
            barcode_height_ratio: label.barcode_height_ratio,
            barcode_width_ratio: label.barcode_width_ratio,
            min_module_width: label.min_module_width.as_points(),
            status_text: label.status_text.clone(),
            draw_border: label.draw_border,
            description: TextFitter::new(
                label.description_min_size.as_points(),
                label.description_max_size.as_points(),
            )
            .with_line_gap(label.description_line_gap.as_points())
            .with_step(label.fit_step.as_points()),
        }
    }

    /// Reject values the layout cannot work with. Grid geometry itself is
    /// checked when the grid is computed.
    pub fn validate(&self) -> Result<()> {
        let label = &self.label;
        for (name, ratio) in [
            ("barcode_height_ratio", label.barcode_height_ratio),
            ("barcode_width_ratio", label.barcode_width_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                bail!("label.{} must be in (0, 1], got {}", name, ratio);
            }
        }
        for (name, value) in [
            ("min_module_width", label.min_module_width),
            ("description_min_size", label.description_min_size),
            ("description_max_size", label.description_max_size),
            ("fit_step", label.fit_step),
        ] {
            if value.as_points() <= 0.0 {
                bail!("label.{} must be positive, got {}", name, value.as_points());
            }
        }
        if label.fit_step.as_points() < MIN_STEP {
            bail!("label.fit_step must be at least {} pt, got {}", MIN_STEP, label.fit_step.as_points());
        }
        if label.description_min_size.as_points() > label.description_max_size.as_points() {
            bail!("label.description_min_size must not exceed label.description_max_size");
        }
        if label.description_line_gap.as_points() < 0.0 {
            bail!("label.description_line_gap must not be negative");
        }
        Ok(())
    }
}

/// Helper function to open a file with consistent error context
fn open_file_with_context(path: &Path, description: &str) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {} at {:?}", description, path))
}

pub fn load_settings_config(path: &Path) -> Result<Settings> {
    let file = open_file_with_context(path, "settings.json")?;
    let reader = BufReader::new(file);
    let settings: Settings =
        serde_json::from_reader(reader).with_context(|| "Failed to parse settings.json")?;
    settings.validate()?;
    Ok(settings)
}

const IDENTIFIER_COLUMNS: &[&str] = &["identifier", "fnsku"];
const SKU_COLUMNS: &[&str] = &["sku"];
const DESCRIPTION_COLUMNS: &[&str] = &["description", "desc"];
const COUNTRY_COLUMNS: &[&str] = &["country"];
const COPIES_COLUMN: &str = "copies";

/// Load labels from data.csv. Each row yields `copies` labels (default 1).
pub fn load_csv_data(path: &Path) -> Result<Vec<LabelFields>> {
    let file = open_file_with_context(path, "data.csv")?;
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_lowercase()).collect();

    let mut labels = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // Header is line 1
        let line = i + 2;
        let record = result.with_context(|| format!("Failed to read data.csv line {}", line))?;
        let data: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .collect();

        let column = |names: &[&str]| names.iter().find_map(|n| data.get(n).copied());
        let fields = LabelFields::from_parts(
            column(IDENTIFIER_COLUMNS),
            column(SKU_COLUMNS),
            column(DESCRIPTION_COLUMNS),
            column(COUNTRY_COLUMNS),
        );

        let copies = match data.get(COPIES_COLUMN).copied().filter(|v| !v.is_empty()) {
            None => 1,
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| anyhow!("data.csv line {}: copies must be a positive integer, got {:?}", line, raw))?,
        };
        labels.extend(std::iter::repeat_n(fields, copies));
    }
    Ok(labels)
}
