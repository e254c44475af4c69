// src/pipeline/dataset.rs

//! Dataset maintenance operations.
//!
//! Post-collection cleanup over the accumulated CSV files: dropping rows
//! with null-like values in required columns, reporting per-year row
//! counts split by trending label, and preparing a raw trending export
//! as the labeled trending half of the dataset.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate};

use crate::error::{AppError, Result};
use crate::utils::log;

/// Columns that must hold a real value for a row to survive cleaning.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "publishedAt",
    "channelTitle",
    "categoryId",
    "view_count",
    "likes",
    "comment_count",
];

/// Literal spellings of "no value" observed in the accumulated files.
const NULL_LIKE: [&str; 6] = ["None", "nan", "NaN", "<null>", "NULL", "NoneType"];

/// True if the cell content represents a missing value.
pub fn is_null_like(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || NULL_LIKE.contains(&trimmed)
}

/// Result of a cleaning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOutcome {
    pub kept: usize,
    pub dropped: usize,
}

/// Drop rows whose required columns hold null-like values.
///
/// Writes surviving rows (with the original header) to `output`.
pub fn clean_dataset(input: &Path, output: &Path) -> Result<CleanOutcome> {
    let mut reader = csv::Reader::from_path(input)?;
    let headers = reader.headers()?.clone();

    let required: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .map(|col| {
            headers.iter().position(|h| h == *col).ok_or_else(|| {
                AppError::validation(format!("input {input:?} is missing column {col}"))
            })
        })
        .collect::<Result<_>>()?;

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(&headers)?;

    let mut outcome = CleanOutcome { kept: 0, dropped: 0 };
    for row in reader.records() {
        let row = row?;
        if required
            .iter()
            .any(|&i| is_null_like(row.get(i).unwrap_or("")))
        {
            outcome.dropped += 1;
            continue;
        }
        writer.write_record(&row)?;
        outcome.kept += 1;
    }
    writer.flush()?;

    Ok(outcome)
}

/// Row counts for one publish year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearCounts {
    pub trending: usize,
    pub non_trending: usize,
}

/// Per-year breakdown of a dataset within an inclusive year range.
#[derive(Debug, Default)]
pub struct FilterReport {
    pub by_year: BTreeMap<i32, YearCounts>,
    /// Rows with an unparseable or out-of-range publish date.
    pub skipped: usize,
}

impl FilterReport {
    pub fn total(&self) -> usize {
        self.by_year
            .values()
            .map(|c| c.trending + c.non_trending)
            .sum()
    }
}

/// Count rows per publish year, split by trending label.
///
/// Rows whose `publishedAt` cannot be parsed are skipped, mirroring the
/// coerce-then-drop treatment the accumulated files received.
pub fn filter_by_year(input: &Path, from_year: i32, to_year: i32) -> Result<FilterReport> {
    let mut reader = csv::Reader::from_path(input)?;
    let headers = reader.headers()?.clone();

    let published_at = headers
        .iter()
        .position(|h| h == "publishedAt")
        .ok_or_else(|| {
            AppError::validation(format!("input {input:?} is missing column publishedAt"))
        })?;
    let is_trending = headers.iter().position(|h| h == "is_trending");

    let mut report = FilterReport::default();
    for row in reader.records() {
        let row = row?;

        let Some(year) = parse_year(row.get(published_at).unwrap_or("")) else {
            report.skipped += 1;
            continue;
        };
        if year < from_year || year > to_year {
            report.skipped += 1;
            continue;
        }

        let trending = is_trending
            .and_then(|i| row.get(i))
            .map(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            })
            .unwrap_or(false);

        let counts = report.by_year.entry(year).or_default();
        if trending {
            counts.trending += 1;
        } else {
            counts.non_trending += 1;
        }
    }

    Ok(report)
}

/// Columns removed from trending exports; the collected non-trending
/// side never carries `dislikes`, and its `ratings_disabled` has no
/// counterpart in the trending source.
const DROPPED_TRENDING_COLUMNS: [&str; 2] = ["dislikes", "ratings_disabled"];

/// Result of a trending-preparation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareOutcome {
    pub kept: usize,
    pub dropped: usize,
}

/// Prepare a raw trending export as the labeled trending half.
///
/// Drops rows published before `from_year` (rows with an unparseable
/// `publishedAt` included), removes the `dislikes` and `ratings_disabled`
/// columns when present, and forces `is_trending` to 1 on every surviving
/// row, adding the column if the export lacks it.
pub fn prepare_trending(input: &Path, output: &Path, from_year: i32) -> Result<PrepareOutcome> {
    let mut reader = csv::Reader::from_path(input)?;
    let headers = reader.headers()?.clone();

    let published_at = headers
        .iter()
        .position(|h| h == "publishedAt")
        .ok_or_else(|| {
            AppError::validation(format!("input {input:?} is missing column publishedAt"))
        })?;
    let dropped_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| DROPPED_TRENDING_COLUMNS.contains(h))
        .map(|(i, _)| i)
        .collect();
    let is_trending = headers.iter().position(|h| h == "is_trending");

    let mut writer = csv::Writer::from_path(output)?;
    let mut out_headers: Vec<&str> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !dropped_columns.contains(i))
        .map(|(_, h)| h)
        .collect();
    if is_trending.is_none() {
        out_headers.push("is_trending");
    }
    writer.write_record(&out_headers)?;

    let mut outcome = PrepareOutcome { kept: 0, dropped: 0 };
    for row in reader.records() {
        let row = row?;

        match parse_year(row.get(published_at).unwrap_or("")) {
            Some(year) if year >= from_year => {}
            _ => {
                outcome.dropped += 1;
                continue;
            }
        }

        let mut cells: Vec<&str> = Vec::with_capacity(headers.len());
        for (i, cell) in row.iter().enumerate() {
            if dropped_columns.contains(&i) {
                continue;
            }
            cells.push(if Some(i) == is_trending { "1" } else { cell });
        }
        if is_trending.is_none() {
            cells.push("1");
        }
        writer.write_record(&cells)?;
        outcome.kept += 1;
    }
    writer.flush()?;

    Ok(outcome)
}

/// Extract the publish year from an API timestamp or bare date.
fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.year());
    }
    value
        .get(..10)
        .and_then(|d| d.parse::<NaiveDate>().ok())
        .map(|d| d.year())
}

/// Run the cleaning pass and report the result.
pub fn run_clean(input: &Path, output: &Path) -> Result<()> {
    log::header("Cleaning dataset");
    let outcome = clean_dataset(input, output)?;
    log::summary(
        "Cleaning",
        &[
            ("Rows kept", outcome.kept.to_string()),
            ("Rows dropped", outcome.dropped.to_string()),
            ("Output", format!("{output:?}")),
        ],
    );
    Ok(())
}

/// Run the per-year report and print it.
pub fn run_filter(input: &Path, from_year: i32, to_year: i32) -> Result<()> {
    log::header(&format!("Video counts by year ({from_year}-{to_year})"));
    let report = filter_by_year(input, from_year, to_year)?;

    for (year, counts) in &report.by_year {
        log::sub_item(&format!(
            "{}: {} trending, {} non-trending",
            year, counts.trending, counts.non_trending
        ));
    }
    log::info(&format!(
        "Total {} rows in range, {} skipped",
        report.total(),
        report.skipped
    ));
    Ok(())
}

/// Run the trending-preparation pass and report the result.
pub fn run_prepare_trending(input: &Path, output: &Path, from_year: i32) -> Result<()> {
    log::header(&format!("Preparing trending dataset (from {from_year})"));
    let outcome = prepare_trending(input, output, from_year)?;
    log::summary(
        "Trending preparation",
        &[
            ("Rows kept", outcome.kept.to_string()),
            ("Rows dropped", outcome.dropped.to_string()),
            ("Output", format!("{output:?}")),
        ],
    );
    Ok(())
}
