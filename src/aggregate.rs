// Aggregator - per-year totals and the dataset-wide scales
// Everything here is computed once and never mutated afterwards

use crate::dataset::Record;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Total disbursed amount for one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyTotal {
    pub year: i32,
    pub disbursed: f64,
}

/// Shared choropleth color bounds, always symmetric around zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    pub min: f64,
    pub max: f64,
}

impl ColorRange {
    pub fn symmetric(magnitude: f64) -> Self {
        let m = magnitude.abs();
        ColorRange { min: -m, max: m }
    }

    /// Colorbar tick positions: low end, zero, high end
    pub fn ticks(&self) -> [f64; 3] {
        [self.min, 0.0, self.max]
    }
}

/// Sum of disbursed amount per year, ascending by year.
/// Missing amounts are skipped; a year with none present totals 0.
pub fn yearly_totals(records: &[Record]) -> Vec<YearlyTotal> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        let total = totals.entry(record.year).or_insert(0.0);
        if let Some(amount) = record.disbursed_amount {
            *total += amount;
        }
    }

    totals
        .into_iter()
        .map(|(year, disbursed)| YearlyTotal { year, disbursed })
        .collect()
}

/// Distinct years, strictly increasing
pub fn years(records: &[Record]) -> Vec<i32> {
    records
        .iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Records of a single year, in file order
pub fn records_for_year(records: &[Record], year: i32) -> Vec<&Record> {
    records.iter().filter(|r| r.year == year).collect()
}

/// Largest |deviation| across the whole dataset (missing values are skipped)
pub fn max_abs_deviation(records: &[Record]) -> f64 {
    records
        .iter()
        .filter_map(|r| r.deviation_from_avg)
        .map(f64::abs)
        .fold(0.0, f64::max)
}

/// Largest disbursed amount across the whole dataset
pub fn max_disbursed(records: &[Record]) -> f64 {
    records
        .iter()
        .filter_map(|r| r.disbursed_amount)
        .fold(0.0, f64::max)
}

// ============================================================================
// AGGREGATES
// ============================================================================

/// Everything the chart builders need, derived in one pass over the input.
/// `years` is the single source of ordering for frames, slider steps
/// and the line chart x-axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub years: Vec<i32>,
    pub yearly_totals: Vec<YearlyTotal>,
    pub color_range: ColorRange,
    pub max_disbursed: f64,
}

impl Aggregates {
    pub fn compute(records: &[Record]) -> Self {
        let yearly_totals = yearly_totals(records);
        let years = yearly_totals.iter().map(|t| t.year).collect();

        Aggregates {
            years,
            yearly_totals,
            color_range: ColorRange::symmetric(max_abs_deviation(records)),
            max_disbursed: max_disbursed(records),
        }
    }

    pub fn total_for(&self, year: i32) -> Option<f64> {
        self.yearly_totals
            .iter()
            .find(|t| t.year == year)
            .map(|t| t.disbursed)
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.first().copied()
    }
}
