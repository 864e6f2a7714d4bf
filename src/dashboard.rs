// Run-once pipeline: aggregate → figures → page
// The result is read-only and shared by every request

use crate::aggregate::Aggregates;
use crate::config::Config;
use crate::dataset::Dataset;
use crate::figure::{line_figure, map_figure, Figure};
use crate::page::render_page;
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub aggregates: Aggregates,
    pub map_figure: Figure,
    pub line_figure: Figure,
    pub html: String,
}

impl Dashboard {
    pub fn build(dataset: &Dataset, config: &Config) -> Result<Self> {
        let records = dataset.records();

        let aggregates = Aggregates::compute(records);
        info!(
            years = aggregates.years.len(),
            color_max = aggregates.color_range.max,
            max_disbursed = aggregates.max_disbursed,
            "aggregated dataset"
        );

        let map_figure = map_figure(records, &aggregates, &config.map_style);
        let line_figure = line_figure(&aggregates);
        info!(frames = map_figure.frames.len(), "built figures");

        let html = render_page(&config.page, &map_figure, &line_figure)
            .context("Failed to render dashboard page")?;

        Ok(Dashboard {
            aggregates,
            map_figure,
            line_figure,
            html,
        })
    }
}
