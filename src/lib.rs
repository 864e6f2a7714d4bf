// Disbursement Visualizer - Core Library
// Exposes the load → aggregate → figure → page pipeline for the CLI, web server, and tests

pub mod dataset;
pub mod aggregate;
pub mod figure;
pub mod page;
pub mod dashboard;
pub mod config;

// Only compile the HTTP layer when the server feature is enabled
#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use dataset::{
    Dataset, DatasetError, Record,
    load_csv, REQUIRED_COLUMNS,
};
pub use aggregate::{
    Aggregates, ColorRange, YearlyTotal,
    yearly_totals, years, records_for_year, max_abs_deviation, max_disbursed,
};
pub use figure::{
    Figure, Frame, MapStyle, Trace,
    map_figure, line_figure, build_frames, MARKER_SIZE_SCALE,
};
pub use page::{PageContent, render_page};
pub use dashboard::Dashboard;
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
