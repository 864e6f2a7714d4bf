// Startup configuration
// Defaults reproduce the stock dashboard; the only override is the CSV path

use crate::figure::MapStyle;
use crate::page::PageContent;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_CSV_PATH: &str = "plot.csv";
pub const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 8050);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub csv_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub page: PageContent,
    pub map_style: MapStyle,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            page: PageContent::default(),
            map_style: MapStyle::default(),
        }
    }
}

impl Config {
    /// Build from process arguments (program name first).
    /// An optional positional argument replaces the CSV path.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Config::default();
        if let Some(path) = args.into_iter().map(Into::into).nth(1) {
            config.csv_path = PathBuf::from(path);
        }
        config
    }
}
