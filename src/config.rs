//! Static configuration of the dashboard

use std::error::Error;

use csscolorparser::Color;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::Url;

/// The backend that is used unless told otherwise
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// How many days back the default date window starts
pub const DEFAULT_DATE_RANGE: u32 = 7;

/// The longest default window a configuration may ask for (ten years)
pub const MAX_DATE_RANGE: u32 = 3660;

const DEFAULT_ROW_COLORS: &[&str] = &[
    "rgba(75, 192, 192, 0.7)",
    "rgba(255, 99, 132, 0.7)",
    "rgba(54, 162, 235, 0.7)",
    "rgba(255, 206, 86, 0.7)",
    "rgba(153, 102, 255, 0.7)",
    "rgba(255, 159, 64, 0.7)",
];

/// The palette grid rows cycle through
pub static DEFAULT_PALETTE: Lazy<Vec<Color>> = Lazy::new(|| {
    DEFAULT_ROW_COLORS.iter()
        .filter_map(|css| match csscolorparser::parse(css) {
            Ok(color) => Some(color),
            Err(err) => {
                log::warn!("Invalid default colour {}: {}", css, err);
                None
            },
        })
        .collect()
});


/// Everything the dashboard needs to know before it starts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the backend. `/api/users` and `/api/data` are resolved against it.
    pub api_base_url: Url,
    /// Colours of the grid rows, reused cyclically
    pub row_colors: Vec<Color>,
    /// Length (in days) of the window that is suggested when the dashboard starts
    pub default_date_range: u32,
}

impl Config {
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            ..Self::default()
        }
    }

    /// Check this configuration can be used
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.row_colors.is_empty() {
            return Err("The row colour palette must not be empty".into());
        }
        if self.default_date_range > MAX_DATE_RANGE {
            return Err(format!("The default date range must not exceed {} days (got {})", MAX_DATE_RANGE, self.default_date_range).into());
        }
        if self.api_base_url.cannot_be_a_base() {
            return Err(format!("{} cannot be used as a base URL", self.api_base_url).into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let api_base_url = match Url::parse(DEFAULT_API_BASE_URL) {
            Ok(url) => url,
            Err(err) => panic!("Invalid default URL {}: {}", DEFAULT_API_BASE_URL, err),
        };
        Self {
            api_base_url,
            row_colors: DEFAULT_PALETTE.clone(),
            default_date_range: DEFAULT_DATE_RANGE,
        }
    }
}
