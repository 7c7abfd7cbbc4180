use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Id of the optional `<script type="application/json">` element holding page overrides.
pub const CONFIG_ELEMENT_ID: &str = "genrefy-config";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_toggle_endpoint")]
    pub toggle_endpoint: String,
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
    #[serde(default = "default_search_input_selector")]
    pub search_input_selector: String,
    #[serde(default = "default_results_selector")]
    pub results_selector: String,
    #[serde(default = "default_count_selector")]
    pub count_selector: String,
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: f64,
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u32,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            toggle_endpoint: default_toggle_endpoint(),
            csrf_cookie: default_csrf_cookie(),
            debounce_ms: default_debounce_ms(),
            min_query_chars: default_min_query_chars(),
            search_input_selector: default_search_input_selector(),
            results_selector: default_results_selector(),
            count_selector: default_count_selector(),
            mobile_breakpoint: default_mobile_breakpoint(),
            toast_ms: default_toast_ms(),
            accent_color: default_accent_color(),
            debug: false,
        }
    }
}

fn default_toggle_endpoint() -> String {
    "/toggle_favorite/".to_string()
}

fn default_csrf_cookie() -> String {
    "csrftoken".to_string()
}

fn default_debounce_ms() -> u32 {
    500
}

fn default_min_query_chars() -> usize {
    2
}

fn default_search_input_selector() -> String {
    "form.genre-search-form input[name=\"search\"]".to_string()
}

fn default_results_selector() -> String {
    ".search-results".to_string()
}

fn default_count_selector() -> String {
    ".results-count".to_string()
}

fn default_mobile_breakpoint() -> f64 {
    768.0
}

fn default_toast_ms() -> u32 {
    3000
}

fn default_accent_color() -> String {
    "#db221b".to_string()
}

impl Config {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reads overrides from the page, falling back to defaults when the element is absent or invalid.
    pub fn load() -> Self {
        let raw = crate::utils::document()
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content());

        match raw {
            Some(raw) => Self::parse(&raw).unwrap_or_else(|e| {
                error!("{}, using defaults", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn log_level(&self) -> log::Level {
        if self.debug {
            log::Level::Debug
        } else {
            log::Level::Info
        }
    }
}
