use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

pub const DEFAULT_CONFIG_FILE: &str = "configuration.yaml";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub webdriver: WebDriverSettings,
    pub scroll: ScrollSettings,
    pub selectors: SelectorSettings,
    pub run: RunSettings,
    #[serde(default)]
    pub sheet: SheetSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct WebDriverSettings {
    pub url: String,
    pub headless: bool,
    /// Chrome profile holding an already logged-in session.
    pub user_data_dir: Option<PathBuf>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_load_timeout_ms: u64,
}

/// Knobs of the incremental list-materialization loop.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ScrollSettings {
    /// Consecutive iterations without a new row before the list counts as fully loaded.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub stall_limit: u32,
    /// Absolute cap on scroll triggers for one target.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_iterations: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub attach_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub detach_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle_delay_ms: u64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        ScrollSettings {
            stall_limit: 4,
            max_iterations: 300,
            attach_timeout_ms: 7_000,
            detach_timeout_ms: 7_000,
            settle_delay_ms: 500,
        }
    }
}

impl ScrollSettings {
    pub fn attach_timeout(&self) -> Duration {
        Duration::from_millis(self.attach_timeout_ms)
    }

    pub fn detach_timeout(&self) -> Duration {
        Duration::from_millis(self.detach_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SelectorSettings {
    /// One match per followed company row.
    pub item: String,
    /// Company name text node inside a row.
    pub name: String,
    pub loader: String,
    /// Present once the paged list has rendered at all.
    pub ready: String,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        SelectorSettings {
            item: "*[id^='profilePagedListComponent'][id*='-COMPANIES-INTERESTS']".to_string(),
            name: "*[id^='profilePagedListComponent'][id*='-COMPANIES-INTERESTS'] span:first-child"
                .to_string(),
            loader: "div.artdeco-loader".to_string(),
            ready: "*[id^='profilePagedListComponent']".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct RunSettings {
    pub handles_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub ready_timeout_ms: u64,
}

impl RunSettings {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct SheetSettings {
    pub webhook_url: Option<String>,
}

pub fn get_configuration(path: Option<PathBuf>) -> Result<Settings, config::ConfigError> {
    let scroll = ScrollSettings::default();
    let selectors = SelectorSettings::default();
    let file = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let settings = config::Config::builder()
        .set_default("webdriver.url", "http://localhost:4444")?
        .set_default("webdriver.headless", false)?
        .set_default("webdriver.page_load_timeout_ms", 70_000)?
        .set_default("scroll.stall_limit", scroll.stall_limit)?
        .set_default("scroll.max_iterations", scroll.max_iterations)?
        .set_default("scroll.attach_timeout_ms", scroll.attach_timeout_ms)?
        .set_default("scroll.detach_timeout_ms", scroll.detach_timeout_ms)?
        .set_default("scroll.settle_delay_ms", scroll.settle_delay_ms)?
        .set_default("selectors.item", selectors.item)?
        .set_default("selectors.name", selectors.name)?
        .set_default("selectors.loader", selectors.loader)?
        .set_default("selectors.ready", selectors.ready)?
        .set_default("run.handles_path", "handles.txt")?
        .set_default("run.output_path", "follow_scout.csv")?
        .set_default("run.ready_timeout_ms", 15_000)?
        .add_source(config::File::from(file).required(false))
        // E.g. `APP_SCROLL__STALL_LIMIT=6` sets `Settings.scroll.stall_limit`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
