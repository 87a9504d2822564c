use std::time::Duration;

use anyhow::Context;
use thirtyfour::{
    prelude::*, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver, WindowHandle,
};

use crate::{
    configuration::WebDriverSettings,
    services::{Page, PageSource},
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

// Walks up from the first row to the nearest ancestor that actually scrolls.
const FIND_SCROLL_BOX: &str = r#"
function findScrollBox(selector) {
    const firstRow = document.querySelector(selector);
    if (!firstRow) return null;
    let el = firstRow;
    while (el && el !== document.documentElement) {
        const st = window.getComputedStyle(el);
        if ((st.overflowY === 'auto' || st.overflowY === 'scroll') &&
            el.scrollHeight > el.clientHeight) return el;
        el = el.parentElement;
    }
    return document.scrollingElement;
}
"#;

const SCROLL_SCRIPT: &str = r#"
const box = findScrollBox(arguments[0]);
if (!box) return false;
box.scrollBy({ top: box.clientHeight, behavior: 'instant' });
return true;
"#;

const DESCRIBE_SCRIPT: &str = r#"
const box = findScrollBox(arguments[0]);
if (!box) return null;
if (box === document.scrollingElement) return 'document';
return box.className || box.id || '<<anonymous>>';
"#;

const INNER_TEXTS_SCRIPT: &str = r#"
return Array.from(document.querySelectorAll(arguments[0])).map(el => el.innerText || '');
"#;

/// A WebDriver session; every target gets its own tab.
pub struct Droid {
    pub driver: WebDriver,
    home: WindowHandle,
}

impl Droid {
    pub async fn new(settings: &WebDriverSettings) -> anyhow::Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if settings.headless {
            caps.set_headless()?;
        }
        if let Some(profile) = &settings.user_data_dir {
            caps.add_arg(&format!("--user-data-dir={}", profile.display()))?;
        }

        let driver = WebDriver::new(&settings.url, caps)
            .await
            .with_context(|| format!("Failed to start a WebDriver session at {}", settings.url))?;
        driver
            .set_page_load_timeout(Duration::from_millis(settings.page_load_timeout_ms))
            .await?;
        if !settings.headless {
            driver.maximize_window().await?;
        }
        let home = driver.window().await?;

        Ok(Droid { driver, home })
    }

    pub async fn quit(self) -> anyhow::Result<()> {
        self.driver.quit().await?;
        Ok(())
    }

    async fn close_tab(&self, handle: WindowHandle) -> WebDriverResult<()> {
        self.driver.switch_to_window(handle).await?;
        self.driver.close_window().await?;
        self.driver.switch_to_window(self.home.clone()).await
    }
}

/// Await `undo` when `step` failed, then hand back the step's error.
/// A failing `undo` is only logged.
async fn undo_on_err<T, E, U, F>(step: Result<T, E>, undo: F, address: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
    U: std::fmt::Debug,
    F: std::future::Future<Output = Result<(), U>>,
{
    match step {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Err(undo_err) = undo.await {
                log::warn!("Failed to close tab for {}: {:?}", address, undo_err);
            }
            Err(e).with_context(|| format!("Failed to load {}", address))
        }
    }
}

pub struct DroidTab {
    driver: WebDriver,
    handle: WindowHandle,
    address: String,
}

impl DroidTab {
    async fn run_script(&self, body: &str, selector: &str) -> WebDriverResult<serde_json::Value> {
        let script = format!("{}\n{}", FIND_SCROLL_BOX, body);
        let ret = self
            .driver
            .execute(script, vec![serde_json::Value::String(selector.to_string())])
            .await?;
        Ok(ret.json().clone())
    }
}

#[async_trait::async_trait]
impl PageSource for Droid {
    type Page = DroidTab;

    async fn open(&self, address: &str) -> anyhow::Result<DroidTab> {
        let handle = self.driver.new_tab().await?;

        let loaded = async {
            self.driver.switch_to_window(handle.clone()).await?;
            self.driver.goto(address).await
        }
        .await;
        undo_on_err(loaded, self.close_tab(handle.clone()), address).await?;

        Ok(DroidTab {
            driver: self.driver.clone(),
            handle,
            address: address.to_string(),
        })
    }

    async fn release(&self, page: DroidTab) -> anyhow::Result<()> {
        self.close_tab(page.handle)
            .await
            .with_context(|| format!("Failed to close tab for {}", page.address))
    }
}

#[async_trait::async_trait]
impl Page for DroidTab {
    fn address(&self) -> &str {
        &self.address
    }

    async fn locate_scroll_container(&self, item_selector: &str) -> anyhow::Result<Option<String>> {
        let ret = self.run_script(DESCRIBE_SCRIPT, item_selector).await?;
        Ok(ret.as_str().map(str::to_string))
    }

    async fn scroll_by_viewport(&self, item_selector: &str) -> anyhow::Result<bool> {
        let ret = self.run_script(SCROLL_SCRIPT, item_selector).await?;
        Ok(ret.as_bool().unwrap_or(false))
    }

    async fn count_matching(&self, selector: &str) -> anyhow::Result<usize> {
        let elements = self.driver.find_all(By::Css(selector)).await?;
        Ok(elements.len())
    }

    async fn wait_for_attached(&self, selector: &str, timeout: Duration) -> anyhow::Result<bool> {
        let attached = self
            .driver
            .query(By::Css(selector))
            .wait(timeout, POLL_INTERVAL)
            .exists()
            .await?;
        Ok(attached)
    }

    async fn wait_for_detached(&self, selector: &str, timeout: Duration) -> anyhow::Result<bool> {
        let detached = self
            .driver
            .query(By::Css(selector))
            .wait(timeout, POLL_INTERVAL)
            .not_exists()
            .await?;
        Ok(detached)
    }

    async fn extract_texts(&self, selector: &str) -> anyhow::Result<Vec<String>> {
        let ret = self
            .driver
            .execute(
                INNER_TEXTS_SCRIPT,
                vec![serde_json::Value::String(selector.to_string())],
            )
            .await?;
        let texts: Vec<String> = ret.convert()?;
        Ok(texts)
    }
}
