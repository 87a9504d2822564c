use std::time::Duration;

/// What the scroll loop needs from a rendered document.
///
/// Implemented over a WebDriver tab by [`super::Droid`]; the loop itself never
/// touches the browser directly.
#[async_trait::async_trait]
pub trait Page: Send + Sync {
    fn address(&self) -> &str;

    /// Describe the scrollable ancestor of the first `item_selector` match,
    /// `None` if there is no match yet.
    async fn locate_scroll_container(&self, item_selector: &str) -> anyhow::Result<Option<String>>;

    /// Jump the scroll container down by one client height.
    /// Returns `false` (and does nothing) when no item is rendered.
    async fn scroll_by_viewport(&self, item_selector: &str) -> anyhow::Result<bool>;

    async fn count_matching(&self, selector: &str) -> anyhow::Result<usize>;

    /// `Ok(false)` on timeout.
    async fn wait_for_attached(&self, selector: &str, timeout: Duration) -> anyhow::Result<bool>;

    /// `Ok(false)` on timeout.
    async fn wait_for_detached(&self, selector: &str, timeout: Duration) -> anyhow::Result<bool>;

    /// Rendered text of every match, in document order.
    async fn extract_texts(&self, selector: &str) -> anyhow::Result<Vec<String>>;
}

/// Opens one page per target and releases it afterwards.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    type Page: Page;

    async fn open(&self, address: &str) -> anyhow::Result<Self::Page>;

    async fn release(&self, page: Self::Page) -> anyhow::Result<()>;
}
