//! Scripted in-memory pages for exercising the scroll loop without a browser.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::anyhow;

use super::{Page, PageSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    /// Appears and disappears immediately after each scroll.
    Cycles,
    /// Never attaches.
    Never,
    /// Attaches and never goes away.
    Stuck,
}

#[derive(Default)]
struct Script {
    scrolls: usize,
    measured: Vec<usize>,
    detach_waits: usize,
    count_calls: usize,
}

/// `counts[k]` is the number of rendered rows after `k` scrolls; the last
/// entry repeats forever.
#[derive(Clone)]
pub struct FakePage {
    address: String,
    counts: Vec<usize>,
    names: Vec<String>,
    loader: Loader,
    fail_count_after: Option<usize>,
    script: Arc<Mutex<Script>>,
}

impl FakePage {
    pub fn growing(address: &str, counts: Vec<usize>) -> Self {
        FakePage {
            address: address.to_string(),
            counts,
            names: vec![],
            loader: Loader::Cycles,
            fail_count_after: None,
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    pub fn failing_count_after(mut self, calls: usize) -> Self {
        self.fail_count_after = Some(calls);
        self
    }

    pub fn scrolls(&self) -> usize {
        self.script.lock().unwrap().scrolls
    }

    pub fn detach_waits(&self) -> usize {
        self.script.lock().unwrap().detach_waits
    }

    pub fn measured_counts(&self) -> Vec<usize> {
        self.script.lock().unwrap().measured.clone()
    }

    fn current_count(&self, scrolls: usize) -> usize {
        let idx = scrolls.min(self.counts.len().saturating_sub(1));
        self.counts.get(idx).copied().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Page for FakePage {
    fn address(&self) -> &str {
        &self.address
    }

    async fn locate_scroll_container(&self, _item_selector: &str) -> anyhow::Result<Option<String>> {
        let scrolls = self.script.lock().unwrap().scrolls;
        Ok((self.current_count(scrolls) > 0).then(|| "scaffold-finite-scroll".to_string()))
    }

    async fn scroll_by_viewport(&self, _item_selector: &str) -> anyhow::Result<bool> {
        let mut script = self.script.lock().unwrap();
        let rendered = self.current_count(script.scrolls) > 0;
        script.scrolls += 1;
        Ok(rendered)
    }

    async fn count_matching(&self, _selector: &str) -> anyhow::Result<usize> {
        let mut script = self.script.lock().unwrap();
        if let Some(limit) = self.fail_count_after {
            if script.count_calls >= limit {
                return Err(anyhow!("session deleted because of page crash"));
            }
        }
        script.count_calls += 1;

        let count = self.current_count(script.scrolls);
        script.measured.push(count);
        Ok(count)
    }

    async fn wait_for_attached(&self, _selector: &str, timeout: Duration) -> anyhow::Result<bool> {
        match self.loader {
            Loader::Never => {
                tokio::time::sleep(timeout).await;
                Ok(false)
            }
            Loader::Cycles | Loader::Stuck => Ok(true),
        }
    }

    async fn wait_for_detached(&self, _selector: &str, timeout: Duration) -> anyhow::Result<bool> {
        self.script.lock().unwrap().detach_waits += 1;
        match self.loader {
            Loader::Stuck => {
                tokio::time::sleep(timeout).await;
                Ok(false)
            }
            Loader::Cycles | Loader::Never => Ok(true),
        }
    }

    async fn extract_texts(&self, _selector: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.names.clone())
    }
}

/// Hands out pre-built pages by address and records open/release calls.
#[derive(Default)]
pub struct FakeBrowser {
    pages: Vec<FakePage>,
    log: Mutex<Vec<String>>,
}

impl FakeBrowser {
    pub fn new(pages: Vec<FakePage>) -> Self {
        FakeBrowser {
            pages,
            log: Mutex::new(vec![]),
        }
    }

    /// `open <address>` / `release <address>` in call order.
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageSource for FakeBrowser {
    type Page = FakePage;

    async fn open(&self, address: &str) -> anyhow::Result<FakePage> {
        self.log.lock().unwrap().push(format!("open {}", address));
        self.pages
            .iter()
            .find(|page| page.address == address)
            .cloned()
            .ok_or_else(|| anyhow!("net::ERR_NAME_NOT_RESOLVED at {}", address))
    }

    async fn release(&self, page: FakePage) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("release {}", page.address));
        Ok(())
    }
}
