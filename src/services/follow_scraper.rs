use crate::{
    configuration::RunSettings,
    domain::{
        row::{Row, RunResult},
        scroll_state::LoopExit,
        target::Target,
    },
    error::{Result, ScrapeError},
    services::{Page, PageSource, Scroller},
};

/// Collects the "Companies followed" list of every target, one page at a time.
pub struct FollowScraper<'a, S: PageSource> {
    source: &'a S,
    scroller: &'a Scroller,
    run: &'a RunSettings,
}

impl<'a, S: PageSource> FollowScraper<'a, S> {
    pub fn new(source: &'a S, scroller: &'a Scroller, run: &'a RunSettings) -> Self {
        FollowScraper {
            source,
            scroller,
            run,
        }
    }

    /// Scrape targets in order. Stops at the first error; stale selectors on
    /// any target abort the whole run.
    pub async fn scrape_all(&self, targets: &[Target], captured_on: &str) -> Result<RunResult> {
        let mut all_rows: RunResult = vec![];

        for target in targets {
            let rows = self.scrape_target(target, captured_on).await?;
            log::info!("{}  -> scraped {} names", target.address, rows.len());
            all_rows.extend(rows);
        }

        Ok(all_rows)
    }

    /// The page is released on every path before this returns.
    pub async fn scrape_target(&self, target: &Target, captured_on: &str) -> Result<Vec<Row>> {
        let page = self
            .source
            .open(&target.address)
            .await
            .map_err(|e| ScrapeError::document(&target.address, e))?;

        let result = self.collect(&page, captured_on).await;

        if let Err(e) = self.source.release(page).await {
            log::warn!("Failed to close page for {}: {:?}", target.address, e);
        }

        result
    }

    async fn collect(&self, page: &S::Page, captured_on: &str) -> Result<Vec<Row>> {
        let address = page.address().to_string();
        let selectors = self.scroller.selectors();
        let document_err = |e: anyhow::Error| ScrapeError::document(&address, e);

        let ready = page
            .wait_for_attached(&selectors.ready, self.run.ready_timeout())
            .await
            .map_err(document_err)?;
        if !ready {
            log::warn!("Paged list never attached on {}", address);
        }

        let first_batch = page
            .count_matching(&selectors.item)
            .await
            .map_err(document_err)?;
        log::info!("Rows visible immediately: {}", first_batch);

        if first_batch == 0 {
            log::error!("Item selector matches 0 elements on {}", address);
            return Err(ScrapeError::StaleSelectors {
                address: address.clone(),
                selector: selectors.item.clone(),
            });
        }

        match page.locate_scroll_container(&selectors.item).await {
            Ok(Some(container)) => log::info!("Scroll container found: {}", container),
            Ok(None) => log::info!("Scroll container found: document"),
            Err(e) => log::debug!("Could not describe scroll container: {:?}", e),
        }

        let outcome = self.scroller.load_everything_from(page, first_batch).await?;
        if outcome.exit == LoopExit::Capped {
            log::warn!("Extracting a possibly partial list for {}", address);
        }

        let names = page
            .extract_texts(&selectors.name)
            .await
            .map_err(document_err)?;

        Ok(names
            .into_iter()
            .map(|raw| Row::new(&address, raw, captured_on))
            .collect())
    }
}
