use crate::{
    configuration::{ScrollSettings, SelectorSettings},
    domain::scroll_state::{LoopExit, LoopOutcome, Progress, ScrollState},
    error::{Result, ScrapeError},
    services::Page,
};

/// Scrolls a virtualized list until it stops growing.
pub struct Scroller {
    settings: ScrollSettings,
    selectors: SelectorSettings,
}

impl Scroller {
    pub fn new(settings: ScrollSettings, selectors: SelectorSettings) -> Self {
        Scroller {
            settings,
            selectors,
        }
    }

    pub fn selectors(&self) -> &SelectorSettings {
        &self.selectors
    }

    /// Run the loop from scratch: the first measurement is always progress.
    pub async fn load_everything<P: Page + ?Sized>(&self, page: &P) -> Result<LoopOutcome> {
        self.run(page, ScrollState::new()).await
    }

    /// Run the loop with a count already measured before the first scroll.
    pub async fn load_everything_from<P: Page + ?Sized>(
        &self,
        page: &P,
        baseline: usize,
    ) -> Result<LoopOutcome> {
        self.run(page, ScrollState::with_baseline(baseline)).await
    }

    async fn run<P: Page + ?Sized>(&self, page: &P, mut state: ScrollState) -> Result<LoopOutcome> {
        let stall_limit = self.settings.stall_limit.max(1);

        while state.iteration < self.settings.max_iterations {
            self.trigger(page).await?;
            self.settle(page).await?;
            self.measure(page, &mut state).await?;
            state.iteration += 1;

            if state.stall_count >= stall_limit {
                log::info!(
                    "No new rows after {} tries on {}, stopping at {} rows",
                    stall_limit,
                    page.address(),
                    state.last_count.unwrap_or_default()
                );
                return Ok(LoopOutcome {
                    exit: LoopExit::Stalled,
                    state,
                });
            }
        }

        log::warn!(
            "Gave up on {} after {} scrolls with {} rows, list may be incomplete",
            page.address(),
            state.iteration,
            state.last_count.unwrap_or_default()
        );
        Ok(LoopOutcome {
            exit: LoopExit::Capped,
            state,
        })
    }

    async fn trigger<P: Page + ?Sized>(&self, page: &P) -> Result<()> {
        let scrolled = page
            .scroll_by_viewport(&self.selectors.item)
            .await
            .map_err(|e| ScrapeError::document(page.address(), e))?;

        if !scrolled {
            log::debug!("Nothing to scroll yet on {}", page.address());
        }

        Ok(())
    }

    /// Wait for the loading indicator to come and go. Timeouts are not errors.
    async fn settle<P: Page + ?Sized>(&self, page: &P) -> Result<()> {
        let loader = &self.selectors.loader;

        let attached = page
            .wait_for_attached(loader, self.settings.attach_timeout())
            .await
            .map_err(|e| ScrapeError::document(page.address(), e))?;

        if attached {
            let detached = page
                .wait_for_detached(loader, self.settings.detach_timeout())
                .await
                .map_err(|e| ScrapeError::document(page.address(), e))?;

            if !detached {
                log::debug!("Loading indicator still attached on {}, moving on", page.address());
            }
        } else {
            log::debug!("No loading indicator on {}", page.address());
        }

        tokio::time::sleep(self.settings.settle_delay()).await;

        Ok(())
    }

    async fn measure<P: Page + ?Sized>(&self, page: &P, state: &mut ScrollState) -> Result<Progress> {
        let count = page
            .count_matching(&self.selectors.item)
            .await
            .map_err(|e| ScrapeError::document(page.address(), e))?;

        let progress = state.observe(count);
        match progress {
            Progress::Grew {
                from: Some(from),
                to,
            } if to < from => {
                log::warn!("Row count on {} shrank from {} to {}", page.address(), from, to);
            }
            Progress::Grew { to, .. } => log::info!("Rows collected: {}", to),
            Progress::Stalled { stall_count, .. } => {
                log::debug!("No new rows ({}/{})", stall_count, self.settings.stall_limit)
            }
        }

        Ok(progress)
    }
}
