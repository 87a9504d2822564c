use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::Client;
use serde::Serialize;

use crate::error::{Result, ScrapeError};

/// Downstream spreadsheet that receives the cleaned rows of a run.
#[async_trait::async_trait]
pub trait RowSink: Send + Sync {
    async fn push(&self, rows: &[Vec<String>]) -> anyhow::Result<()>;
}

#[derive(Serialize)]
struct PushBody<'a> {
    rows: &'a [Vec<String>],
}

/// Posts rows to a spreadsheet web app that appends and dedups them.
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(WebhookSink {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl RowSink for WebhookSink {
    async fn push(&self, rows: &[Vec<String>]) -> anyhow::Result<()> {
        let res = self
            .client
            .post(&self.url)
            .json(&PushBody { rows })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(anyhow!("status {}: {}", status.as_u16(), message));
        }

        Ok(())
    }
}

/// Used when no sheet is configured.
pub struct LogSink;

#[async_trait::async_trait]
impl RowSink for LogSink {
    async fn push(&self, rows: &[Vec<String>]) -> anyhow::Result<()> {
        log::info!("No sheet configured, skipping upload of {} rows", rows.len());
        Ok(())
    }
}

pub async fn push_to_sheet(sink: &dyn RowSink, rows: &[Vec<String>]) -> Result<()> {
    sink.push(rows).await.map_err(ScrapeError::Sink)?;
    log::info!("{} rows processed this run", rows.len());
    Ok(())
}
