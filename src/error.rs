use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The item selector matched nothing on first render, so the markup no
    /// longer matches the configured selectors. Aborts the whole run.
    #[error(
        "Item selector {selector:?} matches 0 elements on the first screen of {address}. \
         Re-inspect the page and update the item/name selectors."
    )]
    StaleSelectors { address: String, selector: String },

    #[error("Browser error on {address}: {source:#}")]
    Document {
        address: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to persist rows to {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sheet sink rejected rows: {0:#}")]
    Sink(#[source] anyhow::Error),
}

impl ScrapeError {
    pub fn document(address: &str, source: anyhow::Error) -> Self {
        ScrapeError::Document {
            address: address.to_string(),
            source,
        }
    }
}
