use chrono::Local;

use crate::{
    configuration::Settings,
    domain::{
        row::{clean_rows, RunResult},
        target::{build_targets, load_handles, Target},
    },
    error::Result,
    services::{
        push_to_sheet, write_csv, Droid, FollowScraper, LogSink, PageSource, RowSink, Scroller,
        WebhookSink,
    },
};

pub struct RunOptions {
    pub push_to_sheet: bool,
}

pub async fn run(settings: Settings, options: RunOptions) -> anyhow::Result<()> {
    let handles = load_handles(&settings.run.handles_path)?;
    let targets = build_targets(&handles);
    if targets.is_empty() {
        log::warn!(
            "No profile handles in {}, nothing to do",
            settings.run.handles_path.display()
        );
        return Ok(());
    }
    log::info!("Scraping {} profiles", targets.len());

    let sink: Box<dyn RowSink> = match &settings.sheet.webhook_url {
        Some(url) if options.push_to_sheet => Box::new(WebhookSink::new(url)?),
        _ => Box::new(LogSink),
    };

    let captured_on = Local::now().format("%Y-%m-%d").to_string();

    let droid = Droid::new(&settings.webdriver).await?;
    let result = scrape_and_persist(&droid, &settings, &targets, &captured_on, sink.as_ref()).await;
    if let Err(e) = droid.quit().await {
        log::warn!("Failed to quit WebDriver session: {:?}", e);
    }

    result?;
    Ok(())
}

/// Scrape every target, then write the CSV and hand the cleaned rows to the sheet.
/// Nothing is persisted if any target fails.
pub async fn scrape_and_persist<S: PageSource>(
    source: &S,
    settings: &Settings,
    targets: &[Target],
    captured_on: &str,
    sink: &dyn RowSink,
) -> Result<RunResult> {
    let scroller = Scroller::new(settings.scroll.clone(), settings.selectors.clone());
    let scraper = FollowScraper::new(source, &scroller, &settings.run);

    let rows = scraper.scrape_all(targets, captured_on).await?;

    write_csv(&settings.run.output_path, &rows)?;

    let rows_for_sheet = clean_rows(&rows);
    push_to_sheet(sink, &rows_for_sheet).await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Mutex};

    use super::scrape_and_persist;
    use crate::{
        configuration::{
            RunSettings, ScrollSettings, SelectorSettings, Settings, SheetSettings,
            WebDriverSettings,
        },
        domain::target::Target,
        error::ScrapeError,
        services::{
            testing::{FakeBrowser, FakePage},
            RowSink,
        },
    };

    const TODAY: &str = "2026-10-19";

    #[derive(Default)]
    struct RecordingSink {
        pushed: Mutex<Option<Vec<Vec<String>>>>,
    }

    #[async_trait::async_trait]
    impl RowSink for RecordingSink {
        async fn push(&self, rows: &[Vec<String>]) -> anyhow::Result<()> {
            *self.pushed.lock().unwrap() = Some(rows.to_vec());
            Ok(())
        }
    }

    fn settings(output: &Path) -> Settings {
        Settings {
            webdriver: WebDriverSettings {
                url: "http://localhost:4444".to_string(),
                headless: true,
                user_data_dir: None,
                page_load_timeout_ms: 70_000,
            },
            scroll: ScrollSettings::default(),
            selectors: SelectorSettings::default(),
            run: RunSettings {
                handles_path: "handles.txt".into(),
                output_path: output.to_path_buf(),
                ready_timeout_ms: 15_000,
            },
            sheet: SheetSettings::default(),
        }
    }

    fn targets(addresses: &[&str]) -> Vec<Target> {
        addresses
            .iter()
            .map(|a| Target {
                address: a.to_string(),
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn csv_mirrors_rows_and_sheet_gets_cleaned_rows() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("follows.csv");
        let browser = FakeBrowser::new(vec![
            FakePage::growing("https://a", vec![3]).with_names(&["Acme\nFollowing", "Globex", "Acme"]),
            FakePage::growing("https://b", vec![1]).with_names(&["Acme"]),
        ]);
        let sink = RecordingSink::default();

        let rows = scrape_and_persist(
            &browser,
            &settings(&output),
            &targets(&["https://a", "https://b"]),
            TODAY,
            &sink,
        )
        .await
        .unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "https://a,Acme,2026-10-19\n\
             https://a,Globex,2026-10-19\n\
             https://a,Acme,2026-10-19\n\
             https://b,Acme,2026-10-19\n"
        );
        assert_eq!(
            sink.pushed.lock().unwrap().clone().unwrap(),
            vec![
                vec!["https://a", "Acme", TODAY],
                vec!["https://a", "Globex", TODAY],
                vec!["https://b", "Acme", TODAY],
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_selectors_persist_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("follows.csv");
        let browser = FakeBrowser::new(vec![
            FakePage::growing("https://a", vec![2]).with_names(&["A1", "A2"]),
            FakePage::growing("https://b", vec![0]),
            FakePage::growing("https://c", vec![1]).with_names(&["C1"]),
        ]);
        let sink = RecordingSink::default();

        let err = scrape_and_persist(
            &browser,
            &settings(&output),
            &targets(&["https://a", "https://b", "https://c"]),
            TODAY,
            &sink,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ScrapeError::StaleSelectors { .. }));
        assert!(!output.exists());
        assert!(sink.pushed.lock().unwrap().is_none());
        assert!(!browser.calls().contains(&"open https://c".to_string()));
    }
}
