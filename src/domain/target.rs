use std::path::Path;

use anyhow::Context;
use url::Url;

const PROFILE_BASE_URL: &str = "https://www.linkedin.com/in/";
const COMPANIES_TAB: &str = "details/interests/";
const COMPANIES_TAB_INDEX: &str = "1";

/// A single profile page to scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub address: String,
}

/// Read profile handles, one per line. Blank lines and `#` comments are skipped.
pub fn load_handles(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read handles file {}", path.display()))?;

    Ok(parse_handles(&content))
}

pub fn parse_handles(content: &str) -> Vec<String> {
    let mut handles: Vec<String> = vec![];

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let handle = extract_handle(line);
        if !handles.contains(&handle) {
            handles.push(handle);
        }
    }

    handles
}

/// Accepts a bare handle or a full profile url.
fn extract_handle(line: &str) -> String {
    match Url::parse(line) {
        Ok(url) => {
            let mut segments = url.path_segments().into_iter().flatten();
            match (segments.next(), segments.next()) {
                (Some("in"), Some(handle)) if !handle.is_empty() => handle.to_string(),
                _ => line.to_string(),
            }
        }
        Err(_) => line.trim_matches('/').to_string(),
    }
}

pub fn build_targets(handles: &[String]) -> Vec<Target> {
    handles
        .iter()
        .filter_map(|handle| match build_companies_url(handle) {
            Some(url) => Some(Target {
                address: url.to_string(),
            }),
            None => {
                log::warn!("Skipping invalid profile handle: {:?}", handle);
                None
            }
        })
        .collect()
}

fn build_companies_url(handle: &str) -> Option<Url> {
    if handle.is_empty() || handle.contains(['/', '?', '#']) || handle.contains(char::is_whitespace)
    {
        return None;
    }

    let mut url = Url::parse(PROFILE_BASE_URL).ok()?;
    url = url.join(&format!("{}/", handle)).ok()?.join(COMPANIES_TAB).ok()?;
    url.query_pairs_mut()
        .append_pair("detailScreenTabIndex", COMPANIES_TAB_INDEX);

    Some(url)
}
