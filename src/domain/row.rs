use itertools::Itertools;

/// One followed company captured from one target.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub address: String,
    pub raw_name: String,
    pub name: String,
    pub captured_on: String,
}

impl Row {
    pub fn new(address: &str, raw_name: String, captured_on: &str) -> Self {
        Row {
            address: address.to_string(),
            name: normalize_name(&raw_name),
            raw_name,
            captured_on: captured_on.to_string(),
        }
    }

    /// `[address, name, timestamp]`, the shape written to CSV and handed to the sheet.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.address.clone(),
            self.name.clone(),
            self.captured_on.clone(),
        ]
    }
}

/// Rows of a whole run, in target order then list order.
pub type RunResult = Vec<Row>;

/// First line of the rendered text, trimmed.
///
/// A row's name node often carries trailing badges on following lines,
/// e.g. `"Acme Corp\nFollowing"`.
pub fn normalize_name(raw: &str) -> String {
    raw.trim()
        .split('\n')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Rows as the sheet expects them: no blank names, one row per `(address, name)`.
pub fn clean_rows(rows: &[Row]) -> Vec<Vec<String>> {
    rows.iter()
        .filter(|row| !row.name.is_empty())
        .unique_by(|row| (row.address.clone(), row.name.clone()))
        .map(Row::to_record)
        .collect()
}
