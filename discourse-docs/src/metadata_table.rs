//! Metadata tables embedded in the index topic
//!
//! Sections such as "URLs", "Metadata" or "Takeovers" hold a table whose
//! first row names the columns. Each following row becomes a
//! [`MetadataRecord`]. Problems with individual rows never fail the parse;
//! they are reported as warning strings alongside the records.

use crate::html;
use crate::section;
use kuchikiki::NodeRef;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Columns that hide an entry when left empty
const REQUIRED_COLUMNS: [&str; 2] = ["path", "type"];

/// One row of a metadata table
///
/// Column names are normalized (see [`normalize_column`]) and kept in table
/// order. Values are the serialized inner HTML of each cell, so inline markup
/// such as links or emphasis survives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Visible text of the link found in the row, if any
    topic_name: Option<String>,

    /// Target of the link found in the row, if any
    topic_link: Option<String>,

    /// Column name to cell HTML, in column order
    fields: Vec<(String, String)>,
}

impl MetadataRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible text of the row's link
    pub fn topic_name(&self) -> Option<&str> {
        self.topic_name.as_deref()
    }

    /// Target of the row's link
    pub fn topic_link(&self) -> Option<&str> {
        self.topic_link.as_deref()
    }

    /// Value of a column
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Set a column, overwriting an existing value in place or appending a new column
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Overwrite fields with `values`, keeping the order of existing columns
    pub fn merge<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (column, value) in values {
            self.set(column, value);
        }
    }

    /// All columns in table order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The `path` column, `None` when absent or blank (a hidden entry)
    pub fn path(&self) -> Option<&str> {
        self.non_blank("path")
    }

    /// The `type` column, `None` when absent or blank
    pub fn kind(&self) -> Option<&str> {
        self.non_blank("type")
    }

    /// Comma-separated `tags` column, trimmed, blanks dropped
    pub fn tags(&self) -> Vec<&str> {
        self.get("tags")
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether this record shares at least one tag with `tags`
    pub fn shares_tag_with(&self, tags: &[&str]) -> bool {
        self.tags().iter().any(|tag| tags.contains(tag))
    }

    /// Whether the `active` column explicitly disables this entry
    pub fn is_inactive(&self) -> bool {
        self.get("active").map(str::trim) == Some("false")
    }

    fn non_blank(&self, column: &str) -> Option<&str> {
        self.get(column)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(ref name) = self.topic_name {
            if self.get("topic_name").is_none() {
                map.serialize_entry("topic_name", name)?;
            }
        }
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Normalize a column header: lower-case, whitespace and hyphens become `_`
///
/// "Topic Name" -> "topic_name", "Last-Updated" -> "last_updated"
pub fn normalize_column(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect()
}

/// Parse the first table in the section headed `section_label`
///
/// # Parameters
/// * `html` - The index topic HTML
/// * `section_label` - Heading text of the section holding the table
///
/// # Returns
/// * `(records, errors)` - One record per kept row, in row order, and every
///   row problem in the order it was found. A missing section or table
///   yields two empty lists.
pub fn parse_metadata_table(
    html: &str,
    section_label: &str,
) -> (Vec<MetadataRecord>, Vec<String>) {
    let body = html::parse_fragment(html);

    let Some(nodes) = section::section_nodes(&body, section_label) else {
        log::debug!("No \"{}\" section found", section_label);
        return (Vec::new(), Vec::new());
    };

    let table = nodes
        .iter()
        .flat_map(|node| node.inclusive_descendants())
        .find(|node| html::is_element(node, "table"));

    match table {
        Some(table) => parse_table(&table),
        None => {
            log::debug!("Section \"{}\" contains no table", section_label);
            (Vec::new(), Vec::new())
        }
    }
}

/// Parse a `<table>` element into records
pub(crate) fn parse_table(table: &NodeRef) -> (Vec<MetadataRecord>, Vec<String>) {
    let rows: Vec<NodeRef> = table
        .descendants()
        .filter(|node| html::is_element(node, "tr"))
        .collect();

    let columns: Vec<String> = rows
        .iter()
        .map(|row| html::child_elements(row, "th"))
        .find(|headers| !headers.is_empty())
        .map(|headers| {
            headers
                .iter()
                .map(|th| normalize_column(&th.text_contents()))
                .collect()
        })
        .unwrap_or_default();

    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut row_number = 0;

    for row in &rows {
        let cells = html::child_elements(row, "td");
        if cells.is_empty() {
            continue;
        }
        row_number += 1;

        if cells.len() > columns.len() {
            log::debug!(
                "Row {} has {} cells but only {} columns; extra cells ignored",
                row_number,
                cells.len(),
                columns.len()
            );
        }

        if let Some(record) = parse_row(&columns, &cells, row_number, &mut errors) {
            records.push(record);
        }
    }

    (records, errors)
}

/// Parse one data row; `None` means the row had a hard error and is dropped
fn parse_row(
    columns: &[String],
    cells: &[NodeRef],
    row_number: usize,
    errors: &mut Vec<String>,
) -> Option<MetadataRecord> {
    let mut record = MetadataRecord::new();

    for (column, cell) in columns.iter().zip(cells) {
        let mut value = html::inner_html(cell);

        if let Some(link) = html::first_descendant(cell, "a") {
            let text = link.text_contents();
            let href = html::attribute(&link, "href");
            if record.topic_name.is_none() {
                record.topic_name = Some(text.clone());
            }

            if href.as_deref() != Some(text.as_str()) {
                errors.push(format!(
                    "Warning: row {} \"{}\" {} contains an error: the link target must equal the link text. This entry has been skipped.",
                    row_number, text, column
                ));
                return None;
            }

            // The first link in the row is the topic
            if record.topic_link.is_none() {
                record.topic_link = href;
            }
            value = text;
        }

        if REQUIRED_COLUMNS.contains(&column.as_str()) && cell.text_contents().trim().is_empty() {
            errors.push(format!(
                "Warning: row {} \"{}\" {} is missing. This entry is treated as hidden.",
                row_number,
                record.topic_name().unwrap_or_default(),
                column
            ));
        }

        record.set(column.as_str(), value);
    }

    Some(record)
}
