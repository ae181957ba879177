// ── Search filtering ──
//
// Case-insensitive substring search over a row's visible text columns.
// A row matches when any column contains the query.

use crate::model::{Client, VhdImage};

/// A row that can be matched against a search query.
pub trait Searchable {
    /// The column texts searched, in display order.
    fn search_fields(&self) -> Vec<&str>;

    /// Whether any column contains `query_lower` (already lowercased).
    fn matches(&self, query_lower: &str) -> bool {
        query_lower.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|f| f.to_lowercase().contains(query_lower))
    }
}

/// Clients are searched by name, MAC address and IP.
impl Searchable for Client {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.mac_address.as_str(),
            self.ip_display(),
        ]
    }
}

/// Images are searched by name, description and Windows version.
impl Searchable for VhdImage {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.description.as_deref().unwrap_or(""),
            self.windows_version.as_deref().unwrap_or(""),
        ]
    }
}

/// Indices of the rows matching `query`, in their original order.
pub fn visible_indices<T: Searchable>(rows: &[T], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.matches(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// Rows matching `query`, in their original order.
pub fn filter<'a, T: Searchable>(rows: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    rows.iter().filter(|row| row.matches(&needle)).collect()
}
