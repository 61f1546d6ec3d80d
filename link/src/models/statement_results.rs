use serde::{Deserialize, Serialize};

use super::operation::Operation;
use super::wire_item::WireItem;

/// One changelog entry of a results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Change kind (0 = insert, 1 = update-before, 2 = update-after, 3 = delete)
    #[serde(default = "default_op")]
    pub op: Operation,

    /// Column payloads in schema order
    #[serde(default)]
    pub row: Vec<WireItem>,
}

fn default_op() -> Operation {
    Operation::Insert
}

impl ResultItem {
    pub fn new(op: Operation, row: Vec<WireItem>) -> Self {
        Self { op, row }
    }

    pub fn insert(row: Vec<WireItem>) -> Self {
        Self::new(Operation::Insert, row)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    #[serde(default)]
    pub data: Vec<ResultItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsMetadata {
    /// URL of the next page; absent or empty when there is none yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// One page of statement results
///
/// # Example JSON
///
/// ```json
/// {
///   "results": {"data": [{"op": 0, "row": ["1", ["a", "b"], null]}]},
///   "metadata": {"next": "https://gateway/statements/s1/results?page_token=eyJ"}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementResults {
    #[serde(default)]
    pub results: ResultData,

    #[serde(default)]
    pub metadata: ResultsMetadata,
}

impl StatementResults {
    pub fn items(&self) -> &[ResultItem] {
        &self.results.data
    }

    pub fn into_items(self) -> Vec<ResultItem> {
        self.results.data
    }

    /// Token for the following page, taken from the `page_token` query
    /// parameter of `metadata.next`.
    pub fn next_page_token(&self) -> Option<String> {
        let next = self.metadata.next.as_deref()?.trim();
        if next.is_empty() {
            return None;
        }
        extract_page_token(next)
    }
}

/// Pull the `page_token` parameter out of a next-page URL.
///
/// Relative URLs are accepted; a bare token without any query string is
/// returned as is.
pub fn extract_page_token(next: &str) -> Option<String> {
    let url = if next.contains("://") {
        reqwest::Url::parse(next).ok()
    } else if next.contains('?') || next.starts_with('/') {
        reqwest::Url::parse("http://gateway.invalid")
            .ok()
            .and_then(|base| base.join(next).ok())
    } else {
        return Some(next.to_string());
    };

    url?.query_pairs()
        .find(|(key, _)| key == "page_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}
