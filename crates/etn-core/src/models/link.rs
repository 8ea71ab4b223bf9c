use serde::{Deserialize, Serialize};

use crate::constants::VIEW_QUERY_PARAM;

/// Link resolving to a shared image: `<base_url>?view=<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareableLink {
    pub id: String,
    pub url: String,
}

impl ShareableLink {
    /// Build the link for a store-assigned id. The id is appended verbatim.
    pub fn new(base_url: &str, id: impl Into<String>) -> Self {
        let id = id.into();
        let separator = if base_url.contains('?') { '&' } else { '?' };
        let url = format!("{}{}{}={}", base_url, separator, VIEW_QUERY_PARAM, id);
        Self { id, url }
    }

    /// Extract the `view` id from a full link or a bare query string.
    ///
    /// The parameter name is matched case-sensitively and only its first
    /// occurrence counts. Absent and empty values yield `None`.
    pub fn view_id(url_or_query: &str) -> Option<String> {
        let query = match url_or_query.split_once('?') {
            Some((_, query)) => query,
            None => url_or_query,
        };
        let query = query.split('#').next().unwrap_or_default();

        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(key, _)| decode_component(key) == VIEW_QUERY_PARAM)
            .map(|(_, value)| decode_component(value))
            .filter(|value| !value.is_empty())
    }

    /// The link with its query and fragment removed, leaving the viewer.
    pub fn strip_view(url: &str) -> &str {
        url.split(['?', '#']).next().unwrap_or(url)
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
