//! Request targets for the engine's REST endpoints.
//!
//! Targets are assembled with plain string formatting and never pass through
//! a URL parser, so document ids such as `http://site/a/../b?q=1` reach the
//! engine exactly as written.

use crate::error::{Error, Result};

/// Multi-get endpoint. Index and type travel in the body.
pub const MGET_PATH: &str = "/_mget";

/// `/<index>/<type>/<id>`, with every component emitted literally.
pub fn document_path(index: &str, doc_type: &str, id: &str) -> String {
    format!("/{}/{}/{}", index, doc_type, id)
}

/// `/<index>/<type>/_search`, or `/<index>/_search` when `doc_type` is empty.
pub fn search_path(index: &str, doc_type: &str) -> String {
    if doc_type.is_empty() {
        format!("/{}/_search", index)
    } else {
        format!("/{}/{}/_search", index, doc_type)
    }
}

/// `/<name>` for an index or alias.
pub fn index_path(index_or_alias: &str) -> Result<String> {
    if index_or_alias.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "Index or alias name can not be blank".to_string(),
        ));
    }

    Ok(format!("/{}", index_or_alias))
}
