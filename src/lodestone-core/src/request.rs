//! Builds the wire request for each operation.

use http::Method;
use serde::Serialize;
use serde_json::json;

use crate::error::Result;
use crate::models::{
    GetDocumentRequest, MGetDocumentsRequest, PutDocumentRequest, SearchRequest,
    SimpleSearchRequest,
};
use crate::path;
use crate::transport::TransportRequest;

/// Fields a keyword search matches against. Searches over other fields use
/// a raw [`SearchRequest`].
pub const DEFAULT_SEARCH_FIELDS: [&str; 4] = ["title", "description", "displayUrl", "metaKeywords"];

pub fn get_document(host: &str, req: &GetDocumentRequest) -> TransportRequest {
    TransportRequest::new(
        Method::GET,
        host,
        path::document_path(&req.index, &req.doc_type, &req.id),
    )
}

pub fn mget_documents(host: &str, req: &MGetDocumentsRequest) -> Result<TransportRequest> {
    let body = serde_json::to_vec(req)?;
    Ok(TransportRequest::new(Method::POST, host, path::MGET_PATH).with_json_body(body))
}

pub fn put_document<D: Serialize>(
    host: &str,
    req: &PutDocumentRequest<D>,
) -> Result<TransportRequest> {
    let body = serde_json::to_vec(&req.doc)?;
    Ok(TransportRequest::new(
        Method::PUT,
        host,
        path::document_path(&req.index, &req.doc_type, &req.id),
    )
    .with_json_body(body))
}

pub fn index_description(host: &str, index_or_alias: &str) -> Result<TransportRequest> {
    let target = path::index_path(index_or_alias)?;
    Ok(TransportRequest::new(Method::GET, host, target))
}

pub fn search(host: &str, req: &SearchRequest) -> TransportRequest {
    TransportRequest::new(
        Method::POST,
        host,
        path::search_path(&req.index, &req.doc_type),
    )
    .with_json_body(req.body.clone())
}

pub fn simple_search(host: &str, req: &SimpleSearchRequest) -> Result<TransportRequest> {
    let body = serde_json::to_vec(&simple_search_body(req))?;
    Ok(TransportRequest::new(
        Method::POST,
        host,
        path::search_path(&req.index, &req.doc_type),
    )
    .with_json_body(body))
}

/// Query body for a keyword search: `match_all` without keywords, otherwise
/// an "or" `multi_match` across [`DEFAULT_SEARCH_FIELDS`].
pub fn simple_search_body(req: &SimpleSearchRequest) -> serde_json::Value {
    let query = if req.keywords.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({
            "multi_match": {
                "query": req.keywords,
                "operator": "or",
                "type": "cross_fields",
                "fields": DEFAULT_SEARCH_FIELDS,
            }
        })
    };

    let mut body = json!({
        "from": req.skip,
        "query": query,
    });

    if req.count > 0 {
        body["size"] = json!(req.count);
    }

    body
}
