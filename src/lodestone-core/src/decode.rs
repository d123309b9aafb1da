//! Turns raw engine responses into typed results.

use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::models::{
    GetDocumentResponse, GetIndexDescriptionResponse, MGetDocumentsRequest,
    MGetDocumentsResponse, PutDocumentResponse, SearchResults,
};
use crate::transport::TransportResponse;

/// Longest body excerpt carried by a decode error
const BODY_EXCERPT_LEN: usize = 512;

/// Deserialize a JSON body, keeping an excerpt of it on failure
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| Error::Decode {
        source,
        body: excerpt(body),
    })
}

/// A missing document comes back as 404 with `{"found": false}`, so that 404
/// is decoded like a success. A 404 carrying an `error` member (missing index)
/// or a non-JSON body is a server error.
pub fn get_document(resp: &TransportResponse) -> Result<GetDocumentResponse> {
    if resp.status != StatusCode::NOT_FOUND {
        ensure_success(resp)?;
        return decode_json(&resp.body);
    }

    match serde_json::from_slice::<serde_json::Value>(&resp.body) {
        Ok(body) if body.get("error").is_none_or(|error| error.is_null()) => {
            serde_json::from_value(body).map_err(|source| Error::Decode {
                source,
                body: excerpt(&resp.body),
            })
        }
        _ => {
            tracing::warn!("Engine returned status {} with an error body", resp.status);
            Err(Error::Server {
                status: resp.status.as_u16(),
                message: resp.text(),
            })
        }
    }
}

/// Decode a multi-get response and line its entries up with the request
pub fn mget_documents(
    resp: &TransportResponse,
    req: &MGetDocumentsRequest,
) -> Result<MGetDocumentsResponse> {
    ensure_success(resp)?;
    let mut decoded: MGetDocumentsResponse = decode_json(&resp.body)?;

    if decoded.docs.len() != req.docs.len() {
        return Err(Error::InvalidResponse(format!(
            "multi-get returned {} documents for {} requested",
            decoded.docs.len(),
            req.docs.len()
        )));
    }

    decoded.docs = align_to_request(decoded.docs, req);
    Ok(decoded)
}

pub fn put_document(resp: &TransportResponse) -> Result<PutDocumentResponse> {
    ensure_success(resp)?;
    decode_json(&resp.body)
}

pub fn index_description(resp: &TransportResponse) -> Result<GetIndexDescriptionResponse> {
    ensure_success(resp)?;
    decode_json(&resp.body)
}

/// Decode a search response. An error embedded in a 2xx payload fails the
/// whole decode; the hits next to it are never returned.
pub fn search(resp: &TransportResponse) -> Result<SearchResults> {
    ensure_success(resp)?;
    let results: SearchResults = decode_json(&resp.body)?;

    if let Some(error) = results.error {
        return Err(Error::Engine(error));
    }

    Ok(results)
}

/// Non-2xx statuses fail before any JSON decoding, carrying the raw body
fn ensure_success(resp: &TransportResponse) -> Result<()> {
    if resp.status.is_success() {
        return Ok(());
    }

    tracing::warn!("Engine returned status {}", resp.status);
    Err(Error::Server {
        status: resp.status.as_u16(),
        message: resp.text(),
    })
}

/// Put each returned document at the position of the request that asked for
/// it. Entries without a matching request keep the position the engine gave
/// them.
fn align_to_request(
    docs: Vec<GetDocumentResponse>,
    req: &MGetDocumentsRequest,
) -> Vec<GetDocumentResponse> {
    let mut pending: Vec<Option<GetDocumentResponse>> = docs.into_iter().map(Some).collect();
    let mut aligned: Vec<Option<GetDocumentResponse>> = vec![None; req.docs.len()];

    for (slot, wanted) in aligned.iter_mut().zip(&req.docs) {
        let position = pending.iter().position(|doc| {
            doc.as_ref().is_some_and(|doc| {
                doc.id == wanted.id
                    && (doc.index.is_empty() || doc.index == wanted.index)
                    && (doc.doc_type.is_empty()
                        || wanted.doc_type.is_empty()
                        || doc.doc_type == wanted.doc_type)
            })
        });

        if let Some(position) = position {
            *slot = pending[position].take();
        }
    }

    // Leftovers fill the empty slots in their original order
    let mut leftovers = pending.into_iter().flatten();
    aligned
        .into_iter()
        .map(|slot| slot.or_else(|| leftovers.next()).unwrap_or_default())
        .collect()
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}
