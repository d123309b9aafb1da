//! Client operations against an in-memory engine transport.

use http::{Method, StatusCode};
use lodestone::{
    Client, ClientError, DocumentRef, MGetDocumentsRequest, PutDocumentRequest, Result,
    Transport, TransportRequest, TransportResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Stores documents by request target; answers multi-get in reverse order
#[derive(Default)]
struct MemoryEngine {
    docs: Mutex<HashMap<String, (i64, Value)>>,
}

fn split_target(target: &str) -> (String, String, String) {
    let mut parts = target.trim_start_matches('/').splitn(3, '/');
    let mut next = || parts.next().unwrap_or_default().to_string();
    (next(), next(), next())
}

impl MemoryEngine {
    fn lookup(&self, target: &str) -> Value {
        let (index, doc_type, id) = split_target(target);
        match self.docs.lock().unwrap().get(target) {
            Some((version, source)) => json!({
                "_index": index, "_type": doc_type, "_id": id,
                "_version": version, "found": true, "_source": source
            }),
            None => json!({"_index": index, "_type": doc_type, "_id": id, "found": false}),
        }
    }
}

impl Transport for MemoryEngine {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let body: Value = match &request.body {
            Some(body) => serde_json::from_slice(body)?,
            None => Value::Null,
        };

        let target = request.target.as_str();
        let (status, reply) = if request.method == Method::PUT {
            let mut docs = self.docs.lock().unwrap();
            let version = docs.get(target).map_or(1, |(version, _)| version + 1);
            docs.insert(target.to_string(), (version, body));

            let (index, doc_type, id) = split_target(target);
            let created = version == 1;
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                json!({
                    "_index": index, "_type": doc_type, "_id": id,
                    "_version": version, "created": created
                }),
            )
        } else if request.method == Method::GET {
            let found = self.lookup(target);
            let status = if found["found"] == true {
                StatusCode::OK
            } else {
                StatusCode::NOT_FOUND
            };
            (status, found)
        } else if request.method == Method::POST && target == "/_mget" {
            let mut docs: Vec<Value> = body["docs"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .iter()
                .map(|doc| {
                    let target = format!(
                        "/{}/{}/{}",
                        doc["_index"].as_str().unwrap_or_default(),
                        doc["_type"].as_str().unwrap_or_default(),
                        doc["_id"].as_str().unwrap_or_default()
                    );
                    self.lookup(&target)
                })
                .collect();
            docs.reverse();
            (StatusCode::OK, json!({ "docs": docs }))
        } else {
            (StatusCode::BAD_REQUEST, json!({"error": "unsupported"}))
        };

        Ok(TransportResponse::new(status, reply.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Page {
    title: String,
    url: String,
    rank: u32,
}

#[test]
fn test_put_then_get_round_trips_source() {
    let client = Client::with_transport("memory", MemoryEngine::default());
    let id = "http://example.com/docs/../index.html?lang=en";
    let page = Page {
        title: "Example".to_string(),
        url: id.to_string(),
        rank: 3,
    };

    let put = client
        .put_document(&PutDocumentRequest::new("pages", "page", id, &page))
        .unwrap();
    assert!(put.created);
    assert_eq!(put.id, id);

    let got = client
        .get_document(&DocumentRef::new("pages", "page", id))
        .unwrap();
    assert!(got.found);
    assert_eq!(got.version, 1);
    assert_eq!(got.source_as::<Page>().unwrap(), Some(page));
}

#[test]
fn test_overwrite_bumps_version() {
    let client = Client::with_transport("memory", MemoryEngine::default());

    client
        .put_document(&PutDocumentRequest::new("pages", "page", "1", json!({"v": 1})))
        .unwrap();
    let second = client
        .put_document(&PutDocumentRequest::new("pages", "page", "1", json!({"v": 2})))
        .unwrap();

    assert!(!second.created);
    assert_eq!(second.version, 2);

    let got = client
        .get_document(&DocumentRef::new("pages", "page", "1"))
        .unwrap();
    assert_eq!(got.source, Some(json!({"v": 2})));
}

#[test]
fn test_get_missing_document() {
    let client = Client::with_transport("memory", MemoryEngine::default());

    let got = client
        .get_document(&DocumentRef::new("pages", "page", "nope"))
        .unwrap();
    assert!(!got.found);
    assert!(got.source.is_none());
}

#[test]
fn test_mget_preserves_request_order() {
    let client = Client::with_transport("memory", MemoryEngine::default());
    client
        .put_document(&PutDocumentRequest::new("pages", "page", "id1", json!({"n": 1})))
        .unwrap();
    client
        .put_document(&PutDocumentRequest::new("pages", "page", "id3", json!({"n": 3})))
        .unwrap();

    let resp = client
        .mget_documents(&MGetDocumentsRequest::new(vec![
            DocumentRef::new("pages", "page", "id1"),
            DocumentRef::new("pages", "page", "id2"),
            DocumentRef::new("pages", "page", "id3"),
        ]))
        .unwrap();

    let ids: Vec<&str> = resp.docs.iter().map(|doc| doc.id.as_str()).collect();
    assert_eq!(ids, vec!["id1", "id2", "id3"]);
    let found: Vec<bool> = resp.docs.iter().map(|doc| doc.found).collect();
    assert_eq!(found, vec![true, false, true]);
}

#[test]
fn test_missing_index_is_server_error() {
    let client = Client::with_transport("memory", MemoryEngine::default());

    let err = client.get_index_description("pages").unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 404, .. }));
    assert!(err.is_transport_failure());
}
