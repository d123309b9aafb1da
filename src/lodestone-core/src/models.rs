use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// DocumentRef identifies a single document by index, type and id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_type", default, skip_serializing_if = "String::is_empty")]
    pub doc_type: String,
    #[serde(rename = "_id", default)]
    pub id: String, // Opaque; may look like a URL or path
}

impl DocumentRef {
    pub fn new(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }
}

/// GetDocumentRequest fetches one document
pub type GetDocumentRequest = DocumentRef;

/// GetDocumentResponse is the engine's answer for a single document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetDocumentResponse {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_version", default)]
    pub version: i64, // Meaningless when found is false
    #[serde(rename = "_source", default)]
    pub source: Option<serde_json::Value>,
    #[serde(default)]
    pub found: bool,
    /// Set on multi-get entries the engine could not fetch
    #[serde(
        default,
        deserialize_with = "deserialize_engine_error",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

impl GetDocumentResponse {
    pub fn doc_ref(&self) -> DocumentRef {
        DocumentRef::new(&self.index, &self.doc_type, &self.id)
    }

    /// Decode the stored source into a concrete type
    pub fn source_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        decode_source(self.source.as_ref())
    }
}

/// MGetDocumentsRequest fetches several documents in one round trip
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MGetDocumentsRequest {
    pub docs: Vec<GetDocumentRequest>,
}

impl MGetDocumentsRequest {
    pub fn new(docs: Vec<GetDocumentRequest>) -> Self {
        Self { docs }
    }
}

/// MGetDocumentsResponse holds one entry per requested document, in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MGetDocumentsResponse {
    #[serde(default)]
    pub docs: Vec<GetDocumentResponse>,
}

/// PutDocumentRequest creates or overwrites a document
#[derive(Debug, Clone)]
pub struct PutDocumentRequest<D> {
    pub index: String,
    pub doc_type: String,
    pub id: String,
    pub doc: D, // Sent as-is, no envelope
}

impl<D: Serialize> PutDocumentRequest<D> {
    pub fn new(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
        doc: D,
    ) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
            doc,
        }
    }
}

/// PutDocumentResponse reports the outcome of a write
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PutDocumentResponse {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_version", default)]
    pub version: i64,
    #[serde(default)]
    pub created: bool, // False when an existing document was overwritten
}

/// IndexDescription is the aliases, mappings and settings of one index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDescription {
    #[serde(default, deserialize_with = "deserialize_aliases")]
    pub aliases: BTreeSet<String>,
    /// Document type name to its field mapping, left untyped
    #[serde(default)]
    pub mappings: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub settings: IndexSettings,
}

/// Keyed by concrete index name; an alias may resolve to several indices
pub type GetIndexDescriptionResponse = BTreeMap<String, IndexDescription>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default)]
    pub index: IndexSettingsDetails,
}

/// Index settings. The engine sends every value as a string, including
/// numbers and booleans, and they are kept that way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSettingsDetails {
    #[serde(default)]
    pub routing: Option<IndexRouting>,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub number_of_replicas: String,
    #[serde(default)]
    pub analysis: Option<IndexAnalysis>,
    #[serde(default)]
    pub number_of_shards: String,
    #[serde(default)]
    pub refresh_interval: String,
    #[serde(default)]
    pub version: Option<IndexVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexRouting {
    #[serde(default)]
    pub allocation: Option<IndexAllocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexAllocation {
    #[serde(default)]
    pub disable_allocation: String, // "true" / "false"
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexAnalysis {
    #[serde(default)]
    pub analyzer: BTreeMap<String, Analyzer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analyzer {
    #[serde(rename = "type", default)]
    pub analyzer_type: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexVersion {
    #[serde(default)]
    pub created: String,
}

/// SearchRequest carries a caller-built query body, passed through verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub index: String,
    pub doc_type: String, // Empty searches every type
    pub body: String,
}

impl SearchRequest {
    pub fn new(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            body: body.into(),
        }
    }

    pub fn from_json(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        body: &serde_json::Value,
    ) -> Self {
        Self::new(index, doc_type, body.to_string())
    }
}

/// SimpleSearchRequest is a keyword query over the default search fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleSearchRequest {
    pub index: String,
    pub doc_type: String,
    pub keywords: String, // Empty matches all documents
    pub skip: u64,
    pub count: u64, // 0 leaves the page size to the engine
}

impl SimpleSearchRequest {
    pub fn new(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        keywords: impl Into<String>,
        skip: u64,
        count: u64,
    ) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            keywords: keywords.into(),
            skip,
            count,
        }
    }
}

/// Hit is a single search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>, // Null when results are sorted by field
    #[serde(rename = "_source", default)]
    pub source: Option<serde_json::Value>,
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<BTreeMap<String, Vec<String>>>,
}

impl Hit {
    pub fn source_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        decode_source(self.source.as_ref())
    }
}

/// Hits summarizes the matching documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    #[serde(default, deserialize_with = "deserialize_total_hits")]
    pub total: u64,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Shards tallies the shards that took part in a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shards {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub failed: u32,
}

/// SearchResults is the decoded search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub took: u64, // Milliseconds
    #[serde(default)]
    pub timed_out: bool,
    #[serde(rename = "_shards", default)]
    pub shards: Shards,
    #[serde(default)]
    pub hits: Hits,
    /// When set, `hits` is not authoritative
    #[serde(
        default,
        deserialize_with = "deserialize_engine_error",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

fn decode_source<T: DeserializeOwned>(source: Option<&serde_json::Value>) -> Result<Option<T>> {
    source
        .map(|value| {
            T::deserialize(value).map_err(|source| Error::Decode {
                source,
                body: value.to_string(),
            })
        })
        .transpose()
}

/// Aliases arrive as `{"name": {...}}`; some engine versions send a list
fn deserialize_aliases<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Aliases {
        Named(BTreeMap<String, serde_json::Value>),
        Listed(Vec<String>),
    }

    Ok(match Option::<Aliases>::deserialize(deserializer)? {
        Some(Aliases::Named(map)) => map.into_keys().collect(),
        Some(Aliases::Listed(list)) => list.into_iter().collect(),
        None => BTreeSet::new(),
    })
}

/// `hits.total` is a bare count on older engines, `{value, relation}` on newer ones
fn deserialize_total_hits<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TotalHits {
        Count(u64),
        Object { value: u64 },
    }

    Ok(match Option::<TotalHits>::deserialize(deserializer)? {
        Some(TotalHits::Count(count)) => count,
        Some(TotalHits::Object { value }) => value,
        None => 0,
    })
}

/// The embedded error is either a plain message or a structured object
/// carrying a `reason`. Empty messages count as no error.
fn deserialize_engine_error<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    let message = match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(message)) => Some(message),
        Some(detail) => Some(
            detail
                .get("reason")
                .and_then(|reason| reason.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| detail.to_string()),
        ),
    };

    Ok(message.filter(|message| !message.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_ref_serializes_mget_shape() {
        let doc = DocumentRef::new("pages", "page", "http://example.com/a");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({"_index": "pages", "_type": "page", "_id": "http://example.com/a"})
        );
    }

    #[test]
    fn test_document_ref_omits_empty_type() {
        let doc = DocumentRef::new("pages", "", "1");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({"_index": "pages", "_id": "1"}));
    }

    #[test]
    fn test_get_response_defaults_for_missing_fields() {
        let resp: GetDocumentResponse = serde_json::from_str(r#"{"found": false}"#).unwrap();
        assert!(!resp.found);
        assert!(resp.source.is_none());
        assert_eq!(resp.version, 0);
        assert_eq!(resp.id, "");
    }

    #[test]
    fn test_get_response_keeps_entry_error() {
        let resp: GetDocumentResponse = serde_json::from_value(json!({
            "_index": "archive", "_type": "page", "_id": "2",
            "error": {"type": "index_not_found_exception", "reason": "no such index"}
        }))
        .unwrap();
        assert!(!resp.found);
        assert_eq!(resp.error.as_deref(), Some("no such index"));

        let resp: GetDocumentResponse = serde_json::from_value(json!({"_id": "3", "error": ""})).unwrap();
        assert!(resp.error.is_none());
        assert!(!serde_json::to_value(&resp).unwrap().as_object().unwrap().contains_key("error"));
    }

    #[test]
    fn test_get_response_source_as() {
        #[derive(Deserialize, PartialEq, Debug)]
        struct Page {
            title: String,
        }

        let resp: GetDocumentResponse = serde_json::from_value(json!({
            "_index": "pages", "_type": "page", "_id": "1", "_version": 3,
            "found": true, "_source": {"title": "Rust"}
        }))
        .unwrap();

        let page: Option<Page> = resp.source_as().unwrap();
        assert_eq!(
            page,
            Some(Page {
                title: "Rust".to_string()
            })
        );
        assert_eq!(resp.doc_ref(), DocumentRef::new("pages", "page", "1"));
    }

    #[test]
    fn test_source_as_wrong_shape_is_decode_error() {
        let resp = GetDocumentResponse {
            source: Some(json!({"title": 5})),
            found: true,
            ..Default::default()
        };

        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Page {
            title: String,
        }

        assert!(matches!(resp.source_as::<Page>(), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_aliases_object_and_list_forms() {
        let described: IndexDescription =
            serde_json::from_value(json!({"aliases": {"live": {}, "current": {}}})).unwrap();
        assert_eq!(
            described.aliases.into_iter().collect::<Vec<_>>(),
            vec!["current".to_string(), "live".to_string()]
        );

        let described: IndexDescription =
            serde_json::from_value(json!({"aliases": ["live"]})).unwrap();
        assert!(described.aliases.contains("live"));

        let described: IndexDescription = serde_json::from_value(json!({})).unwrap();
        assert!(described.aliases.is_empty());
    }

    #[test]
    fn test_total_hits_number_and_object() {
        let hits: Hits = serde_json::from_value(json!({"total": 7, "hits": []})).unwrap();
        assert_eq!(hits.total, 7);

        let hits: Hits =
            serde_json::from_value(json!({"total": {"value": 12, "relation": "eq"}})).unwrap();
        assert_eq!(hits.total, 12);
    }

    #[test]
    fn test_engine_error_forms() {
        let results: SearchResults =
            serde_json::from_value(json!({"error": "SearchPhaseExecutionException"})).unwrap();
        assert_eq!(results.error.as_deref(), Some("SearchPhaseExecutionException"));

        let results: SearchResults = serde_json::from_value(json!({
            "error": {"type": "parsing_exception", "reason": "Unknown key for a VALUE_STRING"}
        }))
        .unwrap();
        assert_eq!(results.error.as_deref(), Some("Unknown key for a VALUE_STRING"));

        let results: SearchResults = serde_json::from_value(json!({"error": ""})).unwrap();
        assert!(results.error.is_none());

        let results: SearchResults = serde_json::from_value(json!({"took": 3})).unwrap();
        assert!(results.error.is_none());
    }

    #[test]
    fn test_hit_with_highlight_and_fields() {
        let hit: Hit = serde_json::from_value(json!({
            "_id": "1", "_index": "pages", "_score": 1.5,
            "_source": {"title": "Rust"},
            "fields": {"tags": ["a", "b"]},
            "highlight": {"title": ["<em>Rust</em>"]}
        }))
        .unwrap();

        assert_eq!(hit.score, Some(1.5));
        assert_eq!(hit.fields["tags"], vec![json!("a"), json!("b")]);
        assert_eq!(hit.highlight.unwrap()["title"], vec!["<em>Rust</em>".to_string()]);
    }
}
