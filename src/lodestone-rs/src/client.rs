use crate::transport::HttpTransport;
use crate::{ClientError, Result};
use lodestone_core::{
    decode, request, ClientConfig, GetDocumentRequest, GetDocumentResponse,
    GetIndexDescriptionResponse, MGetDocumentsRequest, MGetDocumentsResponse, PutDocumentRequest,
    PutDocumentResponse, SearchRequest, SearchResults, SimpleSearchRequest, Transport,
    TransportRequest, TransportResponse,
};
use serde::Serialize;

/// Search engine REST API client
///
/// Every operation is one blocking request/response round trip. The client
/// holds no per-call state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    host: String,
    transport: T,
}

impl Client<HttpTransport> {
    /// Create a new client for the engine at `host[:port]`
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_transport(host, HttpTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config.host.clone(), HttpTransport::from_config(config))
    }
}

impl<T: Transport> Client<T> {
    /// Create a client that sends through a custom transport
    pub fn with_transport(host: impl Into<String>, transport: T) -> Self {
        Self {
            host: host.into(),
            transport,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a document by index, type and id
    ///
    /// A missing document is not an error: the response has `found == false`.
    pub fn get_document(&self, req: &GetDocumentRequest) -> Result<GetDocumentResponse> {
        let response = self.round_trip(&request::get_document(&self.host, req))?;
        decode::get_document(&response)
    }

    /// Get several documents in one request, answered in request order
    pub fn mget_documents(&self, req: &MGetDocumentsRequest) -> Result<MGetDocumentsResponse> {
        let response = self.round_trip(&request::mget_documents(&self.host, req)?)?;
        decode::mget_documents(&response, req)
    }

    /// Create or overwrite a document
    pub fn put_document<D: Serialize>(
        &self,
        req: &PutDocumentRequest<D>,
    ) -> Result<PutDocumentResponse> {
        let response = self.round_trip(&request::put_document(&self.host, req)?)?;
        decode::put_document(&response)
    }

    /// Aliases, mappings and settings of an index, or of every index behind
    /// an alias
    pub fn get_index_description(
        &self,
        index_or_alias: &str,
    ) -> Result<GetIndexDescriptionResponse> {
        let response = self.round_trip(&request::index_description(&self.host, index_or_alias)?)?;
        decode::index_description(&response)
    }

    /// Search with a caller-built query body
    pub fn search(&self, req: &SearchRequest) -> Result<SearchResults> {
        let response = self.round_trip(&request::search(&self.host, req))?;
        report_engine_error(decode::search(&response))
    }

    /// Keyword search over the default fields; no keywords returns everything
    pub fn simple_search(&self, req: &SimpleSearchRequest) -> Result<SearchResults> {
        let response = self.round_trip(&request::simple_search(&self.host, req)?)?;
        report_engine_error(decode::search(&response))
    }

    fn round_trip(&self, request: &TransportRequest) -> Result<TransportResponse> {
        tracing::debug!("{} {}", request.method, request.url());

        let response = self.transport.send(request)?;

        tracing::debug!(
            "{} {} -> {} ({} bytes)",
            request.method,
            request.target,
            response.status,
            response.body.len()
        );
        Ok(response)
    }
}

fn report_engine_error(result: Result<SearchResults>) -> Result<SearchResults> {
    if let Err(ClientError::Engine(message)) = &result {
        tracing::warn!("Search failed inside the engine: {}", message);
    }
    result
}
