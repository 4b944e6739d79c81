use url::Url;

/// A successfully fetched document, decoded to UTF-8.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub url_final: Url,
    pub body_utf8: String,
    /// Name of the encoding the body was decoded from.
    pub encoding: &'static str,
}
