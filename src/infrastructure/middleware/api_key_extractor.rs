// ApiKey Extractor - opaque caller identity carried in the `api-key` header

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;

pub const API_KEY_HEADER: &str = "api-key";

/// Raw value of the `api-key` header, if present and valid UTF-8.
///
/// Extraction never rejects: an absent key is resolved by the user lookup,
/// which reports "User not found" like any other unknown key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKey(pub Option<String>);

impl ApiKey {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let key = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Self(key)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let api_key = Self::from_headers(&parts.headers);
        async move { Ok(api_key) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reads_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("test"));

        let api_key = ApiKey::from_headers(&headers);
        assert_eq!(api_key.as_deref(), Some("test"));
    }

    #[test]
    fn test_missing_header_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(ApiKey::from_headers(&headers), ApiKey(None));
    }

    #[test]
    fn test_non_utf8_header_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        assert_eq!(ApiKey::from_headers(&headers).as_deref(), None);
    }
}
