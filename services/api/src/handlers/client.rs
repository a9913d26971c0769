use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{ACCEPT_LANGUAGE, USER_AGENT};
use axum::http::request::Parts;

use crate::domain::types::ClientMetadata;
use crate::infra::rate_limit::client_ip;

/// Request metadata the HTTP layer can observe without the body.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    /// First tag of `accept-language`.
    pub accept_language: Option<String>,
}

impl ClientInfo {
    /// Merge with body-supplied hints. A body `language` wins over the header.
    pub fn into_metadata(
        self,
        device: Option<String>,
        browser: Option<String>,
        language: Option<String>,
    ) -> ClientMetadata {
        ClientMetadata {
            ip: self.ip,
            user_agent: self.user_agent,
            device: non_blank(device),
            browser: non_blank(browser),
            language: non_blank(language).or(self.accept_language),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

fn first_language_tag(header: &str) -> Option<String> {
    header
        .split(',')
        .next()
        .and_then(|tag| tag.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .map(str::to_owned)
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        Ok(Self {
            ip: client_ip(headers, &parts.extensions),
            user_agent: headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            accept_language: headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .and_then(first_language_tag),
        })
    }
}
