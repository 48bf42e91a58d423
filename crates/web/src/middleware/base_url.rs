use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::IntoResponse,
};

/// Public origin of the server as seen by the client, honouring reverse
/// proxy headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    proto: String,
    host: String,
    prefix: String,
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl BaseUrl {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let host = header_value(headers, "x-forwarded-host")
            .or_else(|| header_value(headers, header::HOST.as_str()))
            .unwrap_or("localhost");
        Self {
            proto: header_value(headers, "x-forwarded-proto")
                .unwrap_or("http")
                .to_owned(),
            host: host.to_owned(),
            prefix: header_value(headers, "x-forwarded-prefix")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_owned(),
        }
    }

    pub fn full_url<S: Into<String>>(&self, path: S) -> String {
        format!("{}://{}{}{}", self.proto, self.host, self.prefix, path.into())
    }
}

pub async fn base_url_middleware(mut req: Request, next: Next) -> impl IntoResponse {
    let base_url = BaseUrl::from_headers(req.headers());
    req.extensions_mut().insert(Arc::new(base_url));
    next.run(req).await
}
