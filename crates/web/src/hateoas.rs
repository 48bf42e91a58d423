//! Response envelope carrying hypermedia links next to the content.

use std::sync::Arc;

use axum::Json;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::middleware::base_url::BaseUrl;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Link {
    #[serde(rename = "rel")]
    pub relation: String,

    #[serde(rename = "href")]
    pub hypertext_reference: String,
}

/// Resources that know their own links, as `(relation, path)` pairs relative
/// to the server root.
pub trait Linked {
    fn links(&self) -> Vec<(&'static str, String)>;
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    #[serde(flatten)]
    pub content: T,
    pub links: Vec<Link>,
}

impl<T> Response<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: vec![],
        }
    }

    pub fn builder(content: T, base_url: Arc<BaseUrl>) -> ResponseBuilder<T> {
        ResponseBuilder {
            response: Response::new(content),
            base_url,
        }
    }

    pub fn json(self) -> Json<Self> {
        Json(self)
    }
}

impl<T: Linked> Response<T> {
    pub fn linked(content: T, base_url: Arc<BaseUrl>) -> Self {
        let links = content.links();
        links
            .into_iter()
            .fold(Self::builder(content, base_url), |builder, (relation, path)| {
                builder.link(relation, path)
            })
            .build()
    }
}

pub struct ResponseBuilder<T> {
    response: Response<T>,
    base_url: Arc<BaseUrl>,
}

impl<T> ResponseBuilder<T> {
    pub fn link<R, H>(mut self, relation: R, path: H) -> Self
    where
        R: Into<String>,
        H: Into<String>,
    {
        self.response.links.push(Link {
            relation: relation.into(),
            hypertext_reference: self.base_url.full_url(path),
        });
        self
    }

    pub fn build(self) -> Response<T> {
        self.response
    }
}
