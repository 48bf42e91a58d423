use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Query, Request},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::MethodFilter,
    Json,
};
use gpx::GpxError;
use model::ExampleData;
use schemars::{schema_for, schema_for_value, JsonSchema};
use serde::{Deserialize, Serialize};
use split_sheet::SheetError;
use tracker::RequestError;

use crate::hateoas;

pub type RouteResult<O> = Result<O, RouteErrorResponse>;
pub type HateoasResult<O> = RouteResult<Json<hateoas::Response<O>>>;

/// A `MethodFilter` that matches all http methods.
pub(crate) const METHOD_FILTER_ALL: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE);

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VecResponse<T> {
    pub data: Vec<T>,
    pub total_items: usize,
}

impl<T> VecResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            total_items: data.len(),
            data,
        }
    }

    pub fn hateoas(self) -> hateoas::Response<Self> {
        hateoas::Response::new(self)
    }
}

// - Services returning commonly used responses -

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchemaParams {
    #[serde(default = "Default::default")]
    example_data: bool,
}

pub(crate) async fn schema<T: ExampleData + JsonSchema + Serialize>(
    Query(params): Query<SchemaParams>,
) -> impl IntoResponse {
    if params.example_data {
        Json(schema_for_value!(T::example_data()))
    } else {
        Json(schema_for!(T))
    }
}

pub(crate) async fn route_not_found(
    OriginalUri(original_uri): OriginalUri,
    req: Request,
) -> impl IntoResponse {
    RouteErrorResponse::not_found(req.method(), original_uri.path())
}

/// Unwraps a JSON body, turning axum's plain text rejection into a
/// `RouteErrorResponse`.
pub(crate) fn json_body<T>(
    body: Result<Json<T>, JsonRejection>,
    method: &Method,
    uri: &str,
) -> RouteResult<T> {
    body.map(|Json(value)| value).map_err(|why| {
        log::warn!("Rejected request body for {method} {uri}: {why}");
        RouteErrorResponse::new(StatusCode::BAD_REQUEST)
            .with_method(method)
            .with_uri(uri)
            .with_message("The request body is not valid.")
            .with_detailed_information(why.body_text())
    })
}

// - Commonly used responeses -

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteErrorResponse {
    #[serde(skip)]
    pub status_code: StatusCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_information: Option<String>,
}

impl RouteErrorResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            http_method: None,
            requested_uri: None,
            message: None,
            detailed_information: None,
        }
    }

    pub fn not_found(method: &Method, uri: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .with_method(method)
            .with_uri(uri)
            .with_default_message()
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST)
            .with_default_message()
            .with_detailed_information(reason)
    }

    pub fn with_method(mut self, method: &Method) -> Self {
        self.http_method = Some(method.to_string());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.requested_uri = Some(uri.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_default_message(self) -> Self {
        let message = self
            .status_code
            .canonical_reason()
            .unwrap_or("i dunno what happened here :/");
        self.with_message(message)
    }

    pub fn with_detailed_information(mut self, message: impl Into<String>) -> Self {
        self.detailed_information = Some(message.into());
        self
    }
}

impl From<RequestError> for RouteErrorResponse {
    fn from(value: RequestError) -> Self {
        match value {
            RequestError::NotFound => Self::new(StatusCode::NOT_FOUND)
                .with_message("The requested item does not exist."),
            RequestError::InvalidInput(why) => Self::bad_request(why),
            RequestError::Other(other) => {
                log::error!("Request failed: {other}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_message(format!("{}", other))
            }
        }
    }
}

impl From<GpxError> for RouteErrorResponse {
    fn from(value: GpxError) -> Self {
        match value {
            GpxError::Parse(_) | GpxError::InvalidTrackPoint { .. } => {
                Self::bad_request(value.to_string())
            }
            _ => {
                log::error!("GPX handling failed: {value}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_message(value.to_string())
            }
        }
    }
}

impl From<SheetError> for RouteErrorResponse {
    fn from(value: SheetError) -> Self {
        match value {
            SheetError::InvalidRow { .. } => Self::bad_request(value.to_string()),
            SheetError::Csv(_) => {
                log::error!("Split sheet failed: {value}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_message(value.to_string())
            }
        }
    }
}

impl IntoResponse for RouteErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_map_to_status_codes() {
        assert_eq!(
            RouteErrorResponse::from(RequestError::NotFound).status_code,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RouteErrorResponse::from(RequestError::invalid_input("bad")).status_code,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RouteErrorResponse::from(RequestError::other(std::fmt::Error)).status_code,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn malformed_documents_are_bad_requests() {
        let why = GpxError::InvalidTrackPoint {
            index: 3,
            reason: "latitude out of range".to_owned(),
        };
        let response = RouteErrorResponse::from(why);
        assert_eq!(response.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(response.message.as_deref(), Some("Bad Request"));
        assert!(response
            .detailed_information
            .unwrap()
            .contains("latitude out of range"));
    }
}
