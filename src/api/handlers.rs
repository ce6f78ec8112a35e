use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use url::Url;

use crate::data_models::SearchScrapeResponse;
use crate::pipeline::{Pipeline, SourceError};
use crate::providers::SearchError;

use super::models::{ErrorResponse, ExtractRequest, ExtractResponse, SearchRequest};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

pub async fn search_handler(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchScrapeResponse>, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "query cannot be empty"));
    }

    match pipeline.run(query).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => Err(map_search_error(e)),
    }
}

pub async fn extract_handler(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let url = request.url.trim();
    let valid = Url::parse(url)
        .map(|u| u.scheme() == "http" || u.scheme() == "https")
        .unwrap_or(false);
    if !valid {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "url must be an absolute http(s) URL",
        ));
    }

    match pipeline.extract_url(url).await {
        Ok(chunks) => Ok(Json(ExtractResponse { chunks })),
        // no sibling source to fall back on here, so an extraction miss is
        // its own condition, distinct from a transport failure
        Err(SourceError::Extract(e)) => Err(reject(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())),
        Err(SourceError::Fetch(e)) => Err(reject(StatusCode::BAD_GATEWAY, e.to_string())),
        Err(SourceError::InvalidUrl(e)) => Err(reject(StatusCode::BAD_REQUEST, e.to_string())),
    }
}

fn map_search_error(e: SearchError) -> ApiError {
    let status = match &e {
        SearchError::Access { .. }
        | SearchError::Timeout
        | SearchError::Transport(_)
        | SearchError::BadStatus { .. } => StatusCode::BAD_GATEWAY,
        SearchError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    reject(status, e.to_string())
}
