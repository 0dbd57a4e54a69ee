use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, MessageResponse, UrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use keyhole_core::ShortKey;
use keyhole_shortener::ShortenerError;
use tracing::debug;

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UrlResponse>)> {
    let url = match payload {
        Ok(Json(CreateUrlRequest { url: Some(url) })) => url,
        Ok(_) => return Err(AppError::MissingUrl),
        Err(rejection) => {
            debug!(error = %rejection, "rejected create request body");
            return Err(AppError::MissingUrl);
        }
    };

    let mapping = state.shortener().shorten(&url).await?;
    Ok((StatusCode::CREATED, Json(mapping.into())))
}

/// Redirects with `302 Found` to the stored URL.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    redirect(&state, &key).await
}

/// `/shorturl` without a key segment is looked up as the key `shorturl`.
pub async fn shorturl_redirect_handler(State(state): State<AppState>) -> Result<Response> {
    redirect(&state, BARE_SHORTURL_KEY).await
}

pub async fn delete_url_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>> {
    delete(&state, &key).await
}

pub async fn shorturl_delete_handler(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>> {
    delete(&state, BARE_SHORTURL_KEY).await
}

const BARE_SHORTURL_KEY: &str = "shorturl";

async fn redirect(state: &AppState, key: &str) -> Result<Response> {
    // A malformed key can never have been stored.
    let key = ShortKey::parse(key).map_err(|_| AppError::ShortUrlNotFound)?;

    let url = state
        .shortener()
        .resolve(&key)
        .await
        .map_err(|err| match err {
            ShortenerError::NotFound(_) => AppError::ShortUrlNotFound,
            other => other.into(),
        })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

async fn delete(state: &AppState, key: &str) -> Result<Json<MessageResponse>> {
    let key = ShortKey::parse(key).map_err(|_| AppError::UrlNotFound)?;

    state
        .shortener()
        .delete(&key)
        .await
        .map_err(|err| match err {
            ShortenerError::NotFound(_) => AppError::UrlNotFound,
            other => other.into(),
        })?;

    Ok(Json(MessageResponse::new(format!(
        "Key: {key} deleted successfully"
    ))))
}
