use crate::error::{AppError, Result};
use crate::model::{ListQuery, ShortUrl, ShortUrlList};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use kurteyt_core::{ShortId, ShortUrlCreate, ShortUrlRecord};
use kurteyt_shortener::ShortUrlError;

fn view(state: &AppState, record: ShortUrlRecord) -> ShortUrl {
    ShortUrl {
        short_url: state.short_url(&record.short_id),
        record,
    }
}

/// A path segment that is not a well-formed id cannot name a record.
fn parse_id(raw: String) -> Result<ShortId> {
    ShortId::new(raw.as_str()).map_err(|_| ShortUrlError::NotFound(raw).into())
}

pub async fn create_short_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShortUrlCreate>, JsonRejection>,
) -> Result<Json<ShortUrl>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidBody(e.body_text()))?;

    let record = state.shortener().create(request).await?;
    Ok(Json(view(&state, record)))
}

pub async fn get_short_url_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShortUrl>> {
    let id = parse_id(id)?;
    let record = state.shortener().get(&id).await?;
    Ok(Json(view(&state, record)))
}

pub async fn delete_short_url_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShortUrl>> {
    let id = parse_id(id)?;
    let record = state.shortener().delete(&id).await?;
    Ok(Json(view(&state, record)))
}

pub async fn list_short_urls_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ShortUrlList>> {
    let Query(query) = query.map_err(|e| AppError::InvalidQuery(e.body_text()))?;

    let page = state
        .shortener()
        .list(query.limit, query.cursor.as_deref())
        .await?;

    Ok(Json(ShortUrlList {
        items: page
            .records
            .into_iter()
            .map(|record| view(&state, record))
            .collect(),
        next_cursor: page.next_cursor,
    }))
}
