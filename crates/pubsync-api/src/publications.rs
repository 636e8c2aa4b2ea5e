//! Handlers for `/publications` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/publications` | Optional `?teamMemberId=<id>&visible=true` |
//! | `POST`   | `/publications` | Body: `{"action":"ingest","teamMemberId":"<id>"?}` |
//! | `PUT`    | `/publications/{id}` | Body: full record; 404 if not found |
//! | `DELETE` | `/publications/{id}` | 404 if not found |

use std::cmp::Ordering;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use pubsync_core::{publication::Publication, store::LabStore, timestamp};
use pubsync_ingest::{FetcherFactory, Ingester, RunScope};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub team_member_id: Option<String>,
  /// `true` keeps only visible publications; `false` only hidden ones.
  pub visible:        Option<bool>,
}

/// Newest first; undated last; ties by title.
fn display_order(a: &Publication, b: &Publication) -> Ordering {
  b.year.cmp(&a.year).then_with(|| a.title.cmp(&b.title))
}

/// `GET /publications[?teamMemberId=<id>][&visible=<bool>]`
pub async fn list<S, F>(
  State(ingester): State<Ingester<S, F>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Publication>>, ApiError>
where
  S: LabStore + 'static,
  F: FetcherFactory + 'static,
{
  let Query(params) = params?;
  let mut publications = ingester
    .store()
    .load_publications()
    .await
    .map_err(ApiError::store)?;

  publications.retain(|p| {
    params
      .team_member_id
      .as_deref()
      .is_none_or(|id| p.team_member_id == id)
      && params.visible.is_none_or(|v| p.is_visible == v)
  });
  publications.sort_by(display_order);
  Ok(Json(publications))
}

// ─── Trigger ingestion ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerBody {
  pub action:         String,
  pub team_member_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerAccepted {
  pub success: bool,
  pub message: String,
  pub job_id:  String,
  pub status:  &'static str,
}

/// `POST /publications`, body: `{"action":"ingest"}`
///
/// Starts a run in the background and answers immediately. Completion is
/// only visible through the run log.
pub async fn trigger<S, F>(
  State(ingester): State<Ingester<S, F>>,
  body: Result<Json<TriggerBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LabStore + 'static,
  F: FetcherFactory + 'static,
{
  let Json(body) = body?;
  if body.action != "ingest" {
    return Err(ApiError::BadRequest(format!("unknown action {:?}", body.action)));
  }

  let scope = RunScope::from_member(body.team_member_id);
  let message = format!("ingestion started for {scope}");
  // The handle is detached; the run outlives this request.
  let _ = ingester.start(scope)?;

  let job_id = format!("ingestion-{}", timestamp::now().timestamp_millis());
  info!(job_id = %job_id, "ingestion triggered");
  Ok((
    StatusCode::ACCEPTED,
    Json(TriggerAccepted { success: true, message, job_id, status: "started" }),
  ))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /publications/{id}`
///
/// The stored identifier and creation time win over the body's.
pub async fn update<S, F>(
  State(ingester): State<Ingester<S, F>>,
  Path(id): Path<String>,
  body: Result<Json<Publication>, JsonRejection>,
) -> Result<Json<Publication>, ApiError>
where
  S: LabStore + 'static,
  F: FetcherFactory + 'static,
{
  let Json(body) = body?;
  let updated = ingester
    .store()
    .update_publication(id.as_str().into(), body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("publication {id} not found")))?;
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /publications/{id}`
pub async fn delete<S, F>(
  State(ingester): State<Ingester<S, F>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LabStore + 'static,
  F: FetcherFactory + 'static,
{
  let removed = ingester
    .store()
    .delete_publication(id.as_str().into())
    .await
    .map_err(ApiError::store)?;
  if !removed {
    return Err(ApiError::NotFound(format!("publication {id} not found")));
  }
  Ok(Json(json!({ "success": true })))
}
