use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::complaint::{
    Complaint, ComplaintKind, ComplaintStatus, ComplaintSummary, NewComplaint,
};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/complaints", get(list_complaints).post(submit_complaint))
        .route("/complaints/summary", get(complaint_summary))
        .route("/complaints/:id/status", patch(update_complaint_status))
        .route("/complaints/:id/resolve", post(resolve_complaint))
}

#[derive(Deserialize)]
pub struct ComplaintQuery {
    pub status: Option<ComplaintStatus>,
    #[serde(rename = "type")]
    pub kind: Option<ComplaintKind>,
}

#[derive(Deserialize)]
pub struct UpdateComplaintStatusRequest {
    pub status: ComplaintStatus,
}

#[derive(Deserialize)]
pub struct ResolveComplaintRequest {
    pub resolution: String,
}

async fn submit_complaint(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewComplaint>,
) -> Result<Json<Complaint>, AppError> {
    let complaint = Complaint::file(payload, Utc::now())?;

    state.complaints.insert(complaint.id, complaint.clone());
    state
        .metrics
        .complaints_total
        .with_label_values(&[complaint.kind.as_str()])
        .inc();

    if complaint.is_urgent() {
        warn!(complaint_id = %complaint.id, token = ?complaint.order_token, "food poisoning reported");
    } else {
        info!(complaint_id = %complaint.id, kind = complaint.kind.as_str(), "complaint submitted");
    }

    Ok(Json(complaint))
}

/// Newest first.
async fn list_complaints(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ComplaintQuery>,
) -> Json<Vec<Complaint>> {
    let mut complaints: Vec<Complaint> = state
        .complaints
        .iter()
        .map(|entry| entry.value().clone())
        .filter(|complaint| query.status.is_none_or(|status| complaint.status == status))
        .filter(|complaint| query.kind.is_none_or(|kind| complaint.kind == kind))
        .collect();

    complaints.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Json(complaints)
}

async fn complaint_summary(State(state): State<Arc<AppState>>) -> Json<ComplaintSummary> {
    let complaints: Vec<Complaint> = state
        .complaints
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    Json(ComplaintSummary::tally(&complaints))
}

async fn update_complaint_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateComplaintStatusRequest>,
) -> Result<Json<Complaint>, AppError> {
    if payload.status != ComplaintStatus::UnderReview {
        return Err(AppError::BadRequest(
            "complaints can only be moved to under-review here; use resolve".to_string(),
        ));
    }

    let mut complaint = state
        .complaints
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("complaint {} not found", id)))?;

    complaint.start_review()?;
    info!(complaint_id = %id, "complaint under review");

    Ok(Json(complaint.clone()))
}

async fn resolve_complaint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveComplaintRequest>,
) -> Result<Json<Complaint>, AppError> {
    let mut complaint = state
        .complaints
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("complaint {} not found", id)))?;

    complaint.resolve(&payload.resolution, Utc::now())?;
    info!(complaint_id = %id, kind = complaint.kind.as_str(), "complaint resolved");

    Ok(Json(complaint.clone()))
}
