use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ComplaintKind {
    FoodQuality,
    FoodPoisoning,
    Harassment,
}

impl ComplaintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintKind::FoodQuality => "food-quality",
            ComplaintKind::FoodPoisoning => "food-poisoning",
            ComplaintKind::Harassment => "harassment",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HarassmentTarget {
    Student,
    Staff,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ComplaintStatus {
    Pending,
    UnderReview,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ComplaintKind,
    pub student_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_token: Option<String>,
    pub description: String,
    pub proof_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harassment_target: Option<HarassmentTarget>,
    pub status: ComplaintStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// A complaint as filed by a student, before the canteen has seen it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    #[serde(rename = "type")]
    pub kind: ComplaintKind,
    pub student_name: String,
    #[serde(default)]
    pub order_token: Option<String>,
    pub description: String,
    #[serde(default)]
    pub proof_images: Vec<String>,
    #[serde(default)]
    pub harassment_target: Option<HarassmentTarget>,
}

impl Complaint {
    pub fn file(submission: NewComplaint, now: DateTime<Utc>) -> Result<Self, AppError> {
        let student_name = submission.student_name.trim().to_string();
        if student_name.is_empty() {
            return Err(AppError::Validation("student name cannot be empty".to_string()));
        }

        let description = submission.description.trim().to_string();
        if description.is_empty() {
            return Err(AppError::Validation("description cannot be empty".to_string()));
        }

        // Harassment reports are about people, not orders.
        let (order_token, harassment_target) = match submission.kind {
            ComplaintKind::Harassment => {
                let target = submission.harassment_target.ok_or_else(|| {
                    AppError::Validation("harassment complaints need a target".to_string())
                })?;
                (None, Some(target))
            }
            ComplaintKind::FoodQuality | ComplaintKind::FoodPoisoning => {
                let token = submission
                    .order_token
                    .map(|token| token.trim().to_string())
                    .filter(|token| !token.is_empty());
                (token, None)
            }
        };

        let proof_images = submission
            .proof_images
            .into_iter()
            .map(|image| image.trim().to_string())
            .filter(|image| !image.is_empty())
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            kind: submission.kind,
            student_name,
            order_token,
            description,
            proof_images,
            harassment_target,
            status: ComplaintStatus::Pending,
            submitted_at: now,
            resolved_at: None,
            resolution: None,
        })
    }

    pub fn start_review(&mut self) -> Result<(), AppError> {
        if self.status != ComplaintStatus::Pending {
            return Err(AppError::Conflict(format!(
                "complaint {} is not pending",
                self.id
            )));
        }

        self.status = ComplaintStatus::UnderReview;
        Ok(())
    }

    pub fn resolve(&mut self, resolution: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        let resolution = resolution.trim();
        if resolution.is_empty() {
            return Err(AppError::Validation("resolution cannot be empty".to_string()));
        }

        if self.status != ComplaintStatus::UnderReview {
            return Err(AppError::Conflict(format!(
                "complaint {} must be under review before it is resolved",
                self.id
            )));
        }

        self.status = ComplaintStatus::Resolved;
        self.resolution = Some(resolution.to_string());
        self.resolved_at = Some(now);
        Ok(())
    }

    /// Food poisoning reports stay urgent until resolved.
    pub fn is_urgent(&self) -> bool {
        self.kind == ComplaintKind::FoodPoisoning && self.status != ComplaintStatus::Resolved
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintSummary {
    pub pending: usize,
    pub urgent: usize,
    pub resolved: usize,
}

impl ComplaintSummary {
    pub fn tally<'a>(complaints: impl IntoIterator<Item = &'a Complaint>) -> Self {
        complaints
            .into_iter()
            .fold(Self::default(), |mut summary, complaint| {
                match complaint.status {
                    ComplaintStatus::Pending => summary.pending += 1,
                    ComplaintStatus::Resolved => summary.resolved += 1,
                    ComplaintStatus::UnderReview => {}
                }
                if complaint.is_urgent() {
                    summary.urgent += 1;
                }
                summary
            })
    }
}
