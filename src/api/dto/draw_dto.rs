//! Allocate and recheck DTOs.
//!
//! Field names follow the presentation layer (`designatedName`,
//! `driveLink`). Missing request fields deserialize as empty strings so
//! they surface as validation errors instead of extractor rejections.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Allocation, CandidateName};

/// Request body for `POST /allocate`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AllocateRequest {
    /// Registrant email. Matched case-insensitively.
    #[serde(default)]
    pub email: String,
    /// Registrant display name. Never drawn for this registrant.
    #[serde(default)]
    pub name: String,
    /// Secret used later to recheck the assignment.
    #[serde(default)]
    pub password: String,
}

/// Response body for `POST /allocate`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocateResponse {
    /// Every name that was in the pool before the draw, for the reveal
    /// animation.
    pub names: Vec<String>,
    /// The drawn recipient.
    pub designated_name: String,
    /// Reference link of the drawn recipient.
    pub drive_link: String,
}

impl From<Allocation> for AllocateResponse {
    fn from(allocation: Allocation) -> Self {
        Self {
            names: allocation.pool_snapshot,
            designated_name: allocation.selected.identity,
            drive_link: allocation.selected.reference_link,
        }
    }
}

/// Request body for `POST /recheck`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecheckRequest {
    /// Email used at allocation time.
    #[serde(default)]
    pub email: String,
    /// Password given at allocation time.
    #[serde(default)]
    pub password: String,
}

/// Response body for `POST /recheck`. Carries no pool snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecheckResponse {
    /// The recipient drawn earlier.
    pub designated_name: String,
    /// Reference link of that recipient.
    pub drive_link: String,
}

impl From<CandidateName> for RecheckResponse {
    fn from(recipient: CandidateName) -> Self {
        Self {
            designated_name: recipient.identity,
            drive_link: recipient.reference_link,
        }
    }
}
