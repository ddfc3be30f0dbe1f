use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::auth::AuthUser;
use crate::db::models::Profile;
use crate::db::queries;
use crate::error::AppError;
use crate::validation;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub profile: Profile,
}

/// Partial update: absent fields keep their stored values. Verification flags
/// are not settable by the user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub branch: Option<String>,
    pub year_of_study: Option<i32>,
    pub student_id: Option<String>,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let profile = queries::get_profile_by_user(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(ProfileResponse { profile }))
}

pub async fn upsert_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let full_name = clean_field("full_name", req.full_name, 120)?;
    let phone = clean_field("phone", req.phone, 20)?;
    let branch = clean_field("branch", req.branch, 80)?;
    let student_id = clean_field("student_id", req.student_id, 40)?;

    if let Some(year) = req.year_of_study {
        if !(1..=6).contains(&year) {
            return Err(AppError::Validation(
                "year_of_study: must be between 1 and 6".to_string(),
            ));
        }
    }

    let profile = queries::upsert_profile(
        &state.db,
        user.id,
        full_name.as_deref(),
        phone.as_deref(),
        branch.as_deref(),
        req.year_of_study,
        student_id.as_deref(),
    )
    .await?;

    Ok(Json(ProfileResponse { profile }))
}

fn clean_field(
    field: &'static str,
    value: Option<String>,
    max_len: usize,
) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = validation::sanitize_string(&value);
    validation::validate_max_len(field, &value, max_len)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if value.is_empty() {
        return Ok(None);
    }

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_field_passes_through_valid_values() {
        let cleaned = clean_field("full_name", Some("  Priya  Sharma ".to_string()), 120).unwrap();
        assert_eq!(cleaned.as_deref(), Some("Priya Sharma"));
    }

    #[test]
    fn clean_field_drops_empty_values() {
        assert_eq!(clean_field("phone", Some("   ".to_string()), 20).unwrap(), None);
        assert_eq!(clean_field("phone", None, 20).unwrap(), None);
    }

    #[test]
    fn clean_field_rejects_overlong_values() {
        assert!(clean_field("branch", Some("x".repeat(81)), 80).is_err());
    }
}
