use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::core::errors::BillsplitError;
use crate::core::models::{
    bill::BillStatus,
    group::{Environment, Group, Role},
    summary::DashboardQuery,
    window::MonthWindow,
};

// Request bodies
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct CreateGroupResponse {
    pub group: Group,
    pub environment: Environment,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
    pub role: Option<Role>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateEnvironmentRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ToggleRecurringRequest {
    pub active: bool,
}

#[derive(Serialize, ToSchema)]
pub struct MarkedReadResponse {
    pub updated: usize,
}

// Query strings
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BillListQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub status: Option<BillStatus>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WindowQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl WindowQuery {
    pub fn window(&self) -> Result<Option<MonthWindow>, BillsplitError> {
        MonthWindow::from_parts(self.month, self.year)
    }
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardParams {
    pub person_id: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub group_id: Option<String>,
    pub environment_id: Option<String>,
    pub category: Option<String>,
}

impl DashboardParams {
    pub fn into_query(self) -> Result<DashboardQuery, BillsplitError> {
        Ok(DashboardQuery {
            window: MonthWindow::from_parts(self.month, self.year)?,
            person_id: self.person_id.filter(|p| !p.trim().is_empty()),
            group_id: self.group_id.filter(|g| !g.trim().is_empty()),
            environment_id: self.environment_id.filter(|e| !e.trim().is_empty()),
            category: self.category.filter(|c| !c.trim().is_empty()),
        })
    }
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GenerateDueQuery {
    pub group_id: Option<String>,
    pub environment_id: Option<String>,
    /// Defaults to today (UTC)
    pub as_of: Option<NaiveDate>,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for BillsplitError to implement IntoResponse
pub struct ApiError(pub BillsplitError);

impl From<BillsplitError> for ApiError {
    fn from(err: BillsplitError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            BillsplitError::NotFound(_) => StatusCode::NOT_FOUND,
            BillsplitError::Forbidden(_) => StatusCode::FORBIDDEN,
            BillsplitError::InvalidState(_) => StatusCode::CONFLICT,
            BillsplitError::InvalidAllocation(_) | BillsplitError::ValidationError(_) => StatusCode::BAD_REQUEST,
            BillsplitError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BillsplitError::StorageError(_)
            | BillsplitError::CacheError(_)
            | BillsplitError::EventError(_)
            | BillsplitError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_distinct_statuses() {
        let cases = [
            (BillsplitError::not_found("Bill", "b1"), StatusCode::NOT_FOUND),
            (BillsplitError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (BillsplitError::InvalidState("x".into()), StatusCode::CONFLICT),
            (BillsplitError::InvalidAllocation("x".into()), StatusCode::BAD_REQUEST),
            (BillsplitError::validation("title", "t", "d"), StatusCode::BAD_REQUEST),
            (BillsplitError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (BillsplitError::StorageError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }

    #[test]
    fn partial_window_in_query_is_ignored() {
        let params = DashboardParams {
            person_id: Some(" ".to_string()),
            month: Some(4),
            year: None,
            group_id: None,
            environment_id: None,
            category: None,
        };
        let query = params.into_query().unwrap();
        assert!(query.window.is_none());
        assert!(query.person_id.is_none());
    }
}
