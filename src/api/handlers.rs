use crate::{
    api::models::*,
    auth::jwt::Claims,
    core::{
        errors::BillsplitError,
        models::{
            activity::{Activity, Notification},
            bill::{Bill, BillPatch, NewBill},
            group::{Category, Environment, GroupMember, Role},
            payment::{NewPayment, Payment},
            recurring::{GeneratedBills, NewRecurringBill, RecurringBill, RecurringCreated},
            summary::{BalanceSummary, CategoryTotal, DebtLine, GroupSummary},
            user::User,
            window::MonthWindow,
        },
        services::BillsplitService,
    },
    infrastructure::{
        cache::in_memory::InMemoryCache, events::broadcast::BroadcastPublisher, storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, patch, post},
};
use http::header;

use std::sync::Arc;

pub type AppService = BillsplitService<InMemoryStorage, InMemoryCache, BroadcastPublisher>;

// Middleware to validate the bearer token and expose its claims to handlers
async fn auth_middleware(
    State(service): State<Arc<AppService>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| BillsplitError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| BillsplitError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    let protected_routes = Router::new()
        .route("/users/{user_id}", get(get_user))
        .route("/groups", post(create_group))
        .route("/groups/{group_id}/members", post(add_member))
        .route("/groups/{group_id}/environments", post(create_environment))
        .route("/groups/{group_id}/archive", post(archive_group))
        .route("/groups/{group_id}/leave", post(leave_group))
        .route("/groups/{group_id}/categories", get(list_categories).post(upsert_category))
        .route("/groups/{group_id}/summary", get(group_summary))
        .route(
            "/groups/{group_id}/environments/{environment_id}/summary",
            get(environment_summary),
        )
        .route(
            "/environments/{environment_id}/bills",
            get(list_bills).post(create_bill),
        )
        .route("/bills/{bill_id}", get(get_bill).patch(update_bill))
        .route("/bills/{bill_id}/archive", post(archive_bill))
        .route(
            "/bills/{bill_id}/payments",
            get(list_payments).post(record_payment),
        )
        .route(
            "/environments/{environment_id}/recurring-bills",
            get(list_recurring).post(create_recurring),
        )
        .route("/recurring-bills/generate-due", post(generate_due))
        .route("/recurring-bills/{recurring_id}", patch(toggle_recurring))
        .route("/dashboard/summary", get(dashboard_summary))
        .route("/dashboard/debts", get(dashboard_debts))
        .route("/dashboard/categories", get(dashboard_categories))
        .route("/dashboard/history", get(dashboard_history))
        .route("/notifications", get(list_notifications))
        .route("/notifications/read-all", patch(mark_all_notifications_read))
        .route("/notifications/{notification_id}/read", patch(mark_notification_read))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/users", post(create_user)) // Unprotected
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = service.create_user(req.name, req.email).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "ID of the user to retrieve")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_user(
    State(service): State<Arc<AppService>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = service
        .get_user(&user_id)
        .await?
        .ok_or_else(|| BillsplitError::not_found("User", &user_id))?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created with its default environment", body = CreateGroupResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_group(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<CreateGroupResponse>), ApiError> {
    let (group, environment) = service.create_group(&claims.sub, req.name).await?;
    Ok((StatusCode::CREATED, Json(CreateGroupResponse { group, environment })))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/members",
    request_body = AddMemberRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Member added or re-activated", body = GroupMember),
        (status = 403, description = "Not a group admin", body = ErrorResponse),
        (status = 404, description = "Group or user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn add_member(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Json<GroupMember>, ApiError> {
    let member = service
        .add_member(&claims.sub, &group_id, &req.user_id, req.role.unwrap_or(Role::Member))
        .await?;
    Ok(Json(member))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/environments",
    request_body = CreateEnvironmentRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 201, description = "Environment created", body = Environment),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_environment(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Json(req): Json<CreateEnvironmentRequest>,
) -> Result<(StatusCode, Json<Environment>), ApiError> {
    let environment = service
        .create_environment(&claims.sub, &group_id, req.name, req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(environment)))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/archive",
    params(
        ("group_id" = String, Path, description = "ID of the group to archive")
    ),
    responses(
        (status = 204, description = "Group archived"),
        (status = 403, description = "Not the group owner", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn archive_group(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.archive_group(&claims.sub, &group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/leave",
    params(
        ("group_id" = String, Path, description = "ID of the group to leave")
    ),
    responses(
        (status = 204, description = "Membership deactivated"),
        (status = 404, description = "Group or membership not found", body = ErrorResponse),
        (status = 409, description = "The owner cannot leave", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn leave_group(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.leave_group(&claims.sub, &group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/categories",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Active categories ordered by name", body = [Category]),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_categories(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(service.list_categories(&claims.sub, &group_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/categories",
    request_body = CategoryRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Category created or re-activated", body = Category),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Group or membership not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn upsert_category(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(service.upsert_category(&claims.sub, &group_id, req.name).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/summary",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        WindowQuery
    ),
    responses(
        (status = 200, description = "Balances of every active member over the group's bills", body = GroupSummary),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn group_summary(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<GroupSummary>, ApiError> {
    let summary = service
        .group_member_summary(&claims.sub, &group_id, None, query.window()?)
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/environments/{environment_id}/summary",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        ("environment_id" = String, Path, description = "ID of the environment"),
        WindowQuery
    ),
    responses(
        (status = 200, description = "Balances of every active member over the environment's bills", body = GroupSummary),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group or environment not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn environment_summary(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path((group_id, environment_id)): Path<(String, String)>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<GroupSummary>, ApiError> {
    let summary = service
        .group_member_summary(&claims.sub, &group_id, Some(&environment_id), query.window()?)
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/environments/{environment_id}/bills",
    request_body = NewBill,
    params(
        ("environment_id" = String, Path, description = "Environment the bill belongs to")
    ),
    responses(
        (status = 201, description = "Bill created with its shares", body = Bill),
        (status = 400, description = "Invalid input or share percentages", body = ErrorResponse),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group or environment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_bill(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(environment_id): Path<String>,
    Json(req): Json<NewBill>,
) -> Result<(StatusCode, Json<Bill>), ApiError> {
    let bill = service.create_bill(&claims.sub, &environment_id, req).await?;
    Ok((StatusCode::CREATED, Json(bill)))
}

#[utoipa::path(
    get,
    path = "/api/environments/{environment_id}/bills",
    params(
        ("environment_id" = String, Path, description = "Environment to list"),
        BillListQuery
    ),
    responses(
        (status = 200, description = "Non-archived bills ordered by due date", body = [Bill]),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_bills(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(environment_id): Path<String>,
    Query(query): Query<BillListQuery>,
) -> Result<Json<Vec<Bill>>, ApiError> {
    let window = MonthWindow::from_parts(query.month, query.year)?;
    let bills = service
        .list_bills(&claims.sub, &environment_id, window, query.status)
        .await?;
    Ok(Json(bills))
}

#[utoipa::path(
    get,
    path = "/api/bills/{bill_id}",
    params(
        ("bill_id" = String, Path, description = "ID of the bill")
    ),
    responses(
        (status = 200, description = "Bill with its shares", body = Bill),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Bill not found or archived", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_bill(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(bill_id): Path<String>,
) -> Result<Json<Bill>, ApiError> {
    Ok(Json(service.get_bill(&claims.sub, &bill_id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/bills/{bill_id}",
    request_body = BillPatch,
    params(
        ("bill_id" = String, Path, description = "ID of the bill to edit")
    ),
    responses(
        (status = 200, description = "Updated bill", body = Bill),
        (status = 400, description = "Invalid input or share percentages", body = ErrorResponse),
        (status = 403, description = "Not the owner or a group admin", body = ErrorResponse),
        (status = 404, description = "Bill not found or archived", body = ErrorResponse),
        (status = 409, description = "Bill is no longer open", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_bill(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(bill_id): Path<String>,
    Json(req): Json<BillPatch>,
) -> Result<Json<Bill>, ApiError> {
    Ok(Json(service.update_bill(&claims.sub, &bill_id, req).await?))
}

#[utoipa::path(
    post,
    path = "/api/bills/{bill_id}/archive",
    params(
        ("bill_id" = String, Path, description = "ID of the bill to archive")
    ),
    responses(
        (status = 204, description = "Bill archived"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Bill not found or already archived", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn archive_bill(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(bill_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.archive_bill(&claims.sub, &bill_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/bills/{bill_id}/payments",
    request_body = NewPayment,
    params(
        ("bill_id" = String, Path, description = "ID of the bill being paid")
    ),
    responses(
        (status = 201, description = "Payment recorded", body = Payment),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Bill not found", body = ErrorResponse),
        (status = 409, description = "Bill has no registered receiver", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn record_payment(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(bill_id): Path<String>,
    Json(req): Json<NewPayment>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let payment = service.record_payment(&claims.sub, &bill_id, req).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/api/bills/{bill_id}/payments",
    params(
        ("bill_id" = String, Path, description = "ID of the bill")
    ),
    responses(
        (status = 200, description = "Payments in the order they were recorded", body = [Payment]),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Bill not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_payments(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(bill_id): Path<String>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    Ok(Json(service.list_payments(&claims.sub, &bill_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/environments/{environment_id}/recurring-bills",
    request_body = NewRecurringBill,
    params(
        ("environment_id" = String, Path, description = "Environment the template belongs to")
    ),
    responses(
        (status = 201, description = "Template created, with its first bill unless disabled", body = RecurringCreated),
        (status = 400, description = "Invalid input or share percentages", body = ErrorResponse),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group or environment not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_recurring(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(environment_id): Path<String>,
    Json(req): Json<NewRecurringBill>,
) -> Result<(StatusCode, Json<RecurringCreated>), ApiError> {
    let created = service.create_recurring(&claims.sub, &environment_id, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/environments/{environment_id}/recurring-bills",
    params(
        ("environment_id" = String, Path, description = "Environment to list")
    ),
    responses(
        (status = 200, description = "Templates, newest first", body = [RecurringBill]),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Environment not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_recurring(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(environment_id): Path<String>,
) -> Result<Json<Vec<RecurringBill>>, ApiError> {
    Ok(Json(service.list_recurring(&claims.sub, &environment_id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/recurring-bills/{recurring_id}",
    request_body = ToggleRecurringRequest,
    params(
        ("recurring_id" = String, Path, description = "ID of the template")
    ),
    responses(
        (status = 200, description = "Template with its new active flag", body = RecurringBill),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Template not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn toggle_recurring(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(recurring_id): Path<String>,
    Json(req): Json<ToggleRecurringRequest>,
) -> Result<Json<RecurringBill>, ApiError> {
    Ok(Json(service.toggle_recurring(&claims.sub, &recurring_id, req.active).await?))
}

#[utoipa::path(
    post,
    path = "/api/recurring-bills/generate-due",
    params(GenerateDueQuery),
    responses(
        (status = 200, description = "Bills materialized in this pass", body = GeneratedBills),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn generate_due(
    State(service): State<Arc<AppService>>,
    Query(query): Query<GenerateDueQuery>,
) -> Result<Json<GeneratedBills>, ApiError> {
    let generated = service
        .generate_due(query.group_id.as_deref(), query.environment_id.as_deref(), query.as_of)
        .await?;
    Ok(Json(generated))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    params(DashboardParams),
    responses(
        (status = 200, description = "Totals to pay and receive", body = BalanceSummary),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 403, description = "Group outside the user's memberships", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn dashboard_summary(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<BalanceSummary>, ApiError> {
    Ok(Json(service.dashboard_summary(&claims.sub, params.into_query()?).await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/debts",
    params(DashboardParams),
    responses(
        (status = 200, description = "Pending shares, oldest due date first", body = [DebtLine]),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 403, description = "Group outside the user's memberships", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn dashboard_debts(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<DebtLine>>, ApiError> {
    Ok(Json(service.dashboard_debts(&claims.sub, params.into_query()?).await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/categories",
    params(DashboardParams),
    responses(
        (status = 200, description = "Amount to pay per category", body = [CategoryTotal]),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 403, description = "Group outside the user's memberships", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn dashboard_categories(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Vec<CategoryTotal>>, ApiError> {
    Ok(Json(service.category_breakdown(&claims.sub, params.into_query()?).await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/history",
    params(WindowQuery),
    responses(
        (status = 200, description = "Most recent activity, newest first", body = [Activity]),
        (status = 400, description = "Invalid month", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn dashboard_history(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    Ok(Json(service.history(&claims.sub, query.window()?).await?))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Inbox, newest first", body = [Notification])
    ),
    security(("Bearer" = []))
)]
pub async fn list_notifications(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(service.list_notifications(&claims.sub).await?))
}

#[utoipa::path(
    patch,
    path = "/api/notifications/{notification_id}/read",
    params(
        ("notification_id" = String, Path, description = "ID of the notification")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn mark_notification_read(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(notification_id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    Ok(Json(service.mark_notification_read(&claims.sub, &notification_id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "Number of notifications marked as read", body = MarkedReadResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn mark_all_notifications_read(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MarkedReadResponse>, ApiError> {
    let updated = service.mark_all_notifications_read(&claims.sub).await?;
    Ok(Json(MarkedReadResponse { updated }))
}
