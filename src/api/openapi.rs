use utoipa::OpenApi;

use crate::{
    api::models::{
        AddMemberRequest, CategoryRequest, CreateEnvironmentRequest, CreateGroupRequest, CreateGroupResponse,
        CreateUserRequest, ErrorResponse, MarkedReadResponse, ToggleRecurringRequest,
    },
    core::models::{
        activity::{Activity, Notification},
        bill::{Bill, BillPatch, BillStatus, NewBill, Share, ShareInput, ShareStatus},
        group::{Category, Environment, Group, GroupMember, Role},
        payment::{NewPayment, Payment, PaymentStatus},
        recurring::{Frequency, GeneratedBills, NewRecurringBill, RecurringBill, RecurringCreated, RecurringShare},
        summary::{BalanceSummary, CategoryTotal, DebtLine, GroupSummary, MemberSummary, PayerRef},
        user::User,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::create_user,
        super::handlers::get_user,
        super::handlers::create_group,
        super::handlers::add_member,
        super::handlers::create_environment,
        super::handlers::archive_group,
        super::handlers::leave_group,
        super::handlers::list_categories,
        super::handlers::upsert_category,
        super::handlers::group_summary,
        super::handlers::environment_summary,
        super::handlers::create_bill,
        super::handlers::list_bills,
        super::handlers::get_bill,
        super::handlers::update_bill,
        super::handlers::archive_bill,
        super::handlers::record_payment,
        super::handlers::list_payments,
        super::handlers::create_recurring,
        super::handlers::list_recurring,
        super::handlers::toggle_recurring,
        super::handlers::generate_due,
        super::handlers::dashboard_summary,
        super::handlers::dashboard_debts,
        super::handlers::dashboard_categories,
        super::handlers::dashboard_history,
        super::handlers::list_notifications,
        super::handlers::mark_notification_read,
        super::handlers::mark_all_notifications_read
    ),
    components(schemas(
        CreateUserRequest,
        CreateGroupRequest,
        CreateGroupResponse,
        AddMemberRequest,
        CreateEnvironmentRequest,
        CategoryRequest,
        ToggleRecurringRequest,
        MarkedReadResponse,
        ErrorResponse,
        User,
        Group,
        GroupMember,
        Role,
        Environment,
        Category,
        Bill,
        BillStatus,
        Share,
        ShareStatus,
        ShareInput,
        NewBill,
        BillPatch,
        Payment,
        PaymentStatus,
        NewPayment,
        Frequency,
        RecurringShare,
        RecurringBill,
        NewRecurringBill,
        RecurringCreated,
        GeneratedBills,
        BalanceSummary,
        CategoryTotal,
        PayerRef,
        DebtLine,
        MemberSummary,
        GroupSummary,
        Activity,
        Notification
    )),
    info(
        title = "Billsplit API",
        description = "Shared bill ledger: percentage shares, payments, recurring bills and balances",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
