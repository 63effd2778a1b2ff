// Activity types
pub const BILL_CREATED: &str = "BILL_CREATED";
pub const BILL_UPDATED: &str = "BILL_UPDATED";
pub const BILL_ARCHIVED: &str = "BILL_ARCHIVED";
pub const PAYMENT_REGISTERED: &str = "PAYMENT_REGISTERED";
pub const RECURRING_CREATED: &str = "RECURRING_CREATED";
pub const RECURRING_TOGGLED: &str = "RECURRING_TOGGLED";
pub const RECURRING_GENERATED: &str = "RECURRING_GENERATED";

// Notification types
pub const NOTIFY_BILL_CREATED: &str = "BILL_CREATED";
pub const NOTIFY_PAYMENT_RECEIVED: &str = "PAYMENT_RECEIVED";

pub const DEFAULT_ENVIRONMENT_NAME: &str = "Casa";
pub const HISTORY_LIMIT: usize = 50;
pub const NOTIFICATION_LIMIT: usize = 100;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_NAME_LENGTH: usize = 100;
