mod payment_tests;
mod recurring_tests;

use crate::core::models::{
    bill::{NewBill, ShareInput},
    group::{Environment, Group, Role},
    user::User,
};
use crate::core::services::BillsplitService;
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::events::broadcast::BroadcastPublisher;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const TEST_SECRET: &str = "test-secret";

pub type TestService = BillsplitService<InMemoryStorage, InMemoryCache, BroadcastPublisher>;

pub fn create_test_service() -> TestService {
    create_service_with(BroadcastPublisher::new(16))
}

pub fn create_service_with<E: EventPublisher>(events: E) -> BillsplitService<InMemoryStorage, InMemoryCache, E> {
    let storage = InMemoryStorage::new();
    let cache = InMemoryCache::new();
    BillsplitService::new(storage, cache, events, TEST_SECRET.to_string())
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn share(user: &User, percentage: &str) -> ShareInput {
    ShareInput {
        user_id: user.id.clone(),
        percentage: dec(percentage),
    }
}

/// Alice owns the group and is its admin; Bob and Carol are plain members.
pub struct Household {
    pub alice: User,
    pub bob: User,
    pub carol: User,
    pub group: Group,
    pub environment: Environment,
}

pub async fn setup_household<E: EventPublisher>(
    service: &BillsplitService<InMemoryStorage, InMemoryCache, E>,
) -> Household {
    let alice = service
        .create_user("Alice".to_string(), "alice@example.com".to_string())
        .await
        .unwrap();
    let bob = service
        .create_user("Bob".to_string(), "bob@example.com".to_string())
        .await
        .unwrap();
    let carol = service
        .create_user("Carol".to_string(), "carol@example.com".to_string())
        .await
        .unwrap();
    let (group, environment) = service.create_group(&alice.id, "Flat 3B".to_string()).await.unwrap();
    service
        .add_member(&alice.id, &group.id, &bob.id, Role::Member)
        .await
        .unwrap();
    service
        .add_member(&alice.id, &group.id, &carol.id, Role::Member)
        .await
        .unwrap();
    Household {
        alice,
        bob,
        carol,
        group,
        environment,
    }
}

pub fn new_bill(group: &Group, title: &str, total: &str, due: NaiveDate, receiver: &User, shares: Vec<ShareInput>) -> NewBill {
    NewBill {
        group_id: group.id.clone(),
        title: title.to_string(),
        due_date: due,
        total_amount: dec(total),
        installments: None,
        pix_key: None,
        payment_link: None,
        attachment_url: None,
        owner_id: None,
        receiver_id: Some(receiver.id.clone()),
        receiver_name: None,
        category: None,
        shares,
    }
}
