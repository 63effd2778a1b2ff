use super::{Household, TestService, create_test_service, date, dec, setup_household, share};
use crate::core::errors::BillsplitError;
use crate::core::models::recurring::{Frequency, NewRecurringBill, RecurringCreated};
use chrono::NaiveDate;
use std::sync::Arc;

fn template(h: &Household, frequency: Frequency, due_date: NaiveDate, create_first_bill: bool) -> NewRecurringBill {
    NewRecurringBill {
        group_id: h.group.id.clone(),
        title: "Rent".to_string(),
        total_amount: dec("1200.00"),
        frequency,
        due_date,
        pix_key: Some("alice@pix".to_string()),
        payment_link: None,
        attachment_url: None,
        owner_id: None,
        receiver_id: Some(h.alice.id.clone()),
        receiver_name: None,
        category: Some("Housing".to_string()),
        shares: vec![share(&h.alice, "50"), share(&h.bob, "25"), share(&h.carol, "25")],
        create_first_bill,
    }
}

async fn create(service: &TestService, h: &Household, due_date: NaiveDate, create_first_bill: bool) -> RecurringCreated {
    service
        .create_recurring(
            &h.alice.id,
            &h.environment.id,
            template(h, Frequency::Monthly, due_date, create_first_bill),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_recurring_materializes_first_bill() {
    let service = create_test_service();
    let h = setup_household(&service).await;

    let created = create(&service, &h, date(2024, 3, 5), true).await;
    assert_eq!(created.recurring.next_due_date, date(2024, 4, 5));
    assert_eq!(created.recurring.day_of_month, 5);
    assert!(created.recurring.active);

    let first = created.first_bill.unwrap();
    assert_eq!(first.due_date, date(2024, 3, 5));
    assert_eq!(first.recurring_bill_id.as_deref(), Some(created.recurring.id.as_str()));
    assert_eq!(first.share_for(&h.bob.id).unwrap().amount, dec("300.00"));
    assert_eq!(first.category.as_deref(), Some("Housing"));

    let bills = service
        .list_bills(&h.alice.id, &h.environment.id, None, None)
        .await
        .unwrap();
    assert_eq!(bills.len(), 1);
}

#[tokio::test]
async fn test_create_recurring_without_first_bill() {
    let service = create_test_service();
    let h = setup_household(&service).await;

    let created = create(&service, &h, date(2024, 3, 5), false).await;
    assert!(created.first_bill.is_none());
    assert!(
        service
            .list_bills(&h.alice.id, &h.environment.id, None, None)
            .await
            .unwrap()
            .is_empty()
    );
    let templates = service.list_recurring(&h.bob.id, &h.environment.id).await.unwrap();
    assert_eq!(templates.len(), 1);
}

#[tokio::test]
async fn test_create_recurring_rejects_bad_percentages() {
    let service = create_test_service();
    let h = setup_household(&service).await;

    let mut input = template(&h, Frequency::Weekly, date(2024, 3, 5), true);
    input.shares = vec![share(&h.alice, "50"), share(&h.bob, "45")];
    let result = service.create_recurring(&h.alice.id, &h.environment.id, input).await;
    assert!(matches!(result, Err(BillsplitError::InvalidAllocation(_))));
    assert!(service.list_recurring(&h.alice.id, &h.environment.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_due_is_idempotent() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    // next due date becomes 2024-01-31
    create(&service, &h, date(2023, 12, 31), false).await;

    let as_of = Some(date(2024, 2, 1));
    let first = service.generate_due(None, None, as_of).await.unwrap();
    assert_eq!(first.count, 1);
    assert_eq!(first.bills[0].due_date, date(2024, 1, 31));

    let second = service.generate_due(None, None, as_of).await.unwrap();
    assert_eq!(second.count, 0);

    let templates = service.list_recurring(&h.alice.id, &h.environment.id).await.unwrap();
    assert_eq!(templates[0].next_due_date, date(2024, 2, 29));
}

#[tokio::test]
async fn test_generate_due_advances_one_period_per_pass() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    create(&service, &h, date(2023, 12, 31), false).await;

    let as_of = Some(date(2024, 6, 1));
    let first = service.generate_due(None, None, as_of).await.unwrap();
    assert_eq!(first.count, 1);
    let second = service.generate_due(None, None, as_of).await.unwrap();
    assert_eq!(second.count, 1);
    assert_eq!(second.bills[0].due_date, date(2024, 2, 29));

    let templates = service.list_recurring(&h.alice.id, &h.environment.id).await.unwrap();
    assert_eq!(templates[0].next_due_date, date(2024, 3, 29));
}

#[tokio::test]
async fn test_generate_due_skips_future_templates() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    create(&service, &h, date(2024, 3, 5), true).await;

    let generated = service.generate_due(None, None, Some(date(2024, 4, 4))).await.unwrap();
    assert_eq!(generated.count, 0);
    let generated = service.generate_due(None, None, Some(date(2024, 4, 5))).await.unwrap();
    assert_eq!(generated.count, 1);
}

#[tokio::test]
async fn test_inactive_template_is_skipped() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let created = create(&service, &h, date(2024, 3, 5), false).await;

    let paused = service
        .toggle_recurring(&h.bob.id, &created.recurring.id, false)
        .await
        .unwrap();
    assert!(!paused.active);
    let generated = service.generate_due(None, None, Some(date(2024, 5, 1))).await.unwrap();
    assert_eq!(generated.count, 0);

    service
        .toggle_recurring(&h.bob.id, &created.recurring.id, true)
        .await
        .unwrap();
    let generated = service.generate_due(None, None, Some(date(2024, 5, 1))).await.unwrap();
    assert_eq!(generated.count, 1);
}

#[tokio::test]
async fn test_toggle_unknown_template_not_found() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let result = service.toggle_recurring(&h.alice.id, "missing", false).await;
    assert!(matches!(result, Err(BillsplitError::NotFound(_))));
}

#[tokio::test]
async fn test_generate_due_filters_by_environment() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let studio = service
        .create_environment(&h.alice.id, &h.group.id, "Studio".to_string(), None)
        .await
        .unwrap();
    create(&service, &h, date(2024, 3, 5), false).await;

    let generated = service
        .generate_due(None, Some(&studio.id), Some(date(2024, 5, 1)))
        .await
        .unwrap();
    assert_eq!(generated.count, 0);
    let generated = service
        .generate_due(Some(&h.group.id), Some(&h.environment.id), Some(date(2024, 5, 1)))
        .await
        .unwrap();
    assert_eq!(generated.count, 1);
}

#[tokio::test]
async fn test_concurrent_passes_produce_one_bill() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    create(&service, &h, date(2024, 3, 5), false).await;
    let service = Arc::new(service);

    let as_of = Some(date(2024, 4, 10));
    let (a, b) = tokio::join!(
        {
            let service = Arc::clone(&service);
            async move { service.generate_due(None, None, as_of).await }
        },
        {
            let service = Arc::clone(&service);
            async move { service.generate_due(None, None, as_of).await }
        }
    );
    assert_eq!(a.unwrap().count + b.unwrap().count, 1);
    let bills = service
        .list_bills(&h.alice.id, &h.environment.id, None, None)
        .await
        .unwrap();
    assert_eq!(bills.len(), 1);
}

#[tokio::test]
async fn test_archived_group_templates_are_skipped() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    create(&service, &h, date(2024, 3, 5), false).await;
    service.archive_group(&h.alice.id, &h.group.id).await.unwrap();

    let generated = service.generate_due(None, None, Some(date(2024, 5, 1))).await.unwrap();
    assert_eq!(generated.count, 0);
}
