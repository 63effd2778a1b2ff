use super::{Household, create_service_with, create_test_service, date, dec, new_bill, setup_household, share};
use crate::core::errors::BillsplitError;
use crate::core::models::{
    bill::{Bill, BillStatus, ShareStatus},
    payment::{NewPayment, PaymentStatus},
};
use crate::core::services::BillsplitService;
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::events::broadcast::BroadcastPublisher;
use crate::infrastructure::events::{EventPublisher, LedgerEvent};
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use async_trait::async_trait;

struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _event: LedgerEvent) -> Result<(), BillsplitError> {
        Err(BillsplitError::EventError("transport down".to_string()))
    }
}

fn pay(amount: &str) -> NewPayment {
    NewPayment {
        from_user_id: None,
        amount: dec(amount),
        method: Some("pix".to_string()),
    }
}

/// 100.00 split evenly between Alice and Bob, paid to Alice.
async fn half_and_half<E: EventPublisher>(
    service: &BillsplitService<InMemoryStorage, InMemoryCache, E>,
    h: &Household,
) -> Bill {
    service
        .create_bill(
            &h.alice.id,
            &h.environment.id,
            new_bill(
                &h.group,
                "Electricity",
                "100.00",
                date(2024, 5, 10),
                &h.alice,
                vec![share(&h.alice, "50"), share(&h.bob, "50")],
            ),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_share_payment_marks_bill_partially_paid() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let bill = half_and_half(&service, &h).await;

    let payment = service.record_payment(&h.bob.id, &bill.id, pay("50.00")).await.unwrap();
    assert_eq!(payment.from_user_id, h.bob.id);
    assert_eq!(payment.to_user_id, h.alice.id);
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.method.as_deref(), Some("pix"));

    let bill = service.get_bill(&h.alice.id, &bill.id).await.unwrap();
    assert_eq!(bill.status, BillStatus::PartiallyPaid);
    assert_eq!(bill.share_for(&h.bob.id).unwrap().status, ShareStatus::Paid);
    assert_eq!(bill.share_for(&h.alice.id).unwrap().status, ShareStatus::Pending);

    let payments = service.list_payments(&h.alice.id, &bill.id).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].id, payment.id);
}

#[tokio::test]
async fn test_all_shares_paid_marks_bill_paid() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let bill = half_and_half(&service, &h).await;

    service.record_payment(&h.bob.id, &bill.id, pay("50.00")).await.unwrap();
    service.record_payment(&h.alice.id, &bill.id, pay("50.00")).await.unwrap();

    let bill = service.get_bill(&h.alice.id, &bill.id).await.unwrap();
    assert_eq!(bill.status, BillStatus::Paid);
    assert_eq!(bill.pending_shares(), 0);
}

#[tokio::test]
async fn test_partial_payments_do_not_accumulate() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let bill = half_and_half(&service, &h).await;

    service.record_payment(&h.bob.id, &bill.id, pay("30.00")).await.unwrap();
    let after_first = service.get_bill(&h.alice.id, &bill.id).await.unwrap();
    assert_eq!(after_first.status, BillStatus::PartiallyPaid);
    assert_eq!(after_first.share_for(&h.bob.id).unwrap().status, ShareStatus::Pending);

    // 30 + 30 exceeds the share but neither payment covers it alone
    service.record_payment(&h.bob.id, &bill.id, pay("30.00")).await.unwrap();
    let after_second = service.get_bill(&h.alice.id, &bill.id).await.unwrap();
    assert_eq!(after_second.share_for(&h.bob.id).unwrap().status, ShareStatus::Pending);
    assert_eq!(service.list_payments(&h.bob.id, &bill.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_payment_on_behalf_of_member() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let bill = half_and_half(&service, &h).await;

    let payment = service
        .record_payment(
            &h.alice.id,
            &bill.id,
            NewPayment {
                from_user_id: Some(h.bob.id.clone()),
                amount: dec("50.00"),
                method: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(payment.from_user_id, h.bob.id);

    let bill = service.get_bill(&h.alice.id, &bill.id).await.unwrap();
    assert_eq!(bill.share_for(&h.bob.id).unwrap().status, ShareStatus::Paid);
}

#[tokio::test]
async fn test_paid_bill_never_regresses() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let bill = half_and_half(&service, &h).await;
    service.record_payment(&h.bob.id, &bill.id, pay("50.00")).await.unwrap();
    service.record_payment(&h.alice.id, &bill.id, pay("50.00")).await.unwrap();

    service.record_payment(&h.carol.id, &bill.id, pay("5.00")).await.unwrap();
    let bill = service.get_bill(&h.alice.id, &bill.id).await.unwrap();
    assert_eq!(bill.status, BillStatus::Paid);
}

#[tokio::test]
async fn test_payment_without_receiver_is_invalid_state() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let mut input = new_bill(
        &h.group,
        "Cleaner",
        "80.00",
        date(2024, 5, 10),
        &h.alice,
        vec![share(&h.alice, "50"), share(&h.bob, "50")],
    );
    input.receiver_id = None;
    input.receiver_name = Some("Maria the cleaner".to_string());
    let bill = service.create_bill(&h.alice.id, &h.environment.id, input).await.unwrap();

    let result = service.record_payment(&h.bob.id, &bill.id, pay("40.00")).await;
    assert!(matches!(result, Err(BillsplitError::InvalidState(_))));
    assert!(service.list_payments(&h.bob.id, &bill.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_on_missing_or_archived_bill() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let result = service.record_payment(&h.bob.id, "missing", pay("10.00")).await;
    assert!(matches!(result, Err(BillsplitError::NotFound(_))));

    let bill = half_and_half(&service, &h).await;
    service.archive_bill(&h.alice.id, &bill.id).await.unwrap();
    let result = service.record_payment(&h.bob.id, &bill.id, pay("50.00")).await;
    assert!(matches!(result, Err(BillsplitError::NotFound(_))));
}

#[tokio::test]
async fn test_payment_amount_validated() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let bill = half_and_half(&service, &h).await;

    let result = service.record_payment(&h.bob.id, &bill.id, pay("0")).await;
    assert!(matches!(result, Err(BillsplitError::ValidationError(ref e)) if e.field == "amount"));
}

#[tokio::test]
async fn test_payment_notifies_receiver_and_publishes() {
    let publisher = BroadcastPublisher::new(64);
    let mut events = publisher.subscribe();
    let service = create_service_with(publisher);
    let h = setup_household(&service).await;
    let bill = half_and_half(&service, &h).await;

    let payment = service.record_payment(&h.bob.id, &bill.id, pay("50.00")).await.unwrap();

    let notifications = service.list_notifications(&h.alice.id).await.unwrap();
    assert!(notifications.iter().any(|n| n.notification_type == "PAYMENT_RECEIVED"));

    let mut saw_payment = false;
    while let Ok(event) = events.try_recv() {
        if let LedgerEvent::PaymentCreated { group_id, payment: published } = event {
            assert_eq!(group_id, h.group.id);
            assert_eq!(published.id, payment.id);
            saw_payment = true;
        }
    }
    assert!(saw_payment);
}

#[tokio::test]
async fn test_failing_publisher_does_not_roll_back_payment() {
    let service = create_service_with(FailingPublisher);
    let h = setup_household(&service).await;
    let bill = half_and_half(&service, &h).await;

    let payment = service.record_payment(&h.bob.id, &bill.id, pay("50.00")).await;
    assert!(payment.is_ok());

    let bill = service.get_bill(&h.alice.id, &bill.id).await.unwrap();
    assert_eq!(bill.status, BillStatus::PartiallyPaid);
    assert_eq!(service.list_payments(&h.alice.id, &bill.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_former_member_can_settle_share() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let bill = service
        .create_bill(
            &h.alice.id,
            &h.environment.id,
            new_bill(
                &h.group,
                "Internet",
                "100.00",
                date(2024, 5, 10),
                &h.alice,
                vec![share(&h.bob, "50"), share(&h.carol, "50")],
            ),
        )
        .await
        .unwrap();
    service.leave_group(&h.bob.id, &h.group.id).await.unwrap();
    service.leave_group(&h.carol.id, &h.group.id).await.unwrap();

    // bob pays his own share after leaving
    service.record_payment(&h.bob.id, &bill.id, pay("50.00")).await.unwrap();
    // alice records carol's payment on her behalf
    service
        .record_payment(
            &h.alice.id,
            &bill.id,
            NewPayment {
                from_user_id: Some(h.carol.id.clone()),
                amount: dec("50.00"),
                method: None,
            },
        )
        .await
        .unwrap();

    let bill = service.get_bill(&h.alice.id, &bill.id).await.unwrap();
    assert_eq!(bill.status, BillStatus::Paid);
    assert_eq!(service.list_payments(&h.alice.id, &bill.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_former_member_without_share_cannot_pay() {
    let service = create_test_service();
    let h = setup_household(&service).await;
    let bill = half_and_half(&service, &h).await;
    service.leave_group(&h.carol.id, &h.group.id).await.unwrap();

    let result = service.record_payment(&h.carol.id, &bill.id, pay("10.00")).await;
    assert!(matches!(result, Err(BillsplitError::Forbidden(_))));
}
