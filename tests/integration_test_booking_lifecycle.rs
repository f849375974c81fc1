mod common;
use common::{athlete_request, at, date, TestApp};
use court_booking::domain::models::booking::{BookingOrigin, BookingRequest, BookingStatus, DisplayStatus, SportType};
use court_booking::domain::ports::Recipient;
use court_booking::error::AppError;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_evening_slot_full_lifecycle() {
    let app = TestApp::new().await;
    let court = app.seed_court(true).await;
    let service = &app.state.booking_service;

    let booking = service.create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-a")).await.unwrap();
    assert_eq!(booking.status, BookingStatus::AwaitingPayment);
    assert_eq!(booking.payment_reference.as_deref(), Some("pi_1"));
    assert_eq!(booking.payment_deadline, Some(booking.created_at + chrono::Duration::minutes(10)));
    assert_eq!(booking.end_time.format("%H:%M").to_string(), "19:00");
    assert_eq!(app.payments.intents.lock().unwrap()[0], (booking.id.clone(), 12_000));

    let err = service.create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-b")).await.unwrap_err();
    assert!(matches!(err, AppError::SlotConflict(_)), "got {:?}", err);
    assert_eq!(app.payments.created(), 1, "no intent is requested for a slot that is already taken");

    let confirmed = service.confirm_payment(&booking.id).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Pending);
    assert!(confirmed.payment_deadline.is_none());

    let paid = service.mark_status(&booking.id, BookingStatus::Paid).await.unwrap();
    assert_eq!(paid.status, BookingStatus::Paid);

    let view = service.get(&booking.id).await.unwrap();
    assert_eq!(view.display_status, DisplayStatus::Paid);

    app.clock.set(at("2031-03-10T19:00:00Z"));
    let view = service.get(&booking.id).await.unwrap();
    assert_eq!(view.booking.status, BookingStatus::Paid);
    assert_eq!(view.display_status, DisplayStatus::Finalized);
}

#[tokio::test]
async fn test_conflicting_create_leaves_existing_booking_untouched() {
    let app = TestApp::new().await;
    let court = app.seed_court(false).await;
    let service = &app.state.booking_service;

    let first = service.create(athlete_request(&court, "2031-03-10", &["18:00", "19:00"], "athlete-a")).await.unwrap();
    assert_eq!(first.status, BookingStatus::Pending);
    assert_eq!(first.slot_count, 2);

    let err = service.create(athlete_request(&court, "2031-03-10", &["19:00"], "athlete-b")).await.unwrap_err();
    assert!(matches!(err, AppError::SlotConflict(_)));

    let stored = app.state.booking_repo.load_for_court_date(&court.id, date("2031-03-10")).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, first.id);
    assert_eq!(stored[0].status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_adjacent_bookings_do_not_conflict() {
    let app = TestApp::new().await;
    let court = app.seed_court(false).await;
    let service = &app.state.booking_service;

    service.create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-a")).await.unwrap();
    service.create(athlete_request(&court, "2031-03-10", &["19:00"], "athlete-b")).await.unwrap();
    service.create(athlete_request(&court, "2031-03-10", &["17:00"], "athlete-c")).await.unwrap();

    let slots = service.availability(&court.id, date("2031-03-10")).await.unwrap();
    assert_eq!(slots.len(), 14 - 3);
}

#[tokio::test]
async fn test_non_contiguous_slots_are_rejected() {
    let app = TestApp::new().await;
    let court = app.seed_court(false).await;

    let err = app.state.booking_service
        .create(athlete_request(&court, "2031-03-10", &["18:00", "20:00"], "athlete-a"))
        .await.unwrap_err();
    assert!(matches!(err, AppError::InvalidSlotRange(_)));

    let err = app.state.booking_service
        .create(athlete_request(&court, "2031-03-10", &["18:30"], "athlete-a"))
        .await.unwrap_err();
    assert!(matches!(err, AppError::InvalidSlotRange(_)));
}

#[tokio::test]
async fn test_cancelled_booking_releases_the_slot() {
    let app = TestApp::new().await;
    let court = app.seed_court(false).await;
    let service = &app.state.booking_service;

    let booking = service.create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-a")).await.unwrap();
    service.mark_status(&booking.id, BookingStatus::Cancelled).await.unwrap();

    let again = service.create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-b")).await.unwrap();
    assert_eq!(again.status, BookingStatus::Pending);
}

#[tokio::test]
async fn test_arena_and_class_bookings_skip_payment() {
    let app = TestApp::new().await;
    let court = app.seed_court(true).await;
    let service = &app.state.booking_service;

    let mut request = athlete_request(&court, "2031-03-10", &["08:00", "09:00"], "coach-1");
    request.origin = BookingOrigin::Class;
    let class = service.create(request).await.unwrap();
    assert_eq!(class.status, BookingStatus::Pending);
    assert_eq!(app.payments.created(), 0);
}

#[tokio::test]
async fn test_guest_booking_gets_code_and_sms() {
    let app = TestApp::new().await;
    let court = app.seed_court(true).await;

    let booking = app.state.booking_service.create(BookingRequest {
        court_id: court.id.clone(),
        date: date("2031-03-10"),
        slots: vec![common::time("20:00")],
        sport: SportType::Futevolei,
        origin: BookingOrigin::Arena,
        athlete_id: None,
        guest_name: Some("Joana".into()),
        guest_phone: Some("+5511999990000".into()),
        is_public: false,
        players_needed: 0,
    }).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.verification_code.as_deref(), Some("123456"));
    assert!(booking.payment_reference.is_none());

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, Recipient::Sms("+5511999990000".into()));
    assert!(sent[0].1.contains("123456"));
}

#[tokio::test]
async fn test_guest_booking_requires_name() {
    let app = TestApp::new().await;
    let court = app.seed_court(false).await;

    let mut request = athlete_request(&court, "2031-03-10", &["18:00"], "x");
    request.athlete_id = None;
    request.origin = BookingOrigin::Arena;
    let err = app.state.booking_service.create(request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_gateway_failure_persists_nothing() {
    let app = TestApp::new().await;
    let court = app.seed_court(true).await;
    app.payments.fail.store(true, Ordering::SeqCst);

    let err = app.state.booking_service
        .create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-a"))
        .await.unwrap_err();
    assert!(matches!(err, AppError::Gateway(_)));

    let stored = app.state.booking_repo.load_for_court_date(&court.id, date("2031-03-10")).await.unwrap();
    assert!(stored.is_empty());
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_notifier_failure_does_not_abort_creation() {
    let app = TestApp::new().await;
    let court = app.seed_court(false).await;
    app.notifier.fail.store(true, Ordering::SeqCst);

    let booking = app.state.booking_service
        .create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-a"))
        .await.unwrap();
    assert!(app.state.booking_repo.find_by_id(&booking.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_mark_status_only_from_pending() {
    let app = TestApp::new().await;
    let court = app.seed_court(true).await;
    let service = &app.state.booking_service;

    let booking = service.create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-a")).await.unwrap();
    let err = service.mark_status(&booking.id, BookingStatus::Paid).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition(_)));

    service.confirm_payment(&booking.id).await.unwrap();
    service.mark_status(&booking.id, BookingStatus::Absent).await.unwrap();

    let err = service.mark_status(&booking.id, BookingStatus::Cancelled).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition(_)));

    let err = service.mark_status(&booking.id, BookingStatus::AwaitingPayment).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition(_)));
}

#[tokio::test]
async fn test_booking_in_the_past_is_rejected() {
    let app = TestApp::new().await;
    let court = app.seed_court(false).await;

    // Clock is 2031-03-03 12:00 UTC
    let err = app.state.booking_service
        .create(athlete_request(&court, "2031-03-03", &["11:00"], "athlete-a"))
        .await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    app.state.booking_service
        .create(athlete_request(&court, "2031-03-03", &["13:00"], "athlete-a"))
        .await.unwrap();
}

#[tokio::test]
async fn test_unknown_court_is_not_found() {
    let app = TestApp::new().await;
    let court = app.seed_court(false).await;
    let mut request = athlete_request(&court, "2031-03-10", &["18:00"], "athlete-a");
    request.court_id = "missing".into();

    let err = app.state.booking_service.create(request).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_unresponsive_gateway_aborts_creation() {
    let app = TestApp::new().await;
    let court = app.seed_court(true).await;
    app.payments.hang.store(true, Ordering::SeqCst);

    let err = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        app.state.booking_service.create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-a")),
    ).await.expect("creation must not wait forever").unwrap_err();
    assert!(matches!(err, AppError::Gateway(_)), "got {:?}", err);

    let stored = app.state.booking_repo.load_for_court_date(&court.id, date("2031-03-10")).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_unresponsive_notifier_does_not_block_creation() {
    let app = TestApp::new().await;
    let court = app.seed_court(false).await;
    app.notifier.hang.store(true, Ordering::SeqCst);

    let booking = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        app.state.booking_service.create(athlete_request(&court, "2031-03-10", &["18:00"], "athlete-a")),
    ).await.expect("creation must not wait forever").unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
}
