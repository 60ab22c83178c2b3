//! Integration tests for the timeline crate
//!
//! These exercise the complete flow: scripted provider pages and
//! activity reads in, merged thread-grouped snapshots out.

use std::sync::Arc;
use std::time::Duration;

use timeline::{
    EmailAddress, EmailEnvelope, InMemoryActivityStore, InMemoryMailProvider, InMemoryPinnedStore,
    InternalActivityKind, RawEmailMessage, RawInternalActivity, SyncStatus, ThreadGrouper,
    TimelineConfig, TimelineEngine, TimelineView,
};

/// Helper to create raw emails
fn make_email(id: &str, thread_id: Option<&str>, subject: &str, date: &str) -> RawEmailMessage {
    RawEmailMessage {
        id: id.to_string(),
        thread_id: thread_id.map(str::to_string),
        subject: subject.to_string(),
        snippet: format!("snippet for {}", id),
        from: EmailAddress::with_name("Ann Example", "ann@example.com"),
        to: vec![EmailAddress::new("me@crm.example")],
        cc: vec![],
        bcc: vec![],
        is_read: false,
        is_important: false,
        body_text: Some(format!("body of {}", id)),
        body_html: None,
        labels: vec!["INBOX".to_string()],
        attachments: vec![],
        date: date.to_string(),
    }
}

struct Setup {
    provider: Arc<InMemoryMailProvider>,
    activities: Arc<InMemoryActivityStore>,
    pinned: Arc<InMemoryPinnedStore>,
    engine: TimelineEngine,
}

fn setup() -> Setup {
    let provider = Arc::new(InMemoryMailProvider::new());
    let activities = Arc::new(InMemoryActivityStore::new());
    let pinned = Arc::new(InMemoryPinnedStore::new());
    let engine = TimelineEngine::new(
        provider.clone(),
        activities.clone(),
        pinned.clone(),
        TimelineConfig::default(),
    );
    Setup {
        provider,
        activities,
        pinned,
        engine,
    }
}

fn view() -> TimelineView {
    TimelineView::new("c1", "ann@example.com", "u1")
}

#[test]
fn test_full_timeline_flow() {
    let mut setup = setup();

    setup.activities.set_activities(
        "c1",
        vec![
            RawInternalActivity::new("a1", InternalActivityKind::Note, "2024-01-02T09:00:00Z")
                .content("met at the expo"),
            RawInternalActivity::new(
                "a2",
                InternalActivityKind::EmailSent,
                "2024-01-05T09:00:00Z",
            )
            .details(EmailEnvelope {
                subject: "Proposal".to_string(),
                body_text: Some("see attached".to_string()),
                to: vec![EmailAddress::new("ann@example.com")],
                ..Default::default()
            }),
        ],
    );
    setup.provider.set_pages(
        "ann@example.com",
        vec![vec![
            make_email("m1", Some("T1"), "Budget", "2024-01-01T10:00:00Z"),
            make_email("m2", Some("T1"), "Re: Budget", "2024-01-03T10:00:00Z"),
            make_email("m3", None, "Intro", "2024-01-04T10:00:00Z"),
        ]],
    );

    let snapshot = setup.engine.snapshot(&view());

    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.internal_count, 2);
    assert_eq!(snapshot.emails_count, 3);
    assert_eq!(snapshot.sync_status, SyncStatus::Completed);

    // Two internal + one thread + one standalone email
    assert_eq!(snapshot.activities.len(), 4);
    let ids: Vec<&str> = snapshot.activities.iter().map(|a| a.id.as_str()).collect();
    // Recency order: sent email (Jan 5), intro (Jan 4), thread (latest Jan 3), note (Jan 2)
    assert_eq!(ids, ["a2", "m3", "thread-T1", "a1"]);

    let thread = snapshot
        .activities
        .iter()
        .find_map(|a| a.as_thread())
        .expect("thread activity present");
    assert_eq!(thread.email_count(), 2);
    assert_eq!(thread.display.subject, "Re: Budget");

    // Oldest loaded email drives the relationship-since date
    assert_eq!(
        snapshot
            .oldest_email_date
            .expect("oldest email date present")
            .to_rfc3339(),
        "2024-01-01T10:00:00+00:00"
    );
}

#[test]
fn test_thread_promotion_threshold() {
    let mut setup = setup();
    setup.provider.set_pages(
        "ann@example.com",
        vec![vec![make_email(
            "m1",
            Some("T1"),
            "Solo",
            "2024-01-01T00:00:00Z",
        )]],
    );

    let snapshot = setup.engine.snapshot(&view());
    // A single email never becomes a one-element thread
    assert_eq!(snapshot.activities.len(), 1);
    assert!(snapshot.activities[0].is_email());
    assert_eq!(snapshot.activities[0].id, "m1");
}

#[test]
fn test_subject_similarity_never_groups() {
    let mut setup = setup();
    setup.provider.set_pages(
        "ann@example.com",
        vec![vec![
            make_email("m1", Some("optimistic-abc"), "Re: Demo", "2024-01-01T00:00:00Z"),
            make_email("m2", None, "Re: Demo", "2024-01-02T00:00:00Z"),
        ]],
    );

    let snapshot = setup.engine.snapshot(&view());
    assert_eq!(snapshot.activities.len(), 2);
    assert!(snapshot.activities.iter().all(|a| a.is_email()));
}

#[test]
fn test_chronological_thread_ordering() {
    let mut setup = setup();
    setup.provider.set_pages(
        "ann@example.com",
        vec![vec![
            make_email("m3", Some("T1"), "Re: Plan", "2024-01-03T00:00:00Z"),
            make_email("m1", Some("T1"), "Plan", "2024-01-01T00:00:00Z"),
            make_email("m2", Some("T1"), "Re: Plan", "2024-01-02T00:00:00Z"),
        ]],
    );

    let snapshot = setup.engine.snapshot(&view());
    let thread = snapshot
        .activities
        .iter()
        .find_map(|a| a.as_thread())
        .unwrap();

    let dates: Vec<String> = thread
        .emails
        .iter()
        .map(|e| e.timestamp.to_rfc3339())
        .collect();
    assert_eq!(
        dates,
        [
            "2024-01-01T00:00:00+00:00",
            "2024-01-02T00:00:00+00:00",
            "2024-01-03T00:00:00+00:00"
        ]
    );
    assert_eq!(thread.latest_email().unwrap().id, "m3");
}

#[test]
fn test_thread_pin_propagation() {
    let mut setup = setup();
    setup.provider.set_pages(
        "ann@example.com",
        vec![vec![
            make_email("m1", Some("T1"), "Plan", "2024-01-01T00:00:00Z"),
            make_email("m2", Some("T1"), "Re: Plan", "2024-01-02T00:00:00Z"),
            make_email("m3", Some("T1"), "Re: Plan", "2024-01-03T00:00:00Z"),
        ]],
    );
    setup.pinned.pin("m2");

    let snapshot = setup.engine.snapshot(&view());
    let thread_activity = snapshot
        .activities
        .iter()
        .find(|a| a.as_thread().is_some())
        .unwrap();
    assert!(thread_activity.is_pinned);
}

#[test]
fn test_sync_failure_preserves_prior_page() {
    let mut setup = setup();
    let first_page: Vec<RawEmailMessage> = (0..20)
        .map(|i| {
            make_email(
                &format!("m{}", i),
                None,
                "Update",
                &format!("2024-01-{:02}T00:00:00Z", i + 1),
            )
        })
        .collect();
    setup.provider.set_pages(
        "ann@example.com",
        vec![first_page, vec![make_email("extra", None, "Old", "2023-01-01T00:00:00Z")]],
    );

    let snapshot = setup.engine.snapshot(&view());
    assert_eq!(snapshot.emails_count, 20);
    assert!(snapshot.has_more_emails);

    setup.provider.fail_next_fetch("ann@example.com");
    assert_eq!(setup.engine.load_more_emails(), SyncStatus::Failed);

    let snapshot = setup.engine.snapshot(&view());
    assert_eq!(snapshot.sync_status, SyncStatus::Failed);
    // The original 20 are still there, not an empty or partial set
    assert_eq!(snapshot.emails_count, 20);

    // Manual retry recovers
    assert_eq!(setup.engine.refresh_emails(), SyncStatus::Completed);
    let snapshot = setup.engine.snapshot(&view());
    assert_eq!(snapshot.sync_status, SyncStatus::Completed);
    assert_eq!(snapshot.emails_count, 20);
}

#[test]
fn test_snapshot_tracks_growing_email_set() {
    let mut setup = setup();
    setup.provider.set_pages(
        "ann@example.com",
        vec![
            vec![
                make_email("a", Some("T1"), "Plan", "2024-01-01T00:00:00Z"),
                make_email("b", Some("T1"), "Re: Plan", "2024-01-02T00:00:00Z"),
                make_email("c", None, "Other", "2024-01-03T00:00:00Z"),
            ],
            vec![make_email("d", Some("T1"), "Re: Plan", "2024-01-04T00:00:00Z")],
        ],
    );

    let snapshot = setup.engine.snapshot(&view());
    let thread = snapshot.activities.iter().find_map(|a| a.as_thread()).unwrap();
    assert_eq!(thread.email_count(), 2);

    // Growing the id set must not serve the cached 2-member grouping
    setup.engine.load_more_emails();
    let snapshot = setup.engine.snapshot(&view());
    let thread = snapshot.activities.iter().find_map(|a| a.as_thread()).unwrap();
    assert_eq!(thread.email_count(), 3);
    assert_eq!(thread.latest_email().unwrap().id, "d");
}

#[test]
fn test_history_sync_through_engine() {
    let mut setup = setup();
    setup.provider.set_pages(
        "ann@example.com",
        vec![
            vec![make_email("m1", None, "Recent", "2024-02-01T00:00:00Z")],
            vec![make_email("m0", None, "Ancient", "2020-05-01T00:00:00Z")],
        ],
    );

    let snapshot = setup.engine.snapshot(&view());
    assert_eq!(snapshot.emails_count, 1);

    assert_eq!(setup.engine.sync_email_history(), SyncStatus::Completed);
    let snapshot = setup.engine.snapshot(&view());
    assert_eq!(snapshot.emails_count, 2);
    assert!(!snapshot.has_more_emails);
    assert_eq!(
        snapshot.oldest_email_date.unwrap().to_rfc3339(),
        "2020-05-01T00:00:00+00:00"
    );
}

#[test]
fn test_grouper_standalone_usage() {
    // The grouper is usable on its own with transformed activities
    let mut grouper = ThreadGrouper::new(8, Duration::from_secs(60));
    let result = grouper.group(&[]);
    assert!(result.is_empty());
}

#[test]
fn test_config_file_drives_engine() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"autoInitialize": false}}"#).unwrap();
    let config = TimelineConfig::from_json_file(file.path()).unwrap();
    assert!(!config.auto_initialize);

    // The flag seeds views built through the engine
    let provider = Arc::new(InMemoryMailProvider::new());
    let mut engine = TimelineEngine::new(
        provider.clone(),
        Arc::new(InMemoryActivityStore::new()),
        Arc::new(InMemoryPinnedStore::new()),
        config,
    );
    let configured = engine.default_view("c1", "ann@example.com", "u1");
    assert!(!configured.auto_initialize);
    let snapshot = engine.snapshot(&configured);
    assert_eq!(provider.fetch_count("ann@example.com"), 0);
    assert_eq!(snapshot.sync_status, SyncStatus::Idle);
}
