//! Integration tests for the complaint repositories.
//!
//! Exercises the repository layer against a real database:
//! - Creation round-trip and filtered listing
//! - Conditional transition writes and their history rows
//! - Assignment records
//! - Feedback gating on resolved status

use assert_matches::assert_matches;
use hostelcare_core::complaint::{Attachment, ComplaintStatus};
use hostelcare_core::roles::ActorRole;
use hostelcare_db::models::assignment::NewAssignment;
use hostelcare_db::models::complaint::{
    ComplaintFilter, CreateComplaint, InitialState, StatusChange,
};
use hostelcare_db::models::feedback::{CreateFeedback, FeedbackInsert};
use hostelcare_db::models::user::CreateUser;
use hostelcare_db::repositories::{
    AssignmentRepo, ComplaintRepo, FeedbackRepo, StatusLogRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, username: &str, role: &str) -> i64 {
    let role = ActorRole::from_name(role).unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            full_name: None,
            role,
        },
    )
    .await
    .unwrap()
    .id
}

fn broken_door() -> CreateComplaint {
    CreateComplaint {
        title: "Broken Door".to_string(),
        category: "individual".to_string(),
        sub_category: Some("carpentry".to_string()),
        description: "The door of my room does not close".to_string(),
        hostel: "Restu".to_string(),
        room_number: "M04-09-12A".to_string(),
        attachments: vec![Attachment {
            url: "https://files.example.com/door.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        }],
        initial_status: None,
        staff_in_charge: None,
        actions_to_be_taken: None,
    }
}

fn change(
    complaint_id: i64,
    version: i32,
    from: ComplaintStatus,
    to: ComplaintStatus,
    actor_id: i64,
) -> StatusChange {
    StatusChange {
        complaint_id,
        expected_version: version,
        expected_status: from,
        to,
        actor_id,
        comment: None,
        assignment: None,
    }
}

// ---------------------------------------------------------------------------
// Test: creation and listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_list_round_trip(pool: PgPool) {
    let student = seed_user(&pool, "student1", "student").await;

    let created = ComplaintRepo::create(&pool, student, &broken_door(), &InitialState::New)
        .await
        .unwrap();
    assert_eq!(created.status, ComplaintStatus::New);
    assert_eq!(created.version, 0);
    assert!(created.staff_in_charge.is_none());

    let filter = ComplaintFilter {
        status: Some(ComplaintStatus::New),
        ..Default::default()
    };
    let listed = ComplaintRepo::list_filtered(&pool, &filter, 50, 0)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    let c = &listed[0];
    assert_eq!(c.id, created.id);
    assert_eq!(c.title, "Broken Door");
    assert_eq!(c.category, "individual");
    assert_eq!(c.hostel, "Restu");
    assert_eq!(c.room_number, "M04-09-12A");
    assert_eq!(c.attachments.0.len(), 1);
    assert_eq!(c.attachments.0[0].content_type, "image/jpeg");

    // A brand-new complaint has no history.
    let history = StatusLogRepo::list_for_complaint(&pool, created.id)
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_and_orders_newest_first(pool: PgPool) {
    let alice = seed_user(&pool, "alice", "student").await;
    let bob = seed_user(&pool, "bob", "student").await;

    let first = ComplaintRepo::create(&pool, alice, &broken_door(), &InitialState::New)
        .await
        .unwrap();
    let second = ComplaintRepo::create(&pool, alice, &broken_door(), &InitialState::New)
        .await
        .unwrap();
    ComplaintRepo::create(&pool, bob, &broken_door(), &InitialState::New)
        .await
        .unwrap();

    let filter = ComplaintFilter {
        owner_id: Some(alice),
        ..Default::default()
    };
    let listed = ComplaintRepo::list_filtered(&pool, &filter, 50, 0)
        .await
        .unwrap();
    let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let page = ComplaintRepo::list_filtered(&pool, &filter, 1, 1)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, first.id);

    let none = ComplaintRepo::list_filtered(
        &pool,
        &ComplaintFilter {
            status: Some(ComplaintStatus::Resolved),
            ..Default::default()
        },
        50,
        0,
    )
    .await
    .unwrap();
    assert!(none.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_assigned_writes_assignment_and_log(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let student = seed_user(&pool, "student1", "student").await;
    let staff = seed_user(&pool, "staff1", "staff").await;

    let initial = InitialState::Assigned(NewAssignment {
        staff_id: staff,
        assigned_by: admin,
        actions_to_be_taken: Some("Replace hinge".to_string()),
    });
    let created = ComplaintRepo::create(&pool, student, &broken_door(), &initial)
        .await
        .unwrap();
    assert_eq!(created.status, ComplaintStatus::Pending);
    assert_eq!(created.staff_in_charge, Some(staff));

    let history = StatusLogRepo::list_for_complaint(&pool, created.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, ComplaintStatus::Pending);
    assert_eq!(history[0].actor_id, admin);

    let assignments = AssignmentRepo::list_for_complaint(&pool, created.id)
        .await
        .unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].staff_id, staff);
    assert_eq!(
        assignments[0].actions_to_be_taken.as_deref(),
        Some("Replace hinge")
    );
}

// ---------------------------------------------------------------------------
// Test: conditional transition writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_apply_transition_writes_log_and_bumps_version(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let student = seed_user(&pool, "student1", "student").await;
    let staff = seed_user(&pool, "staff1", "staff").await;
    let complaint = ComplaintRepo::create(&pool, student, &broken_door(), &InitialState::New)
        .await
        .unwrap();

    let mut assign = change(
        complaint.id,
        0,
        ComplaintStatus::New,
        ComplaintStatus::Pending,
        admin,
    );
    assign.assignment = Some(NewAssignment {
        staff_id: staff,
        assigned_by: admin,
        actions_to_be_taken: None,
    });
    let applied = ComplaintRepo::apply_transition(&pool, &assign)
        .await
        .unwrap()
        .expect("precondition holds");

    assert_eq!(applied.complaint.status, ComplaintStatus::Pending);
    assert_eq!(applied.complaint.version, 1);
    assert_eq!(applied.complaint.staff_in_charge, Some(staff));
    assert_eq!(applied.log_entry.status, ComplaintStatus::Pending);
    assert_eq!(applied.log_entry.created_at, applied.complaint.updated_at);
    assert!(applied.assignment.is_some());

    let mut start = change(
        complaint.id,
        1,
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        staff,
    );
    start.comment = Some("  On my way  ".to_string());
    let applied = ComplaintRepo::apply_transition(&pool, &start)
        .await
        .unwrap()
        .expect("precondition holds");
    assert_eq!(applied.log_entry.comment.as_deref(), Some("On my way"));
    assert!(applied.assignment.is_none());

    let latest = StatusLogRepo::latest_for_complaint(&pool, complaint.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.status, ComplaintStatus::InProgress);

    let history = StatusLogRepo::list_for_complaint(&pool, complaint.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].created_at <= history[1].created_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_version_writes_nothing(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let student = seed_user(&pool, "student1", "student").await;
    let staff = seed_user(&pool, "staff1", "staff").await;
    let complaint = ComplaintRepo::create(&pool, student, &broken_door(), &InitialState::New)
        .await
        .unwrap();

    let mut assign = change(
        complaint.id,
        0,
        ComplaintStatus::New,
        ComplaintStatus::Pending,
        admin,
    );
    assign.assignment = Some(NewAssignment {
        staff_id: staff,
        assigned_by: admin,
        actions_to_be_taken: None,
    });
    ComplaintRepo::apply_transition(&pool, &assign)
        .await
        .unwrap()
        .expect("first write applies");

    // Same request again: the version it read is gone.
    let second = ComplaintRepo::apply_transition(&pool, &assign)
        .await
        .unwrap();
    assert!(second.is_none());

    let history = StatusLogRepo::list_for_complaint(&pool, complaint.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    let assignments = AssignmentRepo::list_for_complaint(&pool, complaint.id)
        .await
        .unwrap();
    assert_eq!(assignments.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_on_missing_complaint_returns_none(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let result = ComplaintRepo::apply_transition(
        &pool,
        &change(
            999_999,
            0,
            ComplaintStatus::Pending,
            ComplaintStatus::InProgress,
            admin,
        ),
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_count_by_status(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let student = seed_user(&pool, "student1", "student").await;
    let staff = seed_user(&pool, "staff1", "staff").await;

    ComplaintRepo::create(&pool, student, &broken_door(), &InitialState::New)
        .await
        .unwrap();
    ComplaintRepo::create(&pool, student, &broken_door(), &InitialState::New)
        .await
        .unwrap();
    ComplaintRepo::create(
        &pool,
        student,
        &broken_door(),
        &InitialState::Assigned(NewAssignment {
            staff_id: staff,
            assigned_by: admin,
            actions_to_be_taken: None,
        }),
    )
    .await
    .unwrap();

    let counts = ComplaintRepo::count_by_status(&pool, &ComplaintFilter::default())
        .await
        .unwrap();
    let pairs: Vec<(ComplaintStatus, i64)> = counts.iter().map(|c| (c.status, c.count)).collect();
    assert_eq!(
        pairs,
        vec![(ComplaintStatus::New, 2), (ComplaintStatus::Pending, 1)]
    );

    let staff_counts = ComplaintRepo::count_by_status(
        &pool,
        &ComplaintFilter {
            assigned_staff_id: Some(staff),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(staff_counts.len(), 1);
    assert_eq!(staff_counts[0].count, 1);
}

// ---------------------------------------------------------------------------
// Test: feedback
// ---------------------------------------------------------------------------

fn feedback_for(complaint_id: i64, student_id: i64) -> CreateFeedback {
    CreateFeedback {
        complaint_id,
        student_id,
        overall: 5,
        timeliness: 4,
        effectiveness: 5,
        ease_of_use: 3,
        comment: Some("Fixed quickly".to_string()),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feedback_requires_resolved_and_is_unique(pool: PgPool) {
    let admin = seed_user(&pool, "admin1", "admin").await;
    let student = seed_user(&pool, "student1", "student").await;
    let staff = seed_user(&pool, "staff1", "staff").await;
    let complaint = ComplaintRepo::create(
        &pool,
        student,
        &broken_door(),
        &InitialState::Assigned(NewAssignment {
            staff_id: staff,
            assigned_by: admin,
            actions_to_be_taken: None,
        }),
    )
    .await
    .unwrap();

    let early = FeedbackRepo::create_for_resolved(&pool, &feedback_for(complaint.id, student))
        .await
        .unwrap();
    assert_matches!(early, FeedbackInsert::NotResolved(ComplaintStatus::Pending));

    let steps = [
        (0, ComplaintStatus::Pending, ComplaintStatus::InProgress),
        (1, ComplaintStatus::InProgress, ComplaintStatus::Resolved),
    ];
    for (version, from, to) in steps {
        ComplaintRepo::apply_transition(&pool, &change(complaint.id, version, from, to, staff))
            .await
            .unwrap()
            .expect("precondition holds");
    }

    let created = FeedbackRepo::create_for_resolved(&pool, &feedback_for(complaint.id, student))
        .await
        .unwrap();
    assert_matches!(created, FeedbackInsert::Created(ref f) if f.overall == 5);

    let again = FeedbackRepo::create_for_resolved(&pool, &feedback_for(complaint.id, student))
        .await
        .unwrap();
    assert_matches!(again, FeedbackInsert::AlreadySubmitted);

    let stored = FeedbackRepo::find_by_complaint(&pool, complaint.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.ease_of_use, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feedback_for_missing_complaint(pool: PgPool) {
    let student = seed_user(&pool, "student1", "student").await;
    let result = FeedbackRepo::create_for_resolved(&pool, &feedback_for(424_242, student))
        .await
        .unwrap();
    assert_matches!(result, FeedbackInsert::ComplaintMissing);
}
