//! HTTP-level integration tests for `/complaints/{id}/feedback`.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, seed_user, token_for};
use hostelcare_api::engine::lifecycle::{apply_transition, create_complaint, TransitionRequest};
use hostelcare_core::lifecycle::Actor;
use hostelcare_core::roles::ActorRole;
use hostelcare_db::models::complaint::CreateComplaint;
use hostelcare_db::models::user::User;
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    student: User,
    staff: User,
    complaint_id: i64,
}

fn step(status: &str, comment: Option<&str>) -> TransitionRequest {
    TransitionRequest {
        status: status.to_string(),
        comment: comment.map(str::to_string),
        ..Default::default()
    }
}

/// A student's complaint, assigned to a staff member and left `pending`.
async fn pending_complaint(pool: &PgPool) -> Fixture {
    let admin = seed_user(pool, "admin1", "admin").await;
    let student = seed_user(pool, "student1", "student").await;
    let staff = seed_user(pool, "staff1", "staff").await;

    let input = CreateComplaint {
        title: "Leaking tap".to_string(),
        category: "individual".to_string(),
        sub_category: Some("plumbing".to_string()),
        description: "The bathroom tap drips all night".to_string(),
        hostel: "Restu".to_string(),
        room_number: "M04-09-12A".to_string(),
        attachments: Vec::new(),
        initial_status: None,
        staff_in_charge: None,
        actions_to_be_taken: None,
    };
    let complaint = create_complaint(pool, &Actor::new(student.id, ActorRole::Student), &input)
        .await
        .unwrap();

    let assign = TransitionRequest {
        staff_in_charge: Some(staff.id),
        ..step("pending", None)
    };
    apply_transition(pool, &Actor::new(admin.id, ActorRole::Admin), complaint.id, &assign)
        .await
        .unwrap();

    Fixture {
        student,
        staff,
        complaint_id: complaint.id,
    }
}

async fn resolved_complaint(pool: &PgPool) -> Fixture {
    let fixture = pending_complaint(pool).await;
    let staff = Actor::new(fixture.staff.id, ActorRole::Staff);
    apply_transition(pool, &staff, fixture.complaint_id, &step("in_progress", None))
        .await
        .unwrap();
    apply_transition(
        pool,
        &staff,
        fixture.complaint_id,
        &step("resolved", Some("Replaced the washer")),
    )
    .await
    .unwrap();
    fixture
}

fn good_feedback() -> Value {
    json!({
        "overall": 5,
        "timeliness": 4,
        "effectiveness": 5,
        "ease_of_use": 3,
        "comment": "Quick fix, thanks",
    })
}

async fn submit(pool: &PgPool, token: &str, id: i64, body: Value) -> (StatusCode, Value) {
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/complaints/{id}/feedback");
    let response = post_json_auth(app, &uri, body, token).await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn fetch(pool: &PgPool, token: &str, id: i64) -> (StatusCode, Value) {
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/complaints/{id}/feedback");
    let response = get_auth(app, &uri, token).await;
    let status = response.status();
    (status, body_json(response).await)
}

// ---------------------------------------------------------------------------
// Test: submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feedback_before_resolution_is_rejected(pool: PgPool) {
    let fixture = pending_complaint(&pool).await;
    let token = token_for(&pool, &fixture.student).await;

    let (status, body) = submit(&pool, &token, fixture.complaint_id, good_feedback()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NOT_RESOLVED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feedback_accepted_once(pool: PgPool) {
    let fixture = resolved_complaint(&pool).await;
    let token = token_for(&pool, &fixture.student).await;

    let (status, body) = submit(&pool, &token, fixture.complaint_id, good_feedback()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["complaint_id"], fixture.complaint_id);
    assert_eq!(body["data"]["student_id"], fixture.student.id);
    assert_eq!(body["data"]["overall"], 5);
    assert_eq!(body["data"]["ease_of_use"], 3);
    assert_eq!(body["data"]["comment"], "Quick fix, thanks");

    let (status, body) = submit(&pool, &token, fixture.complaint_id, good_feedback()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_SUBMITTED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_rating_names_field(pool: PgPool) {
    let fixture = resolved_complaint(&pool).await;
    let token = token_for(&pool, &fixture.student).await;

    let mut body = good_feedback();
    body.as_object_mut().unwrap().remove("timeliness");
    let (status, body) = submit(&pool, &token, fixture.complaint_id, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field"], "timeliness");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_out_of_range_rating_names_field(pool: PgPool) {
    let fixture = resolved_complaint(&pool).await;
    let token = token_for(&pool, &fixture.student).await;

    let mut body = good_feedback();
    body["effectiveness"] = json!(6);
    let (status, body) = submit(&pool, &token, fixture.complaint_id, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "effectiveness");

    let mut body = good_feedback();
    body["overall"] = json!(0);
    let (status, body) = submit(&pool, &token, fixture.complaint_id, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "overall");

    // Rejected attempts leave the slot free.
    let (status, _) = submit(&pool, &token, fixture.complaint_id, good_feedback()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rating_wider_than_column_names_field(pool: PgPool) {
    let fixture = resolved_complaint(&pool).await;
    let token = token_for(&pool, &fixture.student).await;

    let mut body = good_feedback();
    body["overall"] = json!(40000);
    let (status, body) = submit(&pool, &token, fixture.complaint_id, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field"], "overall");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_owner_can_give_feedback(pool: PgPool) {
    let fixture = resolved_complaint(&pool).await;
    let other = seed_user(&pool, "student2", "student").await;

    let other_token = token_for(&pool, &other).await;
    let (status, body) = submit(&pool, &other_token, fixture.complaint_id, good_feedback()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let staff_token = token_for(&pool, &fixture.staff).await;
    let (status, _) = submit(&pool, &staff_token, fixture.complaint_id, good_feedback()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feedback_on_missing_complaint(pool: PgPool) {
    let student = seed_user(&pool, "student1", "student").await;
    let token = token_for(&pool, &student).await;

    let (status, body) = submit(&pool, &token, 424_242, good_feedback()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: reading feedback
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_feedback_before_and_after(pool: PgPool) {
    let fixture = resolved_complaint(&pool).await;
    let student_token = token_for(&pool, &fixture.student).await;
    let staff_token = token_for(&pool, &fixture.staff).await;

    let (status, body) = fetch(&pool, &student_token, fixture.complaint_id).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    submit(&pool, &student_token, fixture.complaint_id, good_feedback()).await;

    // The assigned staff member can read it too.
    let (status, body) = fetch(&pool, &staff_token, fixture.complaint_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["overall"], 5);
    assert_eq!(body["data"]["timeliness"], 4);
}
