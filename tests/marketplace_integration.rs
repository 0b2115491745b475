// SPDX-License-Identifier: MIT

//! End-to-end marketplace tests against a real MongoDB.
//!
//! These exercise the full router. They are skipped unless MONGODB_URI
//! points at a reachable instance (e.g. a local mongod).

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use mongodb::bson::oid::ObjectId;
use rentnest::error::AppError;
use rentnest::models::OtpRecord;
use rentnest::services::otp;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

fn unique_email(tag: &str) -> String {
    format!("{}-{}@example.com", tag, ObjectId::new().to_hex())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register a user, returning (user id hex, jwt).
async fn register(app: &Router, email: &str, extra: Value) -> (String, String) {
    let mut data = json!({
        "name": "Test User",
        "email": email,
        "password": "secret",
    });
    if let (Value::Object(base), Value::Object(extra)) = (&mut data, extra) {
        base.extend(extra);
    }

    let (status, body) = send(app, "POST", "/register", None, Some(json!({ "data": data }))).await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);

    let id = body["data"]["_id"]["$oid"].as_str().unwrap().to_string();
    let jwt = body["jwt"].as_str().unwrap().to_string();
    (id, jwt)
}

async fn create_post(app: &Router, jwt: &str, data: Value) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/create-post",
        Some(jwt),
        Some(json!({ "data": data })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create-post failed: {}", body);
    body["data"]["_id"]["$oid"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_duplicate_register_is_conflict() {
    require_mongo!();
    let (app, state) = common::create_test_app_with_db().await;

    let email = unique_email("dup");
    register(&app, &email, json!({})).await;

    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "data": {
            "name": "Other",
            "email": email,
            "password": "other",
        }})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    // No second record was written.
    let stored = state.db.find_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(stored.name, "Test User");
}

#[tokio::test]
async fn test_login_gating_on_verified_flag() {
    require_mongo!();
    let (app, _) = common::create_test_app_with_db().await;

    // Explicitly unverified: login always fails, right password or not.
    let email = unique_email("unverified");
    let (id, jwt) = register(&app, &email, json!({ "isVerified": false })).await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User is not verified");

    // Wrong password is NotFound (exact pair lookup), not Unauthorized.
    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Flip the flag, login works.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/update-user/{}", id),
        Some(&jwt),
        Some(json!({ "data": { "isVerified": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["jwt"].is_string());
}

#[tokio::test]
async fn test_login_allows_unset_verified_flag() {
    require_mongo!();
    let (app, _) = common::create_test_app_with_db().await;

    // Carried-over quirk: only a stored literal `false` blocks login.
    // A user registered without the flag passes. Revisit with the
    // product owner before relying on this.
    let email = unique_email("unset");
    register(&app, &email, json!({})).await;

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_banned_user_cannot_login() {
    require_mongo!();
    let (app, _) = common::create_test_app_with_db().await;

    let email = unique_email("banned");
    let (id, jwt) = register(&app, &email, json!({ "isVerified": true })).await;

    send(
        &app,
        "PUT",
        &format!("/update-user/{}", id),
        Some(&jwt),
        Some(json!({ "data": { "isBanned": true } })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User is banned");
}

#[tokio::test]
async fn test_otp_latest_wins_without_expiring_older_records() {
    require_mongo!();
    let (_, state) = common::create_test_app_with_db().await;
    let email = unique_email("otp");

    // Two codes, the second one newer.
    state
        .db
        .insert_otp(&OtpRecord {
            email: email.clone(),
            otp: "1111".to_string(),
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        })
        .await
        .unwrap();
    state
        .db
        .insert_otp(&OtpRecord {
            email: email.clone(),
            otp: "2222".to_string(),
            timestamp: "2026-01-02T00:00:00.000Z".to_string(),
        })
        .await
        .unwrap();

    // Latest wins.
    otp::verify(&state.db, &email, "2222").await.unwrap();

    // The superseded code no longer verifies, even though the record
    // still exists in the store.
    let err = otp::verify(&state.db, &email, "1111").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidOtp));

    // No auto-expiry: the current code can be replayed until a newer
    // one is issued.
    otp::verify(&state.db, &email, "2222").await.unwrap();

    // Unknown email is NotFound, not Invalid.
    let err = otp::verify(&state.db, &unique_email("nootp"), "1234")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_otp_issue_persists_before_delivery() {
    require_mongo!();
    let (_, state) = common::create_test_app_with_db().await;
    let email = unique_email("issue");

    otp::issue(&state.db, &state.mailer, &email).await.unwrap();

    let record = state.db.latest_otp(&email).await.unwrap().unwrap();
    assert_eq!(record.otp.len(), 4);

    // Issuing again supersedes the first code.
    otp::issue(&state.db, &state.mailer, &email).await.unwrap();
    let latest = state.db.latest_otp(&email).await.unwrap().unwrap();
    assert!(latest.timestamp >= record.timestamp);
}

#[tokio::test]
async fn test_favorites_duplicates_expansion_and_remove_all() {
    require_mongo!();
    let (app, state) = common::create_test_app_with_db().await;

    let email = unique_email("fav");
    let (user_id, jwt) = register(&app, &email, json!({})).await;

    let p1 = create_post(&app, &jwt, json!({ "location": "Dhanmondi" })).await;
    let p2 = create_post(&app, &jwt, json!({ "location": "Uttara" })).await;

    // A fresh user has no favorites list at all: membership is NotFound.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/specific-favorite/{}/{}", user_id, p1),
        Some(&jwt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Add p1 twice and p2 once. No dedup at the store layer.
    for post_id in [&p1, &p1, &p2] {
        let (status, _) = send(
            &app,
            "POST",
            "/create-favorite",
            Some(&jwt),
            Some(json!({ "userId": user_id, "postId": post_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let oid = ObjectId::parse_str(&user_id).unwrap();
    let stored = state.db.get_user(&oid).await.unwrap().unwrap();
    assert_eq!(
        stored.favorite_posts.clone().unwrap(),
        vec![p1.clone(), p1.clone(), p2.clone()]
    );

    // Membership holds despite the duplicate.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/specific-favorite/{}/{}", user_id, p1),
        Some(&jwt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isFavorite"], true);

    // Expansion resolves in order, duplicates included.
    let (_, body) = send(
        &app,
        "GET",
        &format!("/user-favorites/{}", user_id),
        Some(&jwt),
        None,
    )
    .await;
    let ids: Vec<String> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["_id"]["$oid"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, [p1.clone(), p1.clone(), p2.clone()]);

    // Deleting a post leaves a stale reference, silently skipped.
    send(
        &app,
        "DELETE",
        &format!("/delete-post/{}", p2),
        Some(&jwt),
        None,
    )
    .await;
    let (_, body) = send(
        &app,
        "GET",
        &format!("/user-favorites/{}", user_id),
        Some(&jwt),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Removal pulls ALL occurrences.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/update-favorite/{}", user_id),
        Some(&jwt),
        Some(json!({ "postId": p1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stored = state.db.get_user(&oid).await.unwrap().unwrap();
    assert_eq!(stored.favorite_posts.clone().unwrap(), vec![p2.clone()]);

    // The list now exists, so a miss is a false answer, not NotFound.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/specific-favorite/{}/{}", user_id, p1),
        Some(&jwt),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isFavorite"], false);

    // Favoriting for a nonexistent user is NotFound.
    let (status, _) = send(
        &app,
        "POST",
        "/create-favorite",
        Some(&jwt),
        Some(json!({ "userId": ObjectId::new().to_hex(), "postId": p1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_activates_ads_exactly_once() {
    require_mongo!();
    let (app, _) = common::create_test_app_with_db().await;

    let email = unique_email("pay");
    let (_, jwt) = register(&app, &email, json!({})).await;
    let post_id = create_post(&app, &jwt, json!({ "location": "Banani" })).await;

    let session = format!("cs_{}", ObjectId::new().to_hex());
    let payload = json!({
        "sessionId": session,
        "postId": post_id,
        "amount": 500.0,
        "method": "card",
    });

    let (status, body) = send(&app, "POST", "/make-payment", Some(&jwt), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    // The response echoes the payload as submitted.
    assert_eq!(body["data"], payload);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/single-post/{}", post_id),
        Some(&jwt),
        None,
    )
    .await;
    assert_eq!(body["data"]["isAds"], true);

    // Replaying the session is Conflict, with no second ledger entry.
    let (status, _) = send(&app, "POST", "/make-payment", Some(&jwt), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, "GET", "/all-subscriptions", Some(&jwt), None).await;
    let entries = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["sessionId"] == session.as_str())
        .count();
    assert_eq!(entries, 1);

    // The post stays promoted.
    let (_, body) = send(
        &app,
        "GET",
        &format!("/single-post/{}", post_id),
        Some(&jwt),
        None,
    )
    .await;
    assert_eq!(body["data"]["isAds"], true);

    // A session against a nonexistent post is NotFound.
    let (status, _) = send(
        &app,
        "POST",
        "/make-payment",
        Some(&jwt),
        Some(json!({
            "sessionId": format!("cs_{}", ObjectId::new().to_hex()),
            "postId": ObjectId::new().to_hex(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notification_two_phase_visibility() {
    require_mongo!();
    let (app, _) = common::create_test_app_with_db().await;

    let email = unique_email("notif");
    let (_, jwt) = register(&app, &email, json!({})).await;

    let from = ObjectId::new().to_hex();
    let to = ObjectId::new().to_hex();
    let post_id = ObjectId::new().to_hex();

    // Created with the receiver tag NOT at its sentinel: addressed to
    // `to`, but not yet delivered.
    let (status, body) = send(
        &app,
        "POST",
        "/create-notification",
        Some(&jwt),
        Some(json!({
            "from": from,
            "to": to,
            "postId": post_id,
            "senderTo": "claimed",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["_id"]["$oid"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        "GET",
        &format!("/to-notifications/{}", to),
        Some(&jwt),
        None,
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // The sender side defaults to its sentinel, so the outbox sees it.
    let (_, body) = send(
        &app,
        "GET",
        &format!("/from-notifications/{}", from),
        Some(&jwt),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Flipping senderTo alone makes it appear in the inbox.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/update-notification/{}", id),
        Some(&jwt),
        Some(json!({ "data": { "senderTo": "receiver" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/to-notifications/{}", to),
        Some(&jwt),
        None,
    )
    .await;
    let inbox = body["data"].as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["_id"]["$oid"], id.as_str());

    // Releasing the sender tag hides it from the outbox without
    // touching inbox visibility.
    send(
        &app,
        "PATCH",
        &format!("/update-notification/{}", id),
        Some(&jwt),
        Some(json!({ "data": { "senderFrom": "done" } })),
    )
    .await;

    let (_, body) = send(
        &app,
        "GET",
        &format!("/from-notifications/{}", from),
        Some(&jwt),
        None,
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // The post view is not tag-gated.
    let (_, body) = send(
        &app,
        "GET",
        &format!("/post-notifications/{}", post_id),
        Some(&jwt),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_partial_update_leaves_other_fields_untouched() {
    require_mongo!();
    let (app, state) = common::create_test_app_with_db().await;

    let email = unique_email("patch");
    let (id, jwt) = register(
        &app,
        &email,
        json!({
            "phone": "111",
            "location": "Gulshan",
            "accountType": "owner",
            "isVerified": true,
        }),
    )
    .await;

    let oid = ObjectId::parse_str(&id).unwrap();
    let before = state.db.get_user(&oid).await.unwrap().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/update-user/{}", id),
        Some(&jwt),
        Some(json!({ "data": { "phone": "555" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let after = state.db.get_user(&oid).await.unwrap().unwrap();
    assert_eq!(after.phone.as_deref(), Some("555"));
    assert_ne!(after.updated_at, before.updated_at);

    // Every other field is byte-identical to its prior value.
    let mut before_json = serde_json::to_value(&before).unwrap();
    let mut after_json = serde_json::to_value(&after).unwrap();
    for doc in [&mut before_json, &mut after_json] {
        doc.as_object_mut().unwrap().remove("phone");
        doc.as_object_mut().unwrap().remove("updatedAt");
    }
    assert_eq!(before_json, after_json);
}

#[tokio::test]
async fn test_update_missing_user_is_not_found() {
    require_mongo!();
    let (app, _) = common::create_test_app_with_db().await;

    let email = unique_email("ghost");
    let (_, jwt) = register(&app, &email, json!({})).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/update-user/{}", ObjectId::new().to_hex()),
        Some(&jwt),
        Some(json!({ "data": { "phone": "555" } })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_end_to_end_registration_to_approved_listing() {
    require_mongo!();
    let (app, state) = common::create_test_app_with_db().await;

    // Register A.
    let email = unique_email("e2e");
    let (id, jwt) = register(&app, &email, json!({ "isVerified": false })).await;

    // Second register with the same email: Conflict.
    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "data": {
            "name": "Imposter",
            "email": email,
            "password": "x",
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Issue an OTP (mock mailer: persisted, logged, not emailed).
    let (status, _) = send(
        &app,
        "POST",
        "/getVerificationCode",
        Some(&jwt),
        Some(json!({ "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let code = state.db.latest_otp(&email).await.unwrap().unwrap().otp;

    // Wrong code is Invalid.
    let wrong = if code == "9999" { "1000" } else { "9999" };
    let (status, _) = send(
        &app,
        "POST",
        "/verifyOTP",
        Some(&jwt),
        Some(json!({ "email": email, "userOTP": wrong })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Correct code verifies.
    let (status, _) = send(
        &app,
        "POST",
        "/verifyOTP",
        Some(&jwt),
        Some(json!({ "email": email, "userOTP": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Mark verified, then login.
    send(
        &app,
        "PUT",
        &format!("/update-user/{}", id),
        Some(&jwt),
        Some(json!({ "data": { "isVerified": true } })),
    )
    .await;
    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let jwt = body["jwt"].as_str().unwrap().to_string();

    // Create a listing: pending until moderated.
    let post_id = create_post(&app, &jwt, json!({ "location": "Mohammadpur" })).await;

    let (_, body) = send(&app, "GET", "/pending-posts", Some(&jwt), None).await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["_id"]["$oid"] == post_id.as_str()));

    let (_, body) = send(&app, "GET", "/approved-posts", Some(&jwt), None).await;
    assert!(!body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["_id"]["$oid"] == post_id.as_str()));

    // Moderate, then it surfaces in the approved view and in the
    // case-insensitive location search.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/update-post/{}", post_id),
        Some(&jwt),
        Some(json!({ "data": { "isApproved": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/approved-posts", Some(&jwt), None).await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["_id"]["$oid"] == post_id.as_str()));

    let (_, body) = send(&app, "GET", "/nearest-posts/mohammadpur", Some(&jwt), None).await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["_id"]["$oid"] == post_id.as_str()));

    // Ownership was taken from the credential.
    let (_, body) = send(
        &app,
        "GET",
        &format!("/single-post-by-userId/{}", id),
        Some(&jwt),
        None,
    )
    .await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["_id"]["$oid"] == post_id.as_str()));
}
