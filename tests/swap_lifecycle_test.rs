//! HTTP tests for the swap request lifecycle.

mod common;

use common::{authed, create_test_server, login, verified_user, TestApp};
use serde_json::{json, Value};

async fn propose(app: &TestApp, token: &str, recipient: &str) -> String {
    let res = authed(app.server.post("/api/swaps"), token)
        .json(&json!({
            "recipientId": recipient,
            "skillsInvolved": ["React"],
            "message": "hi",
        }))
        .await;
    assert_eq!(res.status_code(), 201, "{}", res.text());
    let body: Value = res.json();
    assert_eq!(body["swapRequest"]["status"], "pending");
    body["swapRequest"]["id"].as_str().unwrap().to_string()
}

async fn set_status(app: &TestApp, token: &str, id: &str, status: &str) -> (u16, Value) {
    let res = authed(app.server.put(&format!("/api/swaps/{id}/status")), token)
        .json(&json!({ "status": status }))
        .await;
    (res.status_code().as_u16(), res.json())
}

/// Register, verify, log in, propose; the recipient accepts exactly once.
#[tokio::test]
async fn test_accept_is_final() {
    let app = create_test_server();
    verified_user(&app, "Alice", "alice@example.com", "secret1").await;
    let alice = login(&app, "alice@example.com", "secret1").await;
    let (bob, bob_id) = verified_user(&app, "Bob", "bob@example.com", "secret2").await;

    let id = propose(&app, &alice, &bob_id).await;
    app.mailer
        .wait_for("bob@example.com", "Skill Swap: New Swap Request!")
        .await;

    let (status, body) = set_status(&app, &bob, &id, "accepted").await;
    assert_eq!(status, 200);
    assert_eq!(body["swapRequest"]["status"], "accepted");
    app.mailer
        .wait_for("alice@example.com", "Skill Swap Request Accepted!")
        .await;

    for again in ["accepted", "rejected"] {
        let (status, body) = set_status(&app, &bob, &id, again).await;
        assert_eq!(status, 400, "{again}");
        assert_eq!(body["message"], "Request is already accepted. Cannot change status.");
    }
}

/// The sender cannot accept their own request; after cancelling, the
/// recipient can no longer reject it.
#[tokio::test]
async fn test_sender_cancel_then_recipient_reject() {
    let app = create_test_server();
    let (alice, _) = verified_user(&app, "Alice", "alice@example.com", "secret1").await;
    let (bob, bob_id) = verified_user(&app, "Bob", "bob@example.com", "secret2").await;
    let id = propose(&app, &alice, &bob_id).await;

    let (status, _) = set_status(&app, &alice, &id, "accepted").await;
    assert_eq!(status, 403);

    let (status, body) = set_status(&app, &alice, &id, "cancelled").await;
    assert_eq!(status, 200);
    assert_eq!(body["swapRequest"]["status"], "cancelled");

    let (status, _) = set_status(&app, &bob, &id, "rejected").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_create_validation() {
    let app = create_test_server();
    let (alice, alice_id) = verified_user(&app, "Alice", "alice@example.com", "secret1").await;
    let (_, bob_id) = verified_user(&app, "Bob", "bob@example.com", "secret2").await;

    let cases = [
        (json!({ "recipientId": alice_id, "skillsInvolved": ["Go"], "message": "hi" }), 400u16),
        (json!({ "recipientId": bob_id, "skillsInvolved": [], "message": "hi" }), 400),
        (json!({ "recipientId": bob_id, "skillsInvolved": ["Go"], "message": "" }), 400),
        (json!({ "recipientId": "bob", "skillsInvolved": ["Go"], "message": "hi" }), 400),
        (
            json!({
                "recipientId": "00000000-0000-0000-0000-000000000000",
                "skillsInvolved": ["Go"],
                "message": "hi"
            }),
            404,
        ),
    ];
    for (body, expected) in cases {
        let res = authed(app.server.post("/api/swaps"), &alice).json(&body).await;
        assert_eq!(res.status_code(), expected, "{body}");
    }

    let res = app
        .server
        .post("/api/swaps")
        .json(&json!({ "recipientId": bob_id, "skillsInvolved": ["Go"], "message": "hi" }))
        .await;
    assert_eq!(res.status_code(), 401);
}

#[tokio::test]
async fn test_private_recipient_is_unreachable() {
    let app = create_test_server();
    let (alice, _) = verified_user(&app, "Alice", "alice@example.com", "secret1").await;
    let (bob, bob_id) = verified_user(&app, "Bob", "bob@example.com", "secret2").await;

    let res = authed(app.server.put("/api/users/profile"), &bob)
        .json(&json!({ "isPublic": false }))
        .await;
    assert_eq!(res.status_code(), 200);

    let res = authed(app.server.post("/api/swaps"), &alice)
        .json(&json!({ "recipientId": bob_id, "skillsInvolved": ["Go"], "message": "hi" }))
        .await;
    assert_eq!(res.status_code(), 404);
}

#[tokio::test]
async fn test_sent_and_received_listings() {
    let app = create_test_server();
    let (alice, _) = verified_user(&app, "Alice", "alice@example.com", "secret1").await;
    let (bob, bob_id) = verified_user(&app, "Bob", "bob@example.com", "secret2").await;
    propose(&app, &alice, &bob_id).await;

    let sent: Value = authed(app.server.get("/api/swaps/sent"), &alice).await.json();
    let list = sent["swapRequests"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["recipient"]["name"], "Bob");
    assert_eq!(list[0]["recipient"]["email"], "bob@example.com");

    let received: Value = authed(app.server.get("/api/swaps/received"), &bob).await.json();
    let list = received["swapRequests"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["sender"]["name"], "Alice");
    assert_eq!(list[0]["skillsInvolved"], json!(["React"]));

    let empty: Value = authed(app.server.get("/api/swaps/received"), &alice).await.json();
    assert_eq!(empty["swapRequests"], json!([]));
}

#[tokio::test]
async fn test_delete_by_party_only() {
    let app = create_test_server();
    let (alice, _) = verified_user(&app, "Alice", "alice@example.com", "secret1").await;
    let (_, bob_id) = verified_user(&app, "Bob", "bob@example.com", "secret2").await;
    let (carol, _) = verified_user(&app, "Carol", "carol@example.com", "secret3").await;
    let id = propose(&app, &alice, &bob_id).await;

    let res = authed(app.server.delete(&format!("/api/swaps/{id}")), &carol).await;
    assert_eq!(res.status_code(), 403);

    let (status, _) = set_status(&app, &alice, &id, "cancelled").await;
    assert_eq!(status, 200);

    let res = authed(app.server.delete(&format!("/api/swaps/{id}")), &carol).await;
    assert_eq!(res.status_code(), 403);

    let res = authed(app.server.delete(&format!("/api/swaps/{id}")), &alice).await;
    assert_eq!(res.status_code(), 200);

    let res = authed(app.server.delete(&format!("/api/swaps/{id}")), &alice).await;
    assert_eq!(res.status_code(), 404);
}

#[tokio::test]
async fn test_pending_is_not_a_valid_target() {
    let app = create_test_server();
    let (alice, _) = verified_user(&app, "Alice", "alice@example.com", "secret1").await;
    let (bob, bob_id) = verified_user(&app, "Bob", "bob@example.com", "secret2").await;
    let id = propose(&app, &alice, &bob_id).await;

    let (status, _) = set_status(&app, &bob, &id, "pending").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_pending_request_cannot_be_deleted() {
    let app = create_test_server();
    let (alice, _) = verified_user(&app, "Alice", "alice@example.com", "secret1").await;
    let (bob, bob_id) = verified_user(&app, "Bob", "bob@example.com", "secret2").await;
    let id = propose(&app, &alice, &bob_id).await;

    for token in [&alice, &bob] {
        let res = authed(app.server.delete(&format!("/api/swaps/{id}")), token).await;
        assert_eq!(res.status_code(), 400);
        let body: Value = res.json();
        assert_eq!(body["success"], false);
    }

    let sent: Value = authed(app.server.get("/api/swaps/sent"), &alice).await.json();
    let list = sent["swapRequests"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["status"], "pending");
}

/// A caller who may never make a move is refused even once the request
/// has already left `pending`.
#[tokio::test]
async fn test_forbidden_before_already_decided() {
    let app = create_test_server();
    let (alice, _) = verified_user(&app, "Alice", "alice@example.com", "secret1").await;
    let (bob, bob_id) = verified_user(&app, "Bob", "bob@example.com", "secret2").await;
    let (carol, _) = verified_user(&app, "Carol", "carol@example.com", "secret3").await;
    let id = propose(&app, &alice, &bob_id).await;

    let (status, _) = set_status(&app, &bob, &id, "accepted").await;
    assert_eq!(status, 200);

    let (status, body) = set_status(&app, &bob, &id, "cancelled").await;
    assert_eq!(status, 403);
    assert_eq!(
        body["message"],
        "You are not authorized to perform this action on this request."
    );
    let (status, _) = set_status(&app, &carol, &id, "rejected").await;
    assert_eq!(status, 403);

    let (status, _) = set_status(&app, &alice, &id, "cancelled").await;
    assert_eq!(status, 400);
}
