//! Shared helpers for HTTP-level tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderValue};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};
use skillswap::{
    app::build_app,
    config::AppConfig,
    mail::{Mail, Mailer},
    state::AppState,
    store::MemoryStore,
};

/// Mailer that records every message instead of sending it.
#[derive(Default, Clone)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<Mail>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_to(&self, to: &str) -> usize {
        self.sent.lock().unwrap().iter().filter(|m| m.to == to).count()
    }

    /// Latest mail to `to`, polling briefly for background sends.
    pub async fn wait_for(&self, to: &str, subject: &str) -> Mail {
        for _ in 0..100 {
            let found = self
                .sent
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|m| m.to == to && m.subject == subject)
                .cloned();
            if let Some(mail) = found {
                return mail;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no mail {subject:?} to {to}");
    }

    /// The six-digit code in the latest OTP mail to `to`.
    pub fn otp(&self, to: &str) -> String {
        let sent = self.sent.lock().unwrap();
        let mail = sent.iter().rev().find(|m| m.to == to).expect("no mail sent");
        mail.text
            .split(|c: char| !c.is_ascii_digit())
            .find(|w| w.len() == 6)
            .expect("no otp in mail")
            .to_string()
    }

    /// The secret embedded in the latest reset link to `to`.
    pub fn reset_secret(&self, to: &str) -> String {
        let sent = self.sent.lock().unwrap();
        let mail = sent
            .iter()
            .rev()
            .find(|m| m.to == to && m.subject.contains("Password Reset"))
            .expect("no reset mail");
        mail.text
            .split_whitespace()
            .find_map(|w| w.split("/reset-password/").nth(1))
            .expect("no reset link")
            .to_string()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, mail: &Mail) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub mailer: MockMailer,
    pub store: Arc<MemoryStore>,
}

pub fn create_test_server() -> TestApp {
    let mailer = MockMailer::new();
    let store = Arc::new(MemoryStore::new());
    let state = AppState::from_parts(
        AppConfig::for_tests(),
        store.clone(),
        store.clone(),
        Arc::new(mailer.clone()),
    );
    let server = TestServer::new(build_app(state)).expect("Failed to create test server");
    TestApp {
        server,
        mailer,
        store,
    }
}

/// Attaches a bearer credential to `req`.
pub fn authed(req: TestRequest, token: &str) -> TestRequest {
    req.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
    )
}

/// Signs up and verifies an account; returns `(token, user id)`.
pub async fn verified_user(app: &TestApp, name: &str, email: &str, password: &str) -> (String, String) {
    let res = app
        .server
        .post("/api/auth/signup")
        .json(&json!({ "name": name, "email": email, "password": password }))
        .await;
    assert_eq!(res.status_code(), 201, "{}", res.text());

    let res = app
        .server
        .post("/api/auth/verify-otp")
        .json(&json!({ "email": email, "otp": app.mailer.otp(email) }))
        .await;
    assert_eq!(res.status_code(), 200, "{}", res.text());
    let body: Value = res.json();
    (
        body["token"].as_str().expect("token").to_string(),
        body["user"]["id"].as_str().expect("id").to_string(),
    )
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let res = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(res.status_code(), 200, "{}", res.text());
    let body: Value = res.json();
    body["token"].as_str().expect("token").to_string()
}
