#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use mentorship_portal::{
    AppConfig, AppState, MemoryRepository, SESSION_COOKIE, create_router,
    credentials::hash_password,
    models::{Department, EntryInput, Mentee, Mentor, NewMentee},
    repository::{Repository, RepositoryState},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

pub const PASSWORD: &str = "correct horse battery staple";

/// Full router over the in-memory store, with a handle on the store for seeding
/// and assertions.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
}

pub fn test_app() -> TestApp {
    test_app_with(AppConfig::default())
}

pub fn test_app_with(config: AppConfig) -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        config,
    };
    TestApp {
        router: create_router(state, MemoryStore::default()),
        repo,
    }
}

impl TestApp {
    pub async fn seed_mentee(&self, username: &str, is_admin: bool) -> Mentee {
        self.repo
            .create_mentee(NewMentee {
                username: username.to_string(),
                password_hash: hash_password(PASSWORD).unwrap(),
                is_admin,
            })
            .await
            .unwrap()
    }

    pub async fn seed_admin(&self) -> Mentee {
        self.seed_mentee("admin", true).await
    }

    pub async fn seed_department(&self, name: &str) -> Department {
        self.repo
            .create_department(EntryInput {
                name: name.to_string(),
                description: format!("The {name} Department"),
            })
            .await
            .unwrap()
    }

    pub async fn seed_mentor(&self, name: &str) -> Mentor {
        self.repo
            .create_mentor(EntryInput {
                name: name.to_string(),
                description: format!("{name} mentor"),
            })
            .await
            .unwrap()
    }

    /// Client acting as the given mentee through the local `x-user-id` bypass.
    pub fn client_as(&self, mentee_id: i64) -> Client {
        Client {
            router: self.router.clone(),
            user_id: Some(mentee_id),
            cookie: None,
        }
    }

    pub fn anonymous(&self) -> Client {
        Client {
            router: self.router.clone(),
            user_id: None,
            cookie: None,
        }
    }
}

/// Drives the router with `oneshot`, carrying the session cookie between
/// requests like a browser would.
pub struct Client {
    router: Router,
    user_id: Option<i64>,
    cookie: Option<String>,
}

impl Client {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, form: &str) -> TestResponse {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn send_with_header(&mut self, uri: &str, name: &str, value: &str) -> TestResponse {
        let request = self
            .request("GET", uri)
            .header(name, value)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = self.user_id {
            builder = builder.header("x-user-id", id.to_string());
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();

        for set_cookie in headers.get_all(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().trim();
            if let Some(value) = pair.strip_prefix(&format!("{SESSION_COOKIE}=")) {
                self.cookie = (!value.is_empty()).then(|| pair.to_string());
            }
        }

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    pub fn template(&self) -> &str {
        self.body["template"].as_str().unwrap_or_default()
    }

    pub fn notices(&self) -> Vec<String> {
        self.body["notices"]
            .as_array()
            .map(|notices| {
                notices
                    .iter()
                    .filter_map(|n| n["message"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn context(&self) -> &Value {
        &self.body["context"]
    }
}
