//! End-to-end tests: client → gate → echo backend.

mod common;

use reqwest::header::{COOKIE, HOST, LOCATION, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{client, gate_config, start_echo_backend, start_gate};

struct Gate {
    base: String,
    client: reqwest::Client,
    _shutdown: tenant_gate::Shutdown,
}

impl Gate {
    async fn start() -> Self {
        let backend = start_echo_backend().await;
        let (addr, shutdown) = start_gate(gate_config(backend)).await;
        Self {
            base: format!("http://{addr}"),
            client: client(),
            _shutdown: shutdown,
        }
    }

    async fn get(&self, host: &str, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(format!("{}{path}", self.base)).header(HOST, host);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        request.send().await.unwrap()
    }

    async fn sign_in(&self, identifier: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/auth/sign-in", self.base))
            .header(HOST, "example.com")
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Signs in and returns the `name=value` cookie pair.
    async fn session_cookie(&self, identifier: &str, password: &str) -> String {
        let response = self.sign_in(identifier, password).await;
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

fn location(response: &reqwest::Response) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_anonymous_interviewer_sent_to_root_sign_in() {
    let gate = Gate::start().await;

    let response = gate.get("interviewer.example.com", "/candidates", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "http://example.com/sign-in");

    let response = gate.get("interviewer.example.com", "/", None).await;
    assert_eq!(location(&response), "http://example.com/sign-in");
}

#[tokio::test]
async fn test_interviewer_sign_in_page_reaches_backend() {
    let gate = Gate::start().await;

    let response = gate.get("interviewer.example.com", "/sign-in", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "interviewer /sign-in");
}

#[tokio::test]
async fn test_signed_in_interviewer_is_rewritten() {
    let gate = Gate::start().await;
    let cookie = gate.session_cookie("ada", "lovelace").await;

    let response = gate.get("interviewer.example.com", "/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "interviewer /interviewer");

    let response = gate
        .get("interviewer.example.com", "/candidates?page=2", Some(&cookie))
        .await;
    assert_eq!(
        response.text().await.unwrap(),
        "interviewer /interviewer/candidates?page=2"
    );
}

#[tokio::test]
async fn test_plain_user_bounced_from_interviewer_area() {
    let gate = Gate::start().await;
    let cookie = gate.session_cookie("alan@example.com", "turing").await;

    let response = gate
        .get("interviewer.example.com", "/candidates", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "http://interviewer.example.com/");
}

#[tokio::test]
async fn test_root_landing_and_app_guard() {
    let gate = Gate::start().await;

    let response = gate.get("example.com", "/", None).await;
    assert_eq!(response.text().await.unwrap(), "root /");

    let response = gate.get("example.com", "/app/settings", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "http://example.com/");

    let cookie = gate.session_cookie("alan", "turing").await;
    let response = gate.get("example.com", "/", Some(&cookie)).await;
    assert_eq!(location(&response), "http://example.com/app");

    let response = gate.get("example.com", "/app/settings", Some(&cookie)).await;
    assert_eq!(response.text().await.unwrap(), "root /app/settings");
}

#[tokio::test]
async fn test_sign_in_failures_are_indistinguishable() {
    let gate = Gate::start().await;

    let wrong = gate.sign_in("ada", "wrongpassword").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong.headers().get(SET_COOKIE).is_none());

    let unknown = gate.sign_in("unknown@x.com", "anything").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let wrong: Value = wrong.json().await.unwrap();
    let unknown: Value = unknown.json().await.unwrap();
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["code"], "invalid_credentials");
}

#[tokio::test]
async fn test_out_of_scope_paths_are_not_gated() {
    let gate = Gate::start().await;

    let response = gate.get("interviewer.example.com", "/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = gate.get("interviewer.example.com", "/logo.png", None).await;
    assert_eq!(response.text().await.unwrap(), "interviewer /logo.png");

    let response = gate.get("interviewer.example.com", "/_next/static/app.js", None).await;
    assert_eq!(response.text().await.unwrap(), "interviewer /_next/static/app.js");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let gate = Gate::start().await;

    let response = gate.get("example.com", "/", None).await;
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_upstream_down_is_bad_gateway() {
    let closed = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let (addr, _shutdown) = start_gate(gate_config(closed)).await;

    let response = client()
        .get(format!("http://{addr}/"))
        .header(HOST, "example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "bad_gateway");
}
