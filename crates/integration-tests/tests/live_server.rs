//! Scenarios against a running server.
//!
//! These tests require:
//! - The web service running (cargo run -p pur-beurre-web)
//! - `PUR_BEURRE_TEST_URL` pointing at it (default <http://localhost:8000>)
//!
//! Run with: cargo test -p pur-beurre-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode, redirect::Policy};

fn base_url() -> String {
    std::env::var("PUR_BEURRE_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_signup_favorite_logout() {
    let client = client();
    let base_url = base_url();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let email = format!("live_{nonce}@test.fr");

    let resp = client
        .post(format!("{base_url}/create-account/"))
        .form(&[
            ("email", email.as_str()),
            ("username", "live"),
            ("password", "test"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .post(format!("{base_url}/favorites/3017620422003"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = client
        .get(format!("{base_url}/favorites"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(r#"id="3017620422003""#));

    let resp = client
        .post(format!("{base_url}/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .get(format!("{base_url}/favorites"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}
