#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use mockito::{Matcher, Mock, ServerGuard};

/// Unsigned token whose payload carries `AdminID`
pub fn token_for(admin_id: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"AdminID":"{admin_id}"}}"#));
    format!("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{payload}.signature")
}

/// `GET <path>?createdBy=u1` answering `body`
pub fn owned_list(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::UrlEncoded("createdBy".into(), "u1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

/// `<method> <path>` without a query, answering `status` and `body`
pub fn json_route(
    server: &mut ServerGuard,
    method: &str,
    path: &str,
    status: usize,
    body: &str,
) -> Mock {
    server
        .mock(method, path)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}
