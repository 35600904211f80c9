//! [`HttpTransport`] against a real HTTP server: authorization, outcome
//! classification, retry policy, and the audit reason header.

use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cordial::{Client, Config, Error, ErrorCode, RetryConfig, Snowflake};

fn client(server: &MockServer, token: &str) -> Client {
    let config = Config {
        token: token.to_string(),
        api_url: server.uri(),
        timeout: Duration::from_secs(5),
        retry: RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 10,
        },
    };
    Client::new(&config).unwrap()
}

fn member_body() -> serde_json::Value {
    serde_json::json!({
        "user": { "id": "42", "username": "somebody" },
        "roles": [],
    })
}

#[tokio::test]
async fn success_body_is_parsed_and_the_token_travels_as_bot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guilds/1/members/42"))
        .and(header("authorization", "Bot abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_body()))
        .expect(1)
        .mount(&server)
        .await;

    let member = client(&server, "abc")
        .guild(Snowflake::new(1))
        .retrieve_member(Snowflake::new(42))
        .execute()
        .await
        .unwrap();

    assert_eq!(member.user.username, "somebody");
}

#[tokio::test]
async fn a_bot_prefix_on_the_configured_token_is_not_doubled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bot abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_body()))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, "Bot abc")
        .guild(Snowflake::new(1))
        .retrieve_member(Snowflake::new(42))
        .execute()
        .await
        .unwrap();
}

#[tokio::test]
async fn remote_rejection_carries_the_machine_readable_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "code": 50_013,
            "message": "Missing Permissions",
        })))
        .mount(&server)
        .await;

    let err = client(&server, "abc")
        .guild(Snowflake::new(1))
        .retrieve_member(Snowflake::new(42))
        .execute()
        .await
        .unwrap_err();

    match err {
        Error::Response {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 403);
            assert_eq!(code, ErrorCode::MissingPermissions);
            assert_eq!(message, "Missing Permissions");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!client(&server, "abc")
        .guild(Snowflake::new(1))
        .retrieve_member(Snowflake::new(42))
        .execute()
        .await
        .unwrap_err()
        .is_retryable());
}

#[tokio::test]
async fn unknown_member_maps_to_its_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": 10_007,
            "message": "Unknown Member",
        })))
        .mount(&server)
        .await;

    let err = client(&server, "abc")
        .guild(Snowflake::new(1))
        .retrieve_member(Snowflake::new(9))
        .execute()
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), Some(ErrorCode::UnknownMember));
}

#[tokio::test]
async fn rate_limit_is_retried_after_the_server_hint() {
    let server = MockServer::start().await;
    // First-mounted mock wins while it lasts; it expires after one match.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0.01"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_body()))
        .expect(1)
        .mount(&server)
        .await;

    let member = client(&server, "abc")
        .guild(Snowflake::new(1))
        .retrieve_member(Snowflake::new(42))
        .execute()
        .await
        .unwrap();

    assert_eq!(member.user.id, Snowflake::new(42));
}

#[tokio::test]
async fn exhausted_retry_budget_surfaces_the_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0.01"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server, "abc")
        .guild(Snowflake::new(1))
        .retrieve_member(Snowflake::new(42))
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
    assert_eq!(err.retry_after(), Some(Duration::from_secs_f64(0.01)));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_body()))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, "abc")
        .guild(Snowflake::new(1))
        .retrieve_member(Snowflake::new(42))
        .execute()
        .await
        .unwrap();
}

#[tokio::test]
async fn audit_reason_is_sent_as_a_header() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/guilds/1/members/2"))
        .and(header("X-Audit-Log-Reason", "spamming"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, "abc")
        .guild(Snowflake::new(1))
        .kick(Snowflake::new(2))
        .unwrap()
        .reason("spamming")
        .unwrap()
        .execute()
        .await
        .unwrap();
}

#[tokio::test]
async fn query_parameters_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/7/messages"))
        .and(wiremock::matchers::query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut history = client(&server, "abc")
        .channel(Snowflake::new(7))
        .history()
        .unwrap()
        .limit(50)
        .unwrap();
    let page = history.fetch_next().await.unwrap();
    assert!(page.is_empty());
}
