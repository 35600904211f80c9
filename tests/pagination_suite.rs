//! Pagination behavior: page counts, boundary advance, limit bounds,
//! exhaustion, and the lazy sequence helpers.

mod common;

use std::sync::Arc;

use futures::StreamExt;

use cordial::route::routes;
use cordial::{
    Error, PaginationAction, PaginationOrder, Request, Snowflake, ValidationFailure,
};

use crate::common::MockTransport;

fn ids(range: std::ops::RangeInclusive<u64>) -> serde_json::Value {
    serde_json::Value::Array(
        range
            .map(|id| serde_json::json!({ "id": id.to_string() }))
            .collect(),
    )
}

fn paginator(
    transport: &Arc<MockTransport>,
    order: PaginationOrder,
) -> PaginationAction<Snowflake> {
    let channel = Snowflake::new(7);
    PaginationAction::new(
        transport.clone(),
        order,
        move |cursor| {
            let mut route = routes::GET_MESSAGES
                .compile(&[&channel])
                .with_query("limit", cursor.limit());
            if let Some(boundary) = cursor.boundary() {
                route = route.with_query(cursor.order().query_key(), boundary);
            }
            Request::new(route)
        },
        |value| {
            value["id"]
                .as_str()
                .and_then(|raw| raw.parse::<Snowflake>().ok())
                .ok_or_else(|| Error::Connection {
                    message: "bad item".into(),
                })
        },
        |id| *id,
    )
}

#[tokio::test]
async fn pages_of_100_100_37_yield_exactly_237_items() {
    let transport = MockTransport::new();
    transport.push_ok(ids(1..=100));
    transport.push_ok(ids(101..=200));
    transport.push_ok(ids(201..=237));

    let total = paginator(&transport, PaginationOrder::Forward)
        .stream()
        .fold(0usize, |count, item| async move {
            item.unwrap();
            count + 1
        })
        .await;

    assert_eq!(total, 237);
    // The short third page terminates iteration; no fourth fetch.
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn boundary_advances_to_the_last_item() {
    let transport = MockTransport::new();
    transport.push_ok(ids(1..=3));
    transport.push_ok(serde_json::json!([]));

    let mut action = paginator(&transport, PaginationOrder::Forward)
        .limit(3)
        .unwrap();

    let page = action.fetch_next().await.unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(action.cursor().boundary(), Some(Snowflake::new(3)));
    assert!(!action.cursor().is_exhausted());

    let empty = action.fetch_next().await.unwrap();
    assert!(empty.is_empty());

    let seen = transport.requests();
    assert_eq!(seen.len(), 2);
    assert!(!seen[0]
        .route()
        .query()
        .iter()
        .any(|(key, _)| *key == "after"));
    assert!(seen[1]
        .route()
        .query()
        .contains(&("after", "3".to_string())));
}

#[tokio::test]
async fn backward_order_uses_before() {
    let transport = MockTransport::new();
    transport.push_ok(ids(90..=92));

    let mut action = paginator(&transport, PaginationOrder::Backward)
        .limit(3)
        .unwrap();
    action.fetch_next().await.unwrap();
    transport.push_ok(serde_json::json!([]));
    action.fetch_next().await.unwrap();

    let seen = transport.requests();
    assert!(seen[1]
        .route()
        .query()
        .contains(&("before", "92".to_string())));
}

#[tokio::test]
async fn limit_out_of_bounds_fails_before_any_transport_call() {
    for bad in [0u8, 101] {
        let transport = MockTransport::new();
        let err = paginator(&transport, PaginationOrder::Forward)
            .limit(bad)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationFailure::OutOfRange { what: "page limit", .. })
        ));
        assert_eq!(transport.calls(), 0);
    }
}

#[tokio::test]
async fn exhausted_cursor_makes_no_further_calls() {
    let transport = MockTransport::new();
    transport.push_ok(ids(1..=5)); // short page at limit 100

    let mut action = paginator(&transport, PaginationOrder::Forward);
    assert_eq!(action.fetch_next().await.unwrap().len(), 5);
    assert!(action.cursor().is_exhausted());

    assert!(action.fetch_next().await.unwrap().is_empty());
    assert!(action.fetch_next().await.unwrap().is_empty());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn skip_to_seeds_the_boundary() {
    let transport = MockTransport::new();
    transport.push_ok(ids(51..=55));

    let mut action = paginator(&transport, PaginationOrder::Forward)
        .skip_to(Snowflake::new(50))
        .unwrap();
    action.fetch_next().await.unwrap();

    let seen = transport.requests();
    assert!(seen[0]
        .route()
        .query()
        .contains(&("after", "50".to_string())));
}

#[tokio::test]
async fn take_async_fetches_only_the_pages_it_needs() {
    let transport = MockTransport::new();
    transport.push_ok(ids(1..=100));
    transport.push_ok(ids(101..=200));
    transport.push_ok(ids(201..=300));

    let items = paginator(&transport, PaginationOrder::Forward)
        .take_async(150)
        .await
        .unwrap();

    assert_eq!(items.len(), 150);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn for_each_async_stops_when_the_predicate_declines() {
    let transport = MockTransport::new();
    transport.push_ok(ids(1..=100));
    transport.push_ok(ids(101..=200));

    let mut visited = 0;
    paginator(&transport, PaginationOrder::Forward)
        .for_each_async(|_| {
            visited += 1;
            visited < 5
        })
        .await
        .unwrap();

    assert_eq!(visited, 5);
    assert_eq!(transport.calls(), 1);
}

#[test]
fn debug_output_shows_the_cursor_state() {
    let transport = MockTransport::new();
    let action = paginator(&transport, PaginationOrder::Forward);
    let rendered = format!("{action:?}");
    assert!(rendered.contains("PaginationAction"));
    assert!(rendered.contains("Cursor"));
}

#[tokio::test]
async fn stream_surfaces_errors_and_terminates() {
    let transport = MockTransport::new();
    transport.push_err(Error::Connection {
        message: "offline".into(),
    });

    let results: Vec<_> = paginator(&transport, PaginationOrder::Forward)
        .stream()
        .collect()
        .await;

    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
    assert_eq!(transport.calls(), 1);
}
