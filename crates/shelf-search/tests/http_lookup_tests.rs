//! HTTP Lookup Tests
//!
//! `HttpBookLookup` against an in-process warp server.

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use shelf_search::{Book, BookLookup, HttpBookLookup, LookupError, SearchType, ShelfConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use warp::filters::BoxedFilter;
use warp::http::{HeaderMap, StatusCode};
use warp::reply::Response;
use warp::{Filter, Reply};

/// Request as seen by the server
#[derive(Debug, Clone, Default)]
struct Seen {
    query: HashMap<String, String>,
    headers: HeaderMap,
}

fn serve(routes: BoxedFilter<(Response,)>) -> String {
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    format!("http://{addr}/")
}

fn lookup_for(base_url: &str) -> HttpBookLookup {
    HttpBookLookup::new(&ShelfConfig::new().with_base_url(base_url)).unwrap()
}

/// Autocomplete route answering `body` and recording each request
fn recording_route(body: serde_json::Value, seen: Arc<Mutex<Vec<Seen>>>) -> BoxedFilter<(Response,)> {
    warp::path!("api" / "autocomplete")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::header::headers_cloned())
        .map(move |query, headers| {
            seen.lock().push(Seen { query, headers });
            warp::reply::json(&body).into_response()
        })
        .boxed()
}

#[tokio::test]
async fn test_lookup_returns_books_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let body = json!({
        "books": [
            {"id": 7, "title": "Harry Potter 2", "author": "J.K. Rowling", "coverImage": "/c/7.jpg", "price": 13500},
            {"id": 3, "title": "Harry Potter 1", "author": "J.K. Rowling", "coverImage": "/c/3.jpg", "price": 12600}
        ]
    });
    let base = serve(recording_route(body, Arc::clone(&seen)));

    let books = lookup_for(&base)
        .lookup("harry", SearchType::Title)
        .await
        .unwrap();

    assert_eq!(
        books,
        vec![
            Book::new(7, "Harry Potter 2", "J.K. Rowling", 13500).with_cover_image("/c/7.jpg"),
            Book::new(3, "Harry Potter 1", "J.K. Rowling", 12600).with_cover_image("/c/3.jpg"),
        ]
    );
}

#[tokio::test]
async fn test_lookup_sends_query_and_headers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = serve(recording_route(json!({"books": []}), Arc::clone(&seen)));

    lookup_for(&base)
        .lookup("해리 포터 & co", SearchType::Author)
        .await
        .unwrap();

    let seen = seen.lock().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].query.get("keyword").map(String::as_str), Some("해리 포터 & co"));
    assert_eq!(seen[0].query.get("type").map(String::as_str), Some("author"));
    assert_eq!(seen[0].headers["cache-control"], "no-cache");
    assert_eq!(seen[0].headers["accept"], "application/json");
    assert!(seen[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_lookup_sends_bearer_token() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = serve(recording_route(json!({"books": []}), Arc::clone(&seen)));
    let config = ShelfConfig::new()
        .with_base_url(base)
        .with_api_token("s3cret");

    HttpBookLookup::new(&config)
        .unwrap()
        .lookup("dune", SearchType::Title)
        .await
        .unwrap();

    assert_eq!(seen.lock()[0].headers["authorization"], "Bearer s3cret");
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let route = warp::path!("shop" / "api" / "autocomplete")
        .map(|| warp::reply::json(&json!({"books": [{"id": 1, "title": "Emma", "author": "Austen", "price": 8000}]})).into_response())
        .boxed();
    let base = serve(route);

    let books = lookup_for(&format!("{base}shop"))
        .lookup("emma", SearchType::Title)
        .await
        .unwrap();

    assert_eq!(books, vec![Book::new(1, "Emma", "Austen", 8000)]);
}

#[tokio::test]
async fn test_missing_or_null_books_is_empty() {
    for body in [json!({}), json!({"books": null}), json!({"books": [], "total": 0})] {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = serve(recording_route(body.clone(), seen));

        let books = lookup_for(&base)
            .lookup("nothing", SearchType::Title)
            .await
            .unwrap();
        assert!(books.is_empty(), "body {body} should decode to no books");
    }
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let route = warp::path!("api" / "autocomplete")
        .map(|| {
            warp::reply::with_status(
                warp::reply::json(&json!({"error": "boom"})),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response()
        })
        .boxed();
    let base = serve(route);

    let err = lookup_for(&base)
        .lookup("harry", SearchType::Title)
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::Status { status: 500 }));
    assert!(err.is_retryable());
    assert_eq!(err.to_string(), "endpoint returned status 500");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let route = warp::path!("api" / "autocomplete")
        .map(|| warp::reply::with_header("{\"books\": [", "content-type", "application/json").into_response())
        .boxed();
    let base = serve(route);

    let err = lookup_for(&base)
        .lookup("harry", SearchType::Title)
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_wrong_shape_is_decode_error() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let body = json!({"books": [{"id": "not-a-number", "title": "x", "author": "y", "price": 1}]});
    let base = serve(recording_route(body, seen));

    let err = lookup_for(&base)
        .lookup("harry", SearchType::Title)
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let route = warp::path!("api" / "autocomplete")
        .and_then(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok::<_, warp::Rejection>(warp::reply::json(&json!({"books": []})).into_response())
        })
        .boxed();
    let base = serve(route);
    let config = ShelfConfig::new()
        .with_base_url(base)
        .with_request_timeout_ms(50);

    let err = HttpBookLookup::new(&config)
        .unwrap()
        .lookup("harry", SearchType::Title)
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::Timeout { timeout_ms: 50 }), "got {err:?}");
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let err = lookup_for("http://127.0.0.1:1/")
        .lookup("harry", SearchType::Title)
        .await
        .unwrap_err();

    assert!(err.is_transport(), "got {err:?}");
}
