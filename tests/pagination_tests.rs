use mockito::{Matcher, Server};
use serde_json::json;

use spotify_playlist_toolbox::api::fetch::fetch_all;
use spotify_playlist_toolbox::api::http::RetryPolicy;
use spotify_playlist_toolbox::error::FetchError;

#[test]
fn walks_next_links_in_order_with_one_round_trip_per_page() {
    let mut server = Server::new();
    let base = server.url();

    let m1 = server
        .mock("GET", "/page1")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "items": [1, 2], "next": format!("{}/page2", base) }).to_string())
        .expect(1)
        .create();
    let m2 = server
        .mock("GET", "/page2")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "items": [3, 4], "next": format!("{}/page3", base) }).to_string())
        .expect(1)
        .create();
    let m3 = server
        .mock("GET", "/page3")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "items": [5, 6], "next": null }).to_string())
        .expect(1)
        .create();

    let rt = tokio::runtime::Runtime::new().unwrap();
    let items: Vec<i64> = rt.block_on(async {
        let client = reqwest::Client::new();
        fetch_all(&client, &RetryPolicy::default(), &format!("{}/page1", base), "tok")
            .await
            .unwrap()
    });

    assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
    m1.assert();
    m2.assert();
    m3.assert();
}

#[test]
fn aborts_on_the_first_http_error() {
    let mut server = Server::new();
    let base = server.url();

    let _m1 = server
        .mock("GET", "/page1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "items": [1], "next": format!("{}/page2", base) }).to_string())
        .create();
    let _m2 = server
        .mock("GET", "/page2")
        .with_status(500)
        .with_body("server error")
        .create();

    let rt = tokio::runtime::Runtime::new().unwrap();
    let res: Result<Vec<i64>, FetchError> = rt.block_on(async {
        let client = reqwest::Client::new();
        fetch_all(&client, &RetryPolicy::default(), &format!("{}/page1", base), "tok").await
    });

    assert!(matches!(res, Err(FetchError::HttpError(500))));
}

#[test]
fn tolerates_a_page_without_an_items_field() {
    let mut server = Server::new();

    let _m = server
        .mock("GET", "/empty")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "next": null }).to_string())
        .create();

    let rt = tokio::runtime::Runtime::new().unwrap();
    let items: Vec<i64> = rt.block_on(async {
        let client = reqwest::Client::new();
        fetch_all(&client, &RetryPolicy::default(), &format!("{}/empty", server.url()), "tok")
            .await
            .unwrap()
    });

    assert!(items.is_empty());
}
