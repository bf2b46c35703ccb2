//! Drives the client against a local fake of the catalog and the relay.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header},
    routing::get,
};
use serde_json::{Value, json};
use songbattle_catalog::{AccessToken, Client, ClientError};

const TOKEN: &str = "ABC";

fn authorization(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default()
}

fn playlist_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "songs for the road",
        "images": null,
        "owner": {"id": "u1", "display_name": "Sam"},
        "tracks": {"total": 250},
    })
}

/// Serves the handful of endpoints the client uses. Every catalog endpoint
/// insists on `Bearer ABC`; playlist `missing` is a 404.
async fn spawn_fake() -> String {
    async fn user_playlists(headers: HeaderMap) -> Result<Json<Value>, (StatusCode, String)> {
        if authorization(&headers) != format!("Bearer {TOKEN}") {
            return Err((StatusCode::UNAUTHORIZED, "invalid token".to_string()));
        }
        Ok(Json(json!({
            "items": [playlist_json("p1", "Road Trip")],
            "total": 1,
            "offset": 0,
            "limit": 20,
            "next": null,
        })))
    }

    async fn playlist(
        Path(id): Path<String>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, (StatusCode, String)> {
        if authorization(&headers) != format!("Bearer {TOKEN}") {
            return Err((StatusCode::UNAUTHORIZED, "invalid token".to_string()));
        }
        if id == "missing" {
            return Err((StatusCode::NOT_FOUND, "no such playlist".to_string()));
        }
        Ok(Json(playlist_json(&id, "direct")))
    }

    async fn playlist_tracks(
        Path(id): Path<String>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, (StatusCode, String)> {
        if authorization(&headers) != format!("Bearer {TOKEN}") {
            return Err((StatusCode::UNAUTHORIZED, "invalid token".to_string()));
        }
        let offset: u32 = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
        let limit: u32 = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(0);
        Ok(Json(json!({
            "items": [
                {"track": {"id": format!("{id}-{offset}"), "name": "First", "album": {"name": "A"}, "artists": []}},
                {"track": null},
            ],
            "total": 250,
            "offset": offset,
            "limit": limit,
            "next": null,
        })))
    }

    async fn relayed_playlist(Path(id): Path<String>, headers: HeaderMap) -> Json<Value> {
        Json(playlist_json(
            &id,
            &format!("relayed with {}", authorization(&headers)),
        ))
    }

    let app = Router::new()
        .route("/v1/me/playlists", get(user_playlists))
        .route("/v1/playlists/:id", get(playlist))
        .route("/v1/playlists/:id/tracks", get(playlist_tracks))
        .route("/catalog/playlists/:id", get(relayed_playlist));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn token() -> AccessToken {
    AccessToken::new(TOKEN).unwrap()
}

#[tokio::test]
async fn user_playlists_are_fetched_with_a_bearer_token() {
    let base = spawn_fake().await;
    let client = Client::new(format!("{base}/v1"));

    let page = client.get_user_playlists(&token()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Road Trip");
    assert_eq!(page.items[0].description.as_deref(), Some("songs for the road"));
    assert_eq!(page.items[0].owner_name(), Some("Sam"));
}

#[tokio::test]
async fn rejected_tokens_keep_the_status_and_body() {
    let base = spawn_fake().await;
    let client = Client::new(format!("{base}/v1"));

    let error = client
        .get_user_playlists(&AccessToken::new("stale").unwrap())
        .await
        .unwrap_err();
    assert!(error.is_unauthorized());
    match error {
        ClientError::ApiError { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body.as_deref(), Some("invalid token"));
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_playlists_are_api_errors() {
    let base = spawn_fake().await;
    let client = Client::new(format!("{base}/v1"));

    let error = client.get_playlist(&token(), "missing").await.unwrap_err();
    assert_eq!(error.status(), Some(404));
    assert_eq!(error.to_string(), "API error: 404: no such playlist");
}

#[tokio::test]
async fn track_pages_send_offset_and_a_capped_limit() {
    let base = spawn_fake().await;
    let client = Client::new(format!("{base}/v1"));

    let page = client
        .get_playlist_tracks_page(&token(), "p1", 200, 500)
        .await
        .unwrap();
    assert_eq!(page.offset, 200);
    assert_eq!(page.limit, Client::TRACKS_PAGE_SIZE);
    assert_eq!(page.items.len(), 2);
    assert_eq!(
        page.items[0].track.as_ref().map(|t| t.id.as_str()),
        Some("p1-200")
    );
    assert!(page.items[1].track.is_none());

    let page = client
        .get_playlist_tracks_page(&token(), "p1", 0, 10)
        .await
        .unwrap();
    assert_eq!(page.limit, 10);
}

#[tokio::test]
async fn playlists_go_direct_without_a_relay() {
    let base = spawn_fake().await;
    let client = Client::new(format!("{base}/v1"));

    let playlist = client.get_playlist(&token(), "p1").await.unwrap();
    assert_eq!(playlist.name, "direct");
    assert_eq!(playlist.total_tracks(), 250);
}

#[tokio::test]
async fn playlists_go_through_the_relay_when_configured() {
    let base = spawn_fake().await;
    let client = Client::new(format!("{base}/v1")).with_relay(format!("{base}/"));

    let playlist = client.get_playlist(&token(), "p1").await.unwrap();
    assert_eq!(playlist.id, "p1");
    assert_eq!(playlist.name, "relayed with Bearer ABC");

    // Only the playlist lookup is relayed.
    let page = client
        .get_playlist_tracks_page(&token(), "p1", 0, 100)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn forwarded_lookups_pass_the_header_through() {
    let base = spawn_fake().await;
    let client = Client::new(format!("{base}/v1"));

    let body = client.forward_playlist(b"Bearer ABC", "p1").await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["name"], "direct");

    let error = client
        .forward_playlist(b"Bearer nope", "p1")
        .await
        .unwrap_err();
    assert_eq!(error.status(), Some(401));
}
