use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::Request,
    routing::get,
};
use hyper::StatusCode;
use oncf_backend::{
    AppState, create_router,
    models::{GpxResponse, NetworkResponse, PlacementStrategy, PositionsResponse, ResolvedPosition},
    resolver::IncidentLocator,
    upstream::UpstreamClient,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_app(upstream: Option<UpstreamClient>) -> Router {
    create_router(AppState::new(IncidentLocator::oncf().clone(), upstream))
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serves `body` on `/api/evenements` from an ephemeral port.
async fn fake_dashboard(body: Value) -> String {
    let app = Router::new().route(
        "/api/evenements",
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn resolve_endpoint_places_station_incident() {
    let app = test_app(None);
    let payload = json!({
        "id": 7,
        "gare_debut_nom": "Marrakech",
        "type_localisation": "gare"
    });

    let response = app.oneshot(post_json("/api/incidents/resolve", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ResolvedPosition = read_json(response).await;
    assert_eq!(body.strategy, PlacementStrategy::StationNames);
    assert!(body.in_station);
    assert!((body.coordinate.lat - 31.6295).abs() <= 0.0005);
    assert!((body.coordinate.lon + 7.9811).abs() <= 0.0005);
}

#[tokio::test]
async fn resolve_endpoint_is_deterministic() {
    let app = test_app(None);
    let payload = json!({"id": 100, "pk_debut": "650+000", "type_name": "Voie"});

    let first: ResolvedPosition = read_json(
        app.clone()
            .oneshot(post_json("/api/incidents/resolve", payload.clone()))
            .await
            .unwrap(),
    )
    .await;
    let second: ResolvedPosition = read_json(
        app.oneshot(post_json("/api/incidents/resolve", payload))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(first, second);
    assert_eq!(first.strategy, PlacementStrategy::KilometerPoint);
}

#[tokio::test]
async fn positions_endpoint_returns_markers_and_statistics() {
    let app = test_app(None);
    let payload = json!([
        {"id": 1, "gare_debut_id": "LIN01.T001.FES", "type_localisation": "Gare",
         "type_name": "Signal", "statut": "Ouvert", "pk_debut": "12+300"},
        {"id": 2, "localisation_nom": "PN Settat", "statut": "Fermé"},
        {"id": 3}
    ]);

    let response = app.oneshot(post_json("/api/incidents/positions", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PositionsResponse = read_json(response).await;
    assert_eq!(body.markers.len(), 3);
    assert_eq!(body.markers[0].title, "Signal - Ouvert");
    assert_eq!(body.markers[0].style.size, 18);
    assert_eq!(body.markers[0].pk_label.as_deref(), Some("12+300"));
    assert_eq!(body.markers[1].location_label.as_deref(), Some("PN Settat"));
    assert_eq!(body.markers[2].position.strategy, PlacementStrategy::NetworkSpread);

    assert_eq!(body.statistics.total, 3);
    assert_eq!(body.statistics.by_status.open, 1);
    assert_eq!(body.statistics.by_status.closed, 1);
    assert_eq!(body.statistics.in_station, 1);
    assert_eq!(body.statistics.on_line, 2);
}

#[tokio::test]
async fn gpx_endpoint_returns_waypoints() {
    let app = test_app(None);
    let payload = json!([{"id": 1, "gare_debut_nom": "Kenitra"}, {"id": 2}]);

    let response = app.oneshot(post_json("/api/incidents/gpx", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: GpxResponse = read_json(response).await;
    assert_eq!(body.count, 2);
    assert!(!body.gpx_base64.is_empty());
}

#[tokio::test]
async fn network_endpoint_lists_stations_and_routes() {
    let app = test_app(None);
    let response = app.oneshot(get_request("/api/network")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: NetworkResponse = read_json(response).await;
    assert_eq!(body.stations.len(), 39);
    assert_eq!(body.routes.len(), 10);
    assert!(body.routes.iter().all(|route| route.length_km > 0.0));
}

#[tokio::test]
async fn map_endpoint_requires_upstream() {
    let app = test_app(None);
    let response = app.oneshot(get_request("/api/map/incidents")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn map_endpoint_rejects_bad_filter() {
    let app = test_app(None);
    let response = app.oneshot(get_request("/api/map/incidents?type=abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn map_endpoint_filters_upstream_incidents() {
    let base_url = fake_dashboard(json!({
        "success": true,
        "data": [
            {"id": 1, "statut": "Ouvert", "type_id": 2, "gare_debut_nom": "Oujda"},
            {"id": 2, "statut": "Fermé", "type_id": 2, "gare_debut_nom": "Nador"},
            {"id": 3, "statut": "Ouvert", "type_id": 5}
        ],
        "pagination": {"page": 1, "per_page": 500, "total": 3}
    }))
    .await;
    let app = test_app(Some(UpstreamClient::new(base_url, 500)));

    let response = app
        .oneshot(get_request("/api/map/incidents?status=Ouvert&type=2&source="))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PositionsResponse = read_json(response).await;
    let ids: Vec<i64> = body.markers.iter().map(|marker| marker.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(body.statistics.total, 1);
}

#[tokio::test]
async fn map_endpoint_reports_upstream_failure() {
    let base_url = fake_dashboard(json!({"success": false, "error": "database unavailable"})).await;
    let app = test_app(Some(UpstreamClient::new(base_url, 10)));

    let response = app.oneshot(get_request("/api/map/incidents")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = read_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("database unavailable"));
}
