// HTTP surface tests for Rentscope

use actix_web::{test, web, App};
use rentscope::config::Settings;
use rentscope::routes::{self, AppState};
use rentscope::services::{ListingsClient, PredictorClient};
use serde_json::{json, Value};
use std::time::Duration;

fn listings_body() -> String {
    json!([
        {
            "Id": 101,
            "Property.Address.AddressText": "1 Bank St, Ottawa",
            "Property.LeaseRent": "$1,200/Monthly",
            "Building.Bedrooms": "1+1",
            "Building.Type": "Apartment",
            "Property.Address.Latitude": 45.41,
            "Property.Address.Longitude": -75.70,
            "Property.AmmenitiesNearBy": "Public Transit, Schools",
        },
        {
            "Id": 102,
            "Property.Address.AddressText": "2 Elgin St, Ottawa",
            "Property.LeaseRent": "$1,450/Monthly",
            "Building.Bedrooms": "2",
            "Building.Type": "House",
            "Property.Address.Latitude": 45.44,
            "Property.Address.Longitude": -75.66,
        },
        {
            "Id": 103,
            "Property.Address.AddressText": "3 Rideau St, Ottawa",
            "Property.LeaseRent": "$2,800/Monthly",
            "Building.Bedrooms": "3",
            "Property.Address.Latitude": 45.43,
            "Property.Address.Longitude": -75.69,
        },
        {
            "Id": 101,
            "Property.LeaseRent": "$999",
        },
    ])
    .to_string()
}

fn create_state(url: String) -> AppState {
    let settings = Settings::default();
    let timeout = Duration::from_secs(5);
    let listings = ListingsClient::new(url.clone(), timeout).unwrap();
    let predictor = PredictorClient::new(url, timeout).unwrap();
    AppState::new(&settings, listings, predictor)
}

async fn mock_listings(server: &mut mockito::ServerGuard, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/api/get_data")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_listings_sorted_and_paged() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_listings(&mut server, 200, &listings_body()).await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::get()
        .uri("/api/v1/listings?sort=price-desc&page=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    mock.assert_async().await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["total"], 3);
    assert_eq!(body["totalPages"], 1);
    let keys: Vec<&str> = body["listings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["103", "102", "101"]);
    assert_eq!(body["listings"][2]["bedrooms"], "2");
    assert_eq!(body["listings"][2]["detailHref"], "/listings/property/101");
}

#[actix_web::test]
async fn test_listings_search_narrow_layout() {
    let mut server = mockito::Server::new_async().await;
    mock_listings(&mut server, 200, &listings_body()).await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::get()
        .uri("/api/v1/listings?search=ELGIN&layout=narrow")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total"], 1);
    assert_eq!(body["listings"][0]["listing"]["Id"], "102");
}

#[actix_web::test]
async fn test_unparsable_payload_is_flagged() {
    let mut server = mockito::Server::new_async().await;
    mock_listings(&mut server, 200, "<html>maintenance</html>").await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::get().uri("/api/v1/listings").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unparsable");
    assert_eq!(body["total"], 0);
    assert_eq!(body["totalPages"], 0);
}

#[actix_web::test]
async fn test_upstream_failure_is_retryable() {
    let mut server = mockito::Server::new_async().await;
    mock_listings(&mut server, 503, "").await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::get().uri("/api/v1/listings").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 502);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status_code"], 502);
    assert_eq!(body["retryable"], true);
}

#[actix_web::test]
async fn test_listing_detail() {
    let mut server = mockito::Server::new_async().await;
    mock_listings(&mut server, 200, &listings_body()).await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::get().uri("/api/v1/listings/101").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // First occurrence wins over the later duplicate
    assert_eq!(body["price"], "$1,200/Monthly");
    assert_eq!(body["bedrooms"], "2");
    assert_eq!(body["bathrooms"], "Not specified");
    assert_eq!(body["amenities"][0], json!({"name": "Public Transit", "present": true}));
    assert_eq!(body["amenities"][1], json!({"name": "Recreation", "present": false}));
    assert!(body["embedUrl"]
        .as_str()
        .unwrap()
        .ends_with("marker=45.41,-75.7"));
}

#[actix_web::test]
async fn test_listing_detail_not_found() {
    let mut server = mockito::Server::new_async().await;
    mock_listings(&mut server, 200, &listings_body()).await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::get().uri("/api/v1/listings/999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn test_budget_map() {
    let mut server = mockito::Server::new_async().await;
    mock_listings(&mut server, 200, &listings_body()).await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::get()
        .uri("/api/v1/map?min_budget=1000&max_budget=1500")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["inBudget"], 2);
    assert_eq!(body["placed"], 2);
    assert_eq!(body["bounds"]["minLat"], 45.41);
    assert_eq!(body["bounds"]["maxLng"], -75.66);

    let markers = body["scene"]["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0]["listingKey"], "101");
    assert!(markers[0]["popupHtml"].as_str().unwrap().contains("View Details"));
    assert!(body["scene"]["viewport"]["zoom"].as_u64().unwrap() <= 15);
    assert!(body["scene"]["tiles"].is_object());
}

#[actix_web::test]
async fn test_budget_map_rejects_reversed_range() {
    let server = mockito::Server::new_async().await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::get()
        .uri("/api/v1/map?min_budget=1500&max_budget=1000")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_budget_map_rejects_non_finite_budget() {
    let server = mockito::Server::new_async().await;
    let app = app!(create_state(server.url()));

    for uri in [
        "/api/v1/map?min_budget=NaN&max_budget=NaN",
        "/api/v1/map?min_budget=0&max_budget=inf",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400, "{} should be rejected", uri);
    }
}

#[actix_web::test]
async fn test_prediction_flow() {
    let mut server = mockito::Server::new_async().await;
    let predict = server
        .mock("POST", "/api/get_prediction")
        .with_status(200)
        .with_body(r#"{"prediction": 1300.0, "accuracy": 0.91}"#)
        .create_async()
        .await;
    mock_listings(&mut server, 200, &listings_body()).await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::post()
        .uri("/api/v1/predictions")
        .set_json(json!({
            "bedNumb": 2,
            "storyNumb": 1,
            "city": "Ottawa",
            "province": 0,
            "buildingType": 0,
            "amenities": 2,
            "publicTransit": true,
            "postedDate": "2024-01-01"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    predict.assert_async().await;

    assert_eq!(body["prediction"], 1300.0);
    assert_eq!(body["accuracy"], 0.91);
    assert_eq!(body["map"]["budget"], json!({"min": 1100.0, "max": 1500.0}));
    assert_eq!(body["map"]["placed"], 2);
}

#[actix_web::test]
async fn test_prediction_rejects_invalid_features() {
    let server = mockito::Server::new_async().await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::post()
        .uri("/api/v1/predictions")
        .set_json(json!({
            "bedNumb": 9,
            "storyNumb": 1,
            "city": "Ottawa",
            "province": 0,
            "buildingType": 0,
            "amenities": 2,
            "postedDate": "2024-01-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_negative_prediction_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/get_prediction")
        .with_status(200)
        .with_body(r#"{"prediction": -350.0, "accuracy": 0.4}"#)
        .create_async()
        .await;
    let app = app!(create_state(server.url()));

    let req = test::TestRequest::post()
        .uri("/api/v1/predictions")
        .set_json(json!({
            "bedNumb": 1,
            "storyNumb": 1,
            "city": "Ottawa",
            "province": 0,
            "buildingType": 0,
            "amenities": 0,
            "postedDate": "2024-01-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 502);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["retryable"], false);
}
