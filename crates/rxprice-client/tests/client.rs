//! Integration tests for `CatalogClient` using wiremock HTTP mocks.

use rxprice_core::{ApiEndpoints, Outlet};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rxprice_client::{CatalogClient, ClientError};

const ITEM: &str = "8d3c5a0e-3f7b-4f43-9d0a-2b1f4c7e9a11";

fn test_client(base: &str, max_concurrent: usize) -> CatalogClient {
    let endpoints = ApiEndpoints {
        branches_url: format!("{base}/branches"),
        prices_url: format!("{base}/prices?format=json"),
        competitor_prices_url: format!("{base}/catalog"),
        tasks_url: format!("{base}/tasks"),
        tasks_delete_url: format!("{base}/tasks/delete"),
    };
    CatalogClient::new(&endpoints, "dGVzdDp0ZXN0", 5, "rxprice-test/0.1", max_concurrent)
        .expect("client construction should not fail")
}

fn competitor(id: &str, serial_number: i64) -> Outlet {
    Outlet {
        id: id.to_string(),
        enterprise_id: "RIVAL".to_string(),
        latitude: 50.0,
        longitude: 30.0,
        enterprise_code: 9,
        serial_number,
    }
}

// ---------------------------------------------------------------------------
// branches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_outlets_normalizes_branches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/branches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "ID_Branch": "ab-1",
                "ID_Enterprise": "E-1",
                "Lat": 5_045_000_000_i64,
                "Lng": "3052000000",
                "Code": "1042",
                "SerialNumber": 77
            }
        ])))
        .mount(&server)
        .await;

    let outlets = test_client(&server.uri(), 4)
        .fetch_outlets()
        .await
        .expect("should parse branches");

    assert_eq!(outlets.len(), 1);
    assert_eq!(outlets[0].id, "AB-1");
    assert!((outlets[0].latitude - 50.45).abs() < 1e-9);
    assert!((outlets[0].longitude - 30.52).abs() < 1e-9);
    assert_eq!(outlets[0].enterprise_code, 1042);
    assert_eq!(outlets[0].serial_number, 77);
}

#[tokio::test]
async fn fetch_outlets_surfaces_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/branches"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_client(&server.uri(), 4)
        .fetch_outlets()
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::UnexpectedStatus { status: 503, .. }),
        "expected UnexpectedStatus(503), got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_outlets_rejects_malformed_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/branches"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri(), 4)
        .fetch_outlets()
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Deserialize { ref context, .. } if context == "branches"),
        "expected Deserialize(branches), got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// subject prices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_outlet_prices_sends_auth_and_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(query_param("format", "json"))
        .and(query_param("code", "1042"))
        .and(query_param("idBranch", "AB-1"))
        .and(header("authorization", "Basic dGVzdDp0ZXN0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "ID_Goods": ITEM,
                "OuterCode": "C-100",
                "Name": "Ibuprofen 200mg",
                "Producer": "Farmak",
                "Price": "80,50",
                "PriceReserve": "60,25",
                "Quantity": "12",
                "DateTime": "2024-03-05T08:15:30"
            }
        ])))
        .mount(&server)
        .await;

    let rows = test_client(&server.uri(), 4)
        .fetch_outlet_prices(1042, "AB-1")
        .await
        .expect("should parse prices");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].outer_code, "C-100");
    assert!((rows[0].base_price - 80.5).abs() < 1e-9);
    assert!((rows[0].reserve_price - 60.25).abs() < 1e-9);
    assert!(rows[0].effective_at.is_some());
}

#[tokio::test]
async fn fetch_outlet_prices_without_auth_match_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(header("authorization", "Basic something-else"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = test_client(&server.uri(), 4)
        .fetch_outlet_prices(1, "AB-1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::UnexpectedStatus { status: 404, .. }
    ));
}

// ---------------------------------------------------------------------------
// competitor prices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_competitor_prices_tags_each_outlet() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(query_param("sn", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "govcode": 1, "govid": ITEM, "innercode": "x", "price": "70.00", "priceReserve": "69,00" },
            { "govcode": 2, "govid": "", "innercode": "y", "price": "5.00" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(query_param("sn", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "govid": ITEM, "price": 64.5 }
        ])))
        .mount(&server)
        .await;

    let near = competitor("NEAR", 11);
    let mid = competitor("MID", 12);
    let mut offers = test_client(&server.uri(), 2)
        .fetch_competitor_prices(&[&near, &mid])
        .await
        .expect("should fetch both catalogs");
    offers.sort_by(|a, b| a.outlet_id.cmp(&b.outlet_id));

    assert_eq!(offers.len(), 2);
    assert_eq!(offers[0].outlet_id, "MID");
    assert!((offers[0].price - 64.5).abs() < 1e-9);
    assert_eq!(offers[1].outlet_id, "NEAR");
    assert!((offers[1].reserve_price - 69.0).abs() < 1e-9);
}

#[tokio::test]
async fn fetch_competitor_prices_fails_if_any_outlet_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(query_param("sn", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "govid": ITEM, "price": "70.00" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(query_param("sn", "12"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let near = competitor("NEAR", 11);
    let mid = competitor("MID", 12);
    let err = test_client(&server.uri(), 1)
        .fetch_competitor_prices(&[&near, &mid])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::UnexpectedStatus { status: 500, .. }
    ));
}

#[tokio::test]
async fn fetch_competitor_prices_with_no_outlets_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let offers = test_client(&server.uri(), 4)
        .fetch_competitor_prices(&[])
        .await
        .expect("empty fan-out should succeed");
    assert!(offers.is_empty());
}

// ---------------------------------------------------------------------------
// task queue
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_tasks_sorts_oldest_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("authorization", "Basic dGVzdDp0ZXN0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ID_Branch": "b-2", "Code": "1", "SerialNumber": "2", "DateTime": "2024-03-05T10:00:00" },
            { "ID_Branch": "b-1", "Code": 1, "SerialNumber": 1, "DateTime": "2024-03-05T09:00:00" },
            { "ID_Branch": "b-3", "Code": null, "SerialNumber": "3", "DateTime": "2024-03-05T11:00:00" }
        ])))
        .mount(&server)
        .await;

    let tasks = test_client(&server.uri(), 4)
        .fetch_tasks()
        .await
        .expect("should parse tasks");

    let ids: Vec<&str> = tasks.iter().map(|t| t.outlet_id.as_str()).collect();
    assert_eq!(ids, vec!["B-1", "B-2", "B-3"]);
    assert_eq!(tasks[0].enterprise_code, Some(1));
    assert_eq!(tasks[2].enterprise_code, None);
}

#[tokio::test]
async fn delete_tasks_posts_items() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/delete"))
        .and(body_json(json!({"Items": [{"ID_Branch": "B-1"}, {"ID_Branch": "B-2"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Status": "Ok"})))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri(), 4)
        .delete_tasks(&["B-1".to_string(), "B-2".to_string()])
        .await
        .expect("delete should succeed");
}

#[tokio::test]
async fn delete_tasks_surfaces_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Status": "Error",
            "Description": "branch is locked"
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri(), 4)
        .delete_tasks(&["B-1".to_string()])
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Api(ref msg) if msg == "branch is locked"),
        "expected Api error, got: {err:?}"
    );
}

#[tokio::test]
async fn delete_tasks_with_nothing_to_delete_is_a_no_op() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    test_client(&server.uri(), 4)
        .delete_tasks(&[])
        .await
        .expect("empty delete should succeed");
}
