//! End-to-end tests of the resource API router
//!
//! These tests drive the axum router in-process through `axum-test` and check
//! the wire format: envelopes, pagination metadata, filter query encoding and
//! error bodies.

use axum::http::StatusCode;
use axum_test::TestServer;
use console::prelude::*;
use console::resources::{Device, Operator, Service};
use serde_json::{Value, json};

fn create_test_server() -> TestServer {
    let app = ServerBuilder::new()
        .register::<Operator>(
            InMemoryDataSource::with_items(Operator::filter_specs(), Operator::fixtures()).unwrap(),
            Operator::filter_specs(),
        )
        .unwrap()
        .register::<Service>(
            InMemoryDataSource::with_items(Service::filter_specs(), Service::fixtures()).unwrap(),
            Service::filter_specs(),
        )
        .unwrap()
        .register::<Device>(
            InMemoryDataSource::with_items(Device::filter_specs(), Device::fixtures()).unwrap(),
            Device::filter_specs(),
        )
        .unwrap()
        .build()
        .unwrap();

    TestServer::new(app).expect("Failed to create test server")
}

fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_lists_resources() {
        let server = create_test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resource-console");
        assert_eq!(body["resources"], json!(["operators", "services", "devices"]));
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn test_list_returns_envelope_with_pagination() {
        let server = create_test_server();
        let response = server
            .get("/api/operators")
            .add_query_param("page", "2")
            .add_query_param("limit", "5")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(ids(&body), vec!["op-6", "op-7", "op-8", "op-9", "op-10"]);
        assert_eq!(body["pagination"]["page"], 2);
        assert_eq!(body["pagination"]["limit"], 5);
        assert_eq!(body["pagination"]["total"], 12);
        assert_eq!(body["pagination"]["totalPages"], 3);
        assert_eq!(body["pagination"]["hasNext"], true);
        assert_eq!(body["pagination"]["hasPrev"], true);
    }

    #[tokio::test]
    async fn test_list_items_are_camel_case() {
        let server = create_test_server();
        let body: Value = server.get("/api/operators").await.json();
        let first = &body["data"][0];
        assert!(first.get("createdAt").is_some());
        assert!(first.get("created_at").is_none());
    }

    #[tokio::test]
    async fn test_list_decodes_filter_parameters() {
        let server = create_test_server();
        let response = server
            .get("/api/services")
            .add_query_param("filters[category]", "internet")
            .add_query_param("filters[price][min]", "50000")
            .add_query_param("sortBy", "price")
            .add_query_param("sortOrder", "desc")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(ids(&body), vec!["svc-8", "svc-4"]);
    }

    #[tokio::test]
    async fn test_list_decodes_repeated_multiselect_values() {
        let server = create_test_server();
        let body: Value = server
            .get("/api/operators?filters[region]=Toshkent&filters[region]=Samarqand&search=a")
            .await
            .json();
        assert_eq!(ids(&body), vec!["op-1", "op-2"]);
    }

    #[tokio::test]
    async fn test_unparsable_range_bound_is_ignored() {
        let server = create_test_server();
        let body: Value = server
            .get("/api/services")
            .add_query_param("filters[price][min]", "abc")
            .add_query_param("filters[price][max]", "50000")
            .await
            .json();
        for item in body["data"].as_array().unwrap() {
            assert!(item["price"].as_f64().unwrap() <= 50000.0);
        }
        assert!(!ids(&body).is_empty());
    }

    #[tokio::test]
    async fn test_bad_paging_values_fall_back_to_defaults() {
        let server = create_test_server();
        let body: Value = server
            .get("/api/operators")
            .add_query_param("page", "zero")
            .add_query_param("limit", "-3")
            .await
            .json();
        assert_eq!(body["pagination"]["page"], 1);
        assert_eq!(body["pagination"]["limit"], 20);
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let server = create_test_server();
        let response = server
            .get("/api/operators")
            .add_query_param("page", "18446744073709551615")
            .add_query_param("limit", "20")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["pagination"]["page"], json!(u64::MAX));
        assert_eq!(body["pagination"]["totalPages"], 1);
        assert_eq!(body["pagination"]["hasNext"], false);
    }
}

mod crud {
    use super::*;

    fn operator_body() -> Value {
        json!({
            "name": "Bobur Rahimov",
            "status": "active",
            "region": "Buxoro",
            "phone": "+998 91 555 00 11",
            "citizenship": "UZ"
        })
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let server = create_test_server();

        let response = server.post("/api/operators").json(&operator_body()).await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        let id = created["data"]["id"].as_str().unwrap().to_string();
        let created_at = created["data"]["createdAt"].clone();

        let fetched: Value = server.get(&format!("/api/operators/{id}")).await.json();
        assert_eq!(fetched["data"]["name"], "Bobur Rahimov");

        let mut changed = operator_body();
        changed["name"] = json!("Bobur R.");
        changed["status"] = json!("inactive");
        let response = server.put(&format!("/api/operators/{id}")).json(&changed).await;
        response.assert_status_ok();
        let updated: Value = response.json();
        assert_eq!(updated["data"]["id"], id.as_str());
        assert_eq!(updated["data"]["name"], "Bobur R.");
        assert_eq!(updated["data"]["createdAt"], created_at);

        let response = server.delete(&format!("/api/operators/{id}")).await;
        response.assert_status_ok();
        let deleted: Value = response.json();
        assert_eq!(deleted["data"]["id"], id.as_str());

        let response = server.get(&format!("/api/operators/{id}")).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let server = create_test_server();
        let response = server
            .post("/api/devices/bulk-delete")
            .json(&json!({ "ids": ["dev-1", "dev-2", "dev-99"] }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"]["deleted"], json!(["dev-1", "dev-2"]));
        assert_eq!(body["data"]["missing"], json!(["dev-99"]));

        let list: Value = server.get("/api/devices").await.json();
        assert_eq!(list["pagination"]["total"], 8);
    }
}

mod errors {
    use super::*;

    #[tokio::test]
    async fn test_missing_resource_is_404_envelope() {
        let server = create_test_server();
        let response = server.get("/api/operators/99").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "RESOURCE_NOT_FOUND");
        assert_eq!(body["details"]["id"], "99");
        assert!(body["error"].as_str().unwrap().contains("99"));
    }

    #[tokio::test]
    async fn test_invalid_form_is_400_with_field_details() {
        let server = create_test_server();
        let response = server
            .post("/api/services")
            .json(&json!({
                "name": "",
                "status": "active",
                "category": "internet",
                "price": -5.0,
                "region": "Toshkent"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        let fields: Vec<&str> = body["details"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "price"]);

        let list: Value = server.get("/api/services").await.json();
        assert_eq!(list["pagination"]["total"], 8);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let server = create_test_server();
        let response = server
            .post("/api/operators")
            .text("{not json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_missing_is_404() {
        let server = create_test_server();
        let response = server
            .put("/api/services/svc-404")
            .json(&json!({
                "name": "Ghost",
                "status": "active",
                "category": "esim",
                "price": 1.0,
                "region": "Navoiy"
            }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
