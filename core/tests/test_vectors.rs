//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use product_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, ListQuery, Product, ProductClient,
    ProductCreate, ProductUpdate,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8000/api/v1";

fn client() -> ProductClient {
    ProductClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

/// Check method, path and (when the vector has one) body of a built request.
fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");
    match expected.get("body") {
        Some(body) => {
            let actual: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&actual, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

/// Check that `err` matches the vector's `expected_error` tag.
fn assert_error(name: &str, err: &ApiError, expected: &str) {
    let ok = match expected {
        "not_found" => err.is_not_found(),
        "client" => matches!(err, ApiError::Client { .. }),
        "server" => matches!(err, ApiError::Server { .. }),
        other => panic!("unknown expected_error: {other}"),
    };
    assert!(ok, "{name}: expected {expected}, got {err:?}");
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let raw = include_str!("../../test-vectors/create.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: ProductCreate = serde_json::from_value(case["input"].clone()).unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_create_product(&input).unwrap();
        assert_request(name, &req, expected_req);

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        // Verify parse
        let product = c.parse_create_product(simulated_response(case)).unwrap();
        let expected: Product = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(product, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let query = ListQuery::new(
            input["skip"].as_u64().unwrap() as u32,
            input["limit"].as_u64().unwrap() as u32,
            input["search"].as_str().unwrap(),
        );

        // Verify build
        let req = c.build_list_products(&query).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_list_products(simulated_response(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, &result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let expected: Vec<Product> =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[test]
fn get_test_vectors() {
    let raw = include_str!("../../test-vectors/get.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();

        // Verify build
        let req = c.build_get_product(id);
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_get_product(simulated_response(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, &result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let expected: Product = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let raw = include_str!("../../test-vectors/update.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();
        let input: ProductUpdate = serde_json::from_value(case["input"].clone()).unwrap();

        // Verify build
        let req = c.build_update_product(id, &input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_update_product(simulated_response(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, &result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let expected: Product = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let raw = include_str!("../../test-vectors/delete.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();

        // Verify build
        let req = c.build_delete_product(id);
        assert_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = c.parse_delete_product(simulated_response(case));
        match case.get("expected_error") {
            Some(expected_error) => {
                assert_error(name, &result.unwrap_err(), expected_error.as_str().unwrap())
            }
            None => assert!(result.is_ok(), "{name}: expected success, got {result:?}"),
        }
    }
}
