//! Test doubles shared by the service tests.
//!
//! `FakeTransport` records every request and answers from a programmed
//! route table, standing in for the HTTP client so the engines can be
//! driven deterministically.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use serde_json::{Value, json};

use clementine_core::{Category, InventoryStatus};
use rust_decimal::Decimal;

use crate::api::types::ProductRequest;
use crate::api::{ApiError, FieldError, Transport};

/// A request observed by the fake.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// How a programmed route should fail.
#[derive(Debug, Clone)]
enum Failure {
    Unavailable,
    Validation(Vec<FieldError>),
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Self::Unavailable => ApiError::Unavailable("connection refused".to_string()),
            Self::Validation(errors) => ApiError::Validation(errors.clone()),
        }
    }
}

/// Recording transport double.
///
/// Unrouted requests answer `null`, which is enough for endpoints whose
/// response body the engines ignore.
#[derive(Debug, Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<Recorded>>,
    routes: Mutex<HashMap<(String, String), Value>>,
    failures: Mutex<HashMap<(String, String), Failure>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `value` for `method path`.
    pub fn respond(&self, method: &str, path: &str, value: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), value);
        self.failures
            .lock()
            .unwrap()
            .remove(&(method.to_string(), path.to_string()));
    }

    /// Make `method path` fail as unreachable.
    pub fn fail(&self, method: &str, path: &str) {
        self.failures.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            Failure::Unavailable,
        );
    }

    /// Make `method path` fail with a specific error.
    pub fn fail_with(&self, method: &str, path: &str, error: ApiError) {
        let failure = match error {
            ApiError::Validation(errors) => Failure::Validation(errors),
            _ => Failure::Unavailable,
        };
        self.failures
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), failure);
    }

    /// Every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests matching `method path`.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    fn handle(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.requests.lock().unwrap().push(Recorded {
            method: method.to_string(),
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            body,
        });

        let key = (method.to_string(), path.to_string());
        if let Some(failure) = self.failures.lock().unwrap().get(&key) {
            return Err(failure.to_error());
        }

        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or(Value::Null))
    }
}

impl Transport for FakeTransport {
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, ApiError>> + Send {
        let result = self.handle("GET", path, query, None);
        async move { result }
    }

    fn post(&self, path: &str, body: Value) -> impl Future<Output = Result<Value, ApiError>> + Send {
        let result = self.handle("POST", path, &[], Some(body));
        async move { result }
    }

    fn patch(
        &self,
        path: &str,
        body: Value,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send {
        let result = self.handle("PATCH", path, &[], Some(body));
        async move { result }
    }

    fn delete(&self, path: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        let result = self.handle("DELETE", path, &[], None).map(|_| ());
        async move { result }
    }
}

// =============================================================================
// Fixture builders
// =============================================================================

/// A product in the wire format, with fields derived from `id`.
pub fn product_json(id: i64) -> Value {
    json!({
        "id": id,
        "code": format!("p{id}"),
        "name": format!("Product {id}"),
        "description": "",
        "image": format!("product-{id}.jpg"),
        "category": "Accessories",
        "price": 10.0,
        "quantity": 50,
        "inventoryStatus": "INSTOCK",
        "rating": 4.0,
        "createdAt": 1_718_960_400_000_i64,
        "updatedAt": 1_718_960_400_000_i64
    })
}

/// A cart line in the wire format.
pub fn cart_item_json(id: i64, product_id: i64, quantity: u32) -> Value {
    json!({
        "id": id,
        "product": product_json(product_id),
        "quantity": quantity
    })
}

/// A wishlist entry in the wire format.
pub fn wishlist_item_json(id: i64, product_id: i64) -> Value {
    json!({
        "id": id,
        "product": product_json(product_id)
    })
}

/// A valid product administration request.
pub fn product_request(code: &str) -> ProductRequest {
    ProductRequest {
        code: code.to_string(),
        name: format!("Product {code}"),
        description: Some("A test product".to_string()),
        image: None,
        category: Category::Accessories,
        price: Decimal::new(1000, 2),
        quantity: 5,
        internal_reference: None,
        shell_id: None,
        inventory_status: InventoryStatus::InStock,
        rating: Some(4.0),
    }
}
