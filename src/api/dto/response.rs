//! Success envelopes shared by all resources.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::query::Page;

/// `{ "status": "success", "data": ... }`
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> Success<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// `{ "status": "success", "message": ... }` for operations without a payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }
}

/// A page of documents keyed by collection name:
///
/// ```json
/// { "status": "success", "results": 2, "total": 9, "data": { "tours": [ ... ] } }
/// ```
///
/// `results` counts the documents on this page, `total` all matches.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub status: &'static str,
    pub results: usize,
    pub total: u64,
    pub data: Map<String, Value>,
}

impl ListResponse {
    pub fn new(collection: &str, page: Page) -> Self {
        let results = page.documents.len();
        let documents: Vec<Value> = page.documents.into_iter().map(Value::Object).collect();

        let mut data = Map::new();
        data.insert(collection.to_string(), Value::Array(documents));

        Self {
            status: "success",
            results,
            total: page.total,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::Pagination;
    use serde_json::json;

    #[test]
    fn test_list_response_shape() {
        let mut doc = Map::new();
        doc.insert("name".to_string(), json!("The Forest Hiker"));

        let page = Page {
            documents: vec![doc],
            total: 9,
            pagination: Pagination { page: 1, limit: 1 },
        };

        let value = serde_json::to_value(ListResponse::new("tours", page)).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["results"], 1);
        assert_eq!(value["total"], 9);
        assert_eq!(value["data"]["tours"][0]["name"], "The Forest Hiker");
    }
}
