//! Request adapter.
//!
//! Endpoints declare which request shapes they accept and this module pulls
//! the prompt out of whichever one the inbound request matches. Anything
//! that matches no shape is a bad request, decided before any upstream call.

use std::collections::HashMap;

use axum::{
    extract::{Query, Request},
    http::{Method, header},
};
use serde_json::Value;

use crate::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// `POST` with an `application/json` body; the prompt is `field`.
    JsonBody { field: &'static str },
    /// `GET` with the prompt in query parameter `name`.
    QueryParam { name: &'static str },
}

pub const STORY_SHAPES: &[RequestShape] = &[
    RequestShape::JsonBody { field: "userInput" },
    RequestShape::QueryParam { name: "prompt" },
];

pub const IMAGE_SHAPES: &[RequestShape] = &[RequestShape::JsonBody { field: "prompt" }];

/// Extract the prompt from `request`. `Ok(None)` means the shape matched but
/// carried no prompt.
pub async fn extract_prompt(
    request: Request,
    shapes: &[RequestShape],
    max_body_bytes: usize,
) -> Result<Option<String>, RelayError> {
    let method = request.method().clone();

    for shape in shapes {
        match *shape {
            RequestShape::JsonBody { field } if method == Method::POST => {
                if !is_json(&request) {
                    return Err(RelayError::BadRequest);
                }

                let body = axum::body::to_bytes(request.into_body(), max_body_bytes)
                    .await
                    .map_err(|_| RelayError::BadRequest)?;
                let json: Value = serde_json::from_slice(&body).map_err(|_| RelayError::BadRequest)?;

                return Ok(json.get(field).and_then(Value::as_str).map(str::to_string));
            }
            RequestShape::QueryParam { name } if method == Method::GET => {
                let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(request.uri())
                    .map_err(|_| RelayError::BadRequest)?;

                return Ok(params.remove(name));
            }
            _ => continue,
        }
    }

    Err(RelayError::BadRequest)
}

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    fn json_post(body: &str, content_type: &str) -> Request {
        http::Request::builder()
            .method(Method::POST)
            .uri("/story")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_field_extracted() {
        let request = json_post(r#"{"userInput":"a dragon"}"#, "application/json");
        let prompt = extract_prompt(request, STORY_SHAPES, 1024).await.unwrap();
        assert_eq!(prompt.as_deref(), Some("a dragon"));
    }

    #[tokio::test]
    async fn test_content_type_parameters_ignored() {
        let request = json_post(r#"{"prompt":"a fox"}"#, "Application/JSON; charset=utf-8");
        let prompt = extract_prompt(request, IMAGE_SHAPES, 1024).await.unwrap();
        assert_eq!(prompt.as_deref(), Some("a fox"));
    }

    #[tokio::test]
    async fn test_missing_or_non_string_field_is_absent() {
        let request = json_post("{}", "application/json");
        assert_eq!(extract_prompt(request, STORY_SHAPES, 1024).await.unwrap(), None);

        let request = json_post(r#"{"userInput":42}"#, "application/json");
        assert_eq!(extract_prompt(request, STORY_SHAPES, 1024).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_json_post_rejected() {
        let request = json_post("userInput=x", "application/x-www-form-urlencoded");
        let result = extract_prompt(request, STORY_SHAPES, 1024).await;
        assert!(matches!(result, Err(RelayError::BadRequest)));
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let request = json_post("{not json", "application/json");
        let result = extract_prompt(request, IMAGE_SHAPES, 1024).await;
        assert!(matches!(result, Err(RelayError::BadRequest)));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let body = format!(r#"{{"prompt":"{}"}}"#, "x".repeat(64));
        let request = json_post(&body, "application/json");
        let result = extract_prompt(request, IMAGE_SHAPES, 16).await;
        assert!(matches!(result, Err(RelayError::BadRequest)));
    }

    #[tokio::test]
    async fn test_query_param_extracted() {
        let request = http::Request::builder()
            .uri("/story?prompt=a%20sleepy%20owl")
            .body(Body::empty())
            .unwrap();
        let prompt = extract_prompt(request, STORY_SHAPES, 1024).await.unwrap();
        assert_eq!(prompt.as_deref(), Some("a sleepy owl"));
    }

    #[tokio::test]
    async fn test_get_without_query_shape_rejected() {
        let request = http::Request::builder()
            .uri("/generate-image?prompt=cat")
            .body(Body::empty())
            .unwrap();
        let result = extract_prompt(request, IMAGE_SHAPES, 1024).await;
        assert!(matches!(result, Err(RelayError::BadRequest)));
    }

    #[tokio::test]
    async fn test_other_method_rejected() {
        let request = http::Request::builder()
            .method(Method::PUT)
            .uri("/story")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let result = extract_prompt(request, STORY_SHAPES, 1024).await;
        assert!(matches!(result, Err(RelayError::BadRequest)));
    }
}
