//! API server for chat-contact-parser.

use crate::error::{AppError, Result};
use crate::models::{MessageRecord, ParseOutcome, ParsedContact, ProcessingResult, ValidationResult};
use crate::parser::{ContactParser, validate_customer_data};
use crate::processor::process_record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use warp::{Filter, Rejection, Reply, http::StatusCode};

const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// API response structure
#[derive(Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
}

impl ApiResponse<()> {
    fn failure(message: &str) -> Self {
        ApiResponse {
            success: false,
            message: message.to_string(),
            result: None,
        }
    }
}

/// Single message API request structure
#[derive(Deserialize)]
struct ParseRequest {
    message: String,
    #[serde(default)]
    validate: bool,
}

/// A batch entry is either bare text or a full record with an id.
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchItem {
    Text(String),
    Record(MessageRecord),
}

impl From<BatchItem> for MessageRecord {
    fn from(item: BatchItem) -> Self {
        match item {
            BatchItem::Text(message) => MessageRecord {
                id: None,
                message,
                other_fields: HashMap::new(),
            },
            BatchItem::Record(record) => record,
        }
    }
}

/// Batch API request structure
#[derive(Deserialize)]
struct BatchRequest {
    messages: Vec<BatchItem>,
    #[serde(default)]
    validate: bool,
}

/// Batch API response structure
#[derive(Serialize)]
struct BatchResponse {
    success: bool,
    message: String,
    results: Vec<ProcessingResult>,
}

/// Custom error type for API rejections
#[derive(Debug)]
struct ApiError;

impl warp::reject::Reject for ApiError {}

/// Builds the full route tree. Exposed separately from the server so the
/// routes can be driven with `warp::test`.
pub fn routes(
    parser: Arc<ContactParser>,
    max_concurrency: usize,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let parser_filter = warp::any().map(move || parser.clone());

    // Limit concurrent requests
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let semaphore_filter = warp::any().map(move || semaphore.clone());

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            warp::reply::json(&ApiResponse::<()> {
                success: true,
                message: "Contact parser API is running".to_string(),
                result: None,
            })
        });

    let parse = warp::path("parse")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(parser_filter.clone())
        .and(semaphore_filter.clone())
        .and_then(handle_parse);

    let validate = warp::path("validate")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and_then(handle_validate);

    let batch = warp::path("batch")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(parser_filter)
        .and(semaphore_filter)
        .and_then(handle_batch);

    health
        .or(parse)
        .or(validate)
        .or(batch)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_methods(vec!["GET", "POST"])
                .allow_header("content-type"),
        )
        .recover(handle_rejection)
}

/// Start the API server and run until Ctrl-C.
pub async fn start_api_server(
    parser: Arc<ContactParser>,
    port: u16,
    max_concurrency: usize,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let (bound, server) = warp::serve(routes(parser, max_concurrency))
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .map_err(|e| {
            AppError::Generic(anyhow::Error::new(e).context(format!("Failed to bind port {}", port)))
        })?;

    tracing::info!("Starting API server on {}", bound);
    server.await;
    tracing::info!("API server stopped");

    Ok(())
}

/// Handle a single message parse request
async fn handle_parse(
    request: ParseRequest,
    parser: Arc<ContactParser>,
    semaphore: Arc<Semaphore>,
) -> std::result::Result<impl Reply, Rejection> {
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|_| warp::reject::custom(ApiError))?;

    tracing::info!("Processing single message parse request");
    let contact = parser.parse(&request.message);
    let validation = request.validate.then(|| validate_customer_data(&contact));

    Ok(warp::reply::json(&ApiResponse {
        success: true,
        message: "Message parsed successfully".to_string(),
        result: Some(ParseOutcome { contact, validation }),
    }))
}

/// Handle a validation request for a contact-shaped record
async fn handle_validate(contact: ParsedContact) -> std::result::Result<impl Reply, Rejection> {
    let result: ValidationResult = validate_customer_data(&contact);
    let message = if result.is_valid {
        "Contact is valid".to_string()
    } else {
        format!("Contact has {} validation error(s)", result.errors.len())
    };

    Ok(warp::reply::json(&ApiResponse {
        success: true,
        message,
        result: Some(result),
    }))
}

/// Handle a batch parse request
async fn handle_batch(
    batch: BatchRequest,
    parser: Arc<ContactParser>,
    semaphore: Arc<Semaphore>,
) -> std::result::Result<impl Reply, Rejection> {
    tracing::info!("Processing batch of {} messages", batch.messages.len());

    let mut results = Vec::with_capacity(batch.messages.len());

    for item in batch.messages {
        let _permit = semaphore
            .acquire()
            .await
            .map_err(|_| warp::reject::custom(ApiError))?;
        results.push(process_record(&parser, item.into(), batch.validate));
    }

    Ok(warp::reply::json(&BatchResponse {
        success: true,
        message: format!("Processed {} messages", results.len()),
        results,
    }))
}

/// Handle API rejections
async fn handle_rejection(err: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found")
    } else if err.find::<ApiError>().is_some() {
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large")
    } else {
        tracing::debug!("Rejected request: {:?}", err);
        (StatusCode::BAD_REQUEST, "Bad request")
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::failure(message)),
        status,
    ))
}
