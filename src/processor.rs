//! Functions for processing message records, one at a time or as a batch.

use crate::error::{AppError, Result};
use crate::models::{MessageRecord, ProcessingResult};
use crate::parser::ContactParser;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio::sync::Semaphore;

const PROGRESS_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}";

/// Builds the progress bar used for batch runs.
pub fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    match ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
        Ok(style) => bar.set_style(style.progress_chars("##-")),
        Err(e) => tracing::warn!("Invalid progress bar template, using default style: {}", e),
    }
    bar
}

/// Parses one record and, when asked, validates the result.
///
/// Records whose message is empty or only whitespace are returned with
/// `skipped` set instead of an all-`None` contact.
pub fn process_record(
    parser: &ContactParser,
    record: MessageRecord,
    validate: bool,
) -> ProcessingResult {
    let task_id = format!(
        "Record: {} | Thread: {:?}",
        record.id.as_deref().unwrap_or("unnamed"),
        std::thread::current().id()
    );
    tracing::debug!(target: "process_record_task", "[{}] Starting processing.", task_id);

    if record.message.trim().is_empty() {
        let reason = "Message is empty".to_string();
        tracing::warn!(target: "process_record_task", "[{}] Skipping record. Reason: {}", task_id, reason);
        return ProcessingResult {
            record,
            parsed: None,
            validation: None,
            skipped: true,
            skip_reason: Some(reason),
        };
    }

    let contact = parser.parse(&record.message);
    let validation = validate.then(|| crate::parser::validate_customer_data(&contact));

    if contact.missing_fields.is_empty() {
        tracing::info!(target: "process_record_task",
            "[{}] ✓ Parsed contact (Confidence: {}/100)", task_id, contact.confidence
        );
    } else {
        tracing::info!(target: "process_record_task",
            "[{}] ✗ Parsed contact (Confidence: {}/100), missing: {}",
            task_id, contact.confidence, contact.missing_fields.join(", ")
        );
    }
    if let Some(result) = validation.as_ref().filter(|v| !v.is_valid) {
        tracing::debug!(target: "process_record_task",
            "[{}] Validation failed: {}", task_id, result.errors.join("; ")
        );
    }

    ProcessingResult {
        record,
        parsed: Some(contact),
        validation,
        skipped: false,
        skip_reason: None,
    }
}

/// Parses every record on the tokio runtime with at most `workers` records in
/// flight. The returned results are in input order.
pub async fn process_batch(
    parser: Arc<ContactParser>,
    records: Vec<MessageRecord>,
    workers: usize,
    validate: bool,
    progress: ProgressBar,
) -> Result<Vec<ProcessingResult>> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    tracing::info!(
        "Processing {} records with {} workers",
        records.len(),
        workers.max(1)
    );

    let tasks: Vec<_> = records
        .into_iter()
        .map(|record| {
            let parser_clone = parser.clone();
            let semaphore_clone = semaphore.clone();
            let progress_clone = progress.clone();

            tokio::spawn(async move {
                let _permit = semaphore_clone
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Task(format!("Worker pool closed: {}", e)))?;
                let result = process_record(&parser_clone, record, validate);
                progress_clone.inc(1);
                Ok::<_, AppError>(result)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(tasks.len());
    for joined in join_all(tasks).await {
        results.push(joined??);
    }

    progress.finish_with_message("Processing complete");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(id: &str, message: &str) -> MessageRecord {
        MessageRecord {
            id: Some(id.to_string()),
            message: message.to_string(),
            other_fields: HashMap::new(),
        }
    }

    #[test]
    fn test_process_record_parses_message() {
        let parser = ContactParser::default();
        let result = process_record(
            &parser,
            record("1", "Name: Priya Sharma\nPhone: 9876543210"),
            false,
        );
        assert!(!result.skipped);
        assert!(result.validation.is_none());
        let parsed = result.parsed.unwrap();
        assert_eq!(parsed.phone.as_deref(), Some("9876543210"));
        assert_eq!(parsed.confidence, 55);
    }

    #[test]
    fn test_process_record_validates_when_asked() {
        let parser = ContactParser::default();
        let result = process_record(&parser, record("1", "9876543210"), true);
        let validation = result.validation.unwrap();
        assert!(!validation.is_valid);
        assert_eq!(validation.errors.len(), 3);
    }

    #[test]
    fn test_blank_message_is_skipped() {
        let parser = ContactParser::default();
        let result = process_record(&parser, record("blank", "  \n\t "), true);
        assert!(result.skipped);
        assert_eq!(result.skip_reason.as_deref(), Some("Message is empty"));
        assert!(result.parsed.is_none());
        assert!(result.validation.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["id"], "blank");
        assert_eq!(json["skipped"], true);
    }

    #[tokio::test]
    async fn test_process_batch_preserves_order() {
        let parser = Arc::new(ContactParser::default());
        let records: Vec<MessageRecord> = (0..20)
            .map(|i| record(&i.to_string(), &format!("Name: Person {}\nPhone: 98765432{:02}", i, i)))
            .collect();

        let results = process_batch(parser, records, 3, false, ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(results.len(), 20);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.record.id.as_deref(), Some(i.to_string().as_str()));
            let phone = result.parsed.as_ref().unwrap().phone.clone().unwrap();
            assert_eq!(phone, format!("98765432{:02}", i));
        }
    }

    #[tokio::test]
    async fn test_process_batch_zero_workers_still_runs() {
        let parser = Arc::new(ContactParser::default());
        let results = process_batch(
            parser,
            vec![record("a", "9876543210"), record("b", "")],
            0,
            true,
            ProgressBar::hidden(),
        )
        .await
        .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].validation.is_some());
        assert!(results[1].skipped);
    }
}
