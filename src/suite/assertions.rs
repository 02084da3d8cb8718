use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::executor::{ResponseBody, ResponseDescriptor};
use crate::scenarios::{BodyShape, Expectation};

/// A way in which a response departed from its scenario's expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    Status { expected: Vec<u16>, actual: u16 },
    Shape { shape: &'static str, reason: String },
    ContentType {
        expected: &'static str,
        actual: Option<String>,
    },
    Duration { limit_ms: u64, actual_ms: u64 },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Status { expected, actual } => {
                let expected = expected
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(" or ");
                write!(f, "expected status {expected}, got {actual}")
            }
            Mismatch::Shape { shape, reason } => write!(f, "body is not {shape}: {reason}"),
            Mismatch::ContentType { expected, actual } => match actual {
                Some(actual) => write!(f, "expected content type {expected}, got {actual}"),
                None => write!(f, "expected content type {expected}, got none"),
            },
            Mismatch::Duration {
                limit_ms,
                actual_ms,
            } => write!(f, "took {actual_ms} ms, limit is {limit_ms} ms"),
        }
    }
}

/// Checks a response against an expectation. An empty result means the
/// scenario passed.
pub fn evaluate(expectation: &Expectation, response: &ResponseDescriptor) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    match expectation.outcome_for(response.status) {
        Some(outcome) => {
            if let Some(expected) = outcome.content_type {
                let actual = response.content_type();
                if !actual.is_some_and(|actual| actual.contains(expected)) {
                    mismatches.push(Mismatch::ContentType {
                        expected,
                        actual: actual.map(str::to_string),
                    });
                }
            }
            if let Err(reason) = check_shape(&outcome.shape, &response.body) {
                mismatches.push(Mismatch::Shape {
                    shape: outcome.shape.name(),
                    reason,
                });
            }
        }
        None => mismatches.push(Mismatch::Status {
            expected: expectation.statuses(),
            actual: response.status,
        }),
    }

    if let Some(limit_ms) = expectation.max_duration_ms {
        if response.duration_ms >= limit_ms {
            mismatches.push(Mismatch::Duration {
                limit_ms,
                actual_ms: response.duration_ms,
            });
        }
    }

    mismatches
}

pub fn check_shape(shape: &BodyShape, body: &ResponseBody) -> Result<(), String> {
    if *shape == BodyShape::Any {
        return Ok(());
    }
    let Some(value) = body.as_json() else {
        return Err("response body is not JSON".to_string());
    };

    match shape {
        BodyShape::Any => Ok(()),
        BodyShape::JsonArray => as_array(value).map(|_| ()),
        BodyShape::ArrayOfTextItems => first_text(value).map(|_| ()),
        BodyShape::NonEmptyTexts => {
            for (index, item) in as_array(value)?.iter().enumerate() {
                match item.get("text").and_then(Value::as_str) {
                    Some("") => return Err(format!("item {index} has an empty `text`")),
                    Some(_) => {}
                    None => return Err(format!("item {index} has no string `text`")),
                }
            }
            Ok(())
        }
        BodyShape::BlogOutline { structured } => check_outline(value, *structured),
        BodyShape::ArrayOfArticles => check_articles(value),
        BodyShape::ObjectWithDataArray => match value.get("data") {
            Some(Value::Array(_)) => Ok(()),
            Some(_) => Err("`data` is not an array".to_string()),
            None => Err("missing `data` field".to_string()),
        },
        BodyShape::ErrorDetail { contains } => {
            let detail = value
                .get("detail")
                .ok_or_else(|| "missing `detail` field".to_string())?;
            match contains {
                None => Ok(()),
                Some(needle) => {
                    let rendered = match detail {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    if rendered.contains(needle) {
                        Ok(())
                    } else {
                        Err(format!("`detail` does not mention {needle:?}"))
                    }
                }
            }
        }
    }
}

fn as_array(value: &Value) -> Result<&Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("expected an array, found {}", kind(value)))
}

fn first_text(value: &Value) -> Result<&str, String> {
    let items = as_array(value)?;
    let first = items.first().ok_or_else(|| "array is empty".to_string())?;
    for (index, item) in items.iter().enumerate() {
        if !item.get("text").is_some_and(Value::is_string) {
            return Err(format!("item {index} has no string `text`"));
        }
    }
    let text = first.get("text").and_then(Value::as_str).unwrap_or_default();
    if text.is_empty() {
        return Err("first `text` is empty".to_string());
    }
    Ok(text)
}

static OUTLINE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"TITLE:.*\nBLOG OUTLINE:").expect("valid regex"));

fn check_outline(value: &Value, structured: bool) -> Result<(), String> {
    let items = as_array(value)?;
    if items.len() != 1 {
        return Err(format!("expected exactly one outline, found {}", items.len()));
    }
    let text = items[0]
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| "outline has no string `text`".to_string())?;
    for marker in ["TITLE:", "BLOG OUTLINE:"] {
        if !text.contains(marker) {
            return Err(format!("outline does not mention {marker:?}"));
        }
    }
    if !structured {
        return Ok(());
    }
    if !OUTLINE_HEADER.is_match(text) {
        return Err("title line is not followed by the outline header".to_string());
    }
    let lines = text.split('\n').count();
    if lines <= 2 {
        return Err(format!("outline has {lines} lines, expected more than 2"));
    }
    Ok(())
}

fn check_articles(value: &Value) -> Result<(), String> {
    let items = as_array(value)?;
    if items.len() != 1 {
        return Err(format!("expected exactly one article, found {}", items.len()));
    }
    let article = &items[0];
    for field in ["article_title", "article_intro"] {
        if !article.get(field).is_some_and(Value::is_string) {
            return Err(format!("article has no string `{field}`"));
        }
    }
    if !article.get("article_sections").is_some_and(Value::is_array) {
        return Err("article has no `article_sections` array".to_string());
    }
    let sections = article
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| "article has no `data` array".to_string())?;
    for (index, section) in sections.iter().enumerate() {
        for field in ["title", "content"] {
            if !section.get(field).is_some_and(Value::is_string) {
                return Err(format!("section {index} has no string `{field}`"));
            }
        }
    }
    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
