use std::{fmt, str::FromStr};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::executor::{Method, RequestDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Positive,
    Negative,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Positive => "positive",
            Intent::Negative => "negative",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown tag {0:?} (expected positive or negative)")]
pub struct UnknownIntent(pub String);

impl FromStr for Intent {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('@').to_ascii_lowercase().as_str() {
            "positive" => Ok(Intent::Positive),
            "negative" => Ok(Intent::Negative),
            _ => Err(UnknownIntent(s.to_string())),
        }
    }
}

/// A content endpoint together with its known-good request and the scenarios
/// that exercise it.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: &'static str,
    pub path: String,
    pub method: Method,
    /// Valid JSON body; `None` for endpoints driven purely by query params.
    pub payload: Option<Value>,
    /// Endpoint-specific query parameters added on top of the defaults.
    pub query: Vec<(&'static str, String)>,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub intent: Intent,
    pub mutations: Vec<Mutation>,
    pub expectation: Expectation,
}

/// Structural change applied to the endpoint's valid request.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetField(&'static str, Value),
    RemoveField(&'static str),
    ReplaceBody(Value),
    SetQuery(&'static str, String),
    RemoveQuery(&'static str),
    /// Edits one field of a JSON object carried inside a query parameter.
    SetQueryJsonField {
        param: &'static str,
        field: &'static str,
        value: Value,
    },
    SetHeader(&'static str, String),
}

impl Mutation {
    pub fn apply(&self, request: &RequestDescriptor) -> Result<RequestDescriptor> {
        match self {
            Mutation::SetField(field, value) => {
                let mut body = body_object(request)?;
                body.insert(field.to_string(), value.clone());
                Ok(request.with_body(Value::Object(body)))
            }
            Mutation::RemoveField(field) => {
                let mut body = body_object(request)?;
                body.remove(*field);
                Ok(request.with_body(Value::Object(body)))
            }
            Mutation::ReplaceBody(body) => Ok(request.with_body(body.clone())),
            Mutation::SetQuery(name, value) => Ok(request.with_query(name, value.clone())),
            Mutation::RemoveQuery(name) => Ok(request.without_query(name)),
            Mutation::SetQueryJsonField {
                param,
                field,
                value,
            } => {
                let raw = request
                    .query_params
                    .get(*param)
                    .ok_or_else(|| anyhow!("query parameter {param} is not set"))?;
                let mut data: Value = serde_json::from_str(raw)
                    .with_context(|| format!("parsing query parameter {param} as JSON"))?;
                data.as_object_mut()
                    .ok_or_else(|| anyhow!("query parameter {param} is not a JSON object"))?
                    .insert(field.to_string(), value.clone());
                Ok(request.with_query(param, data.to_string()))
            }
            Mutation::SetHeader(name, value) => Ok(request.with_header(name, value.clone())),
        }
    }
}

fn body_object(request: &RequestDescriptor) -> Result<Map<String, Value>> {
    match &request.body {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(anyhow!("request body is not a JSON object")),
    }
}

/// Declared success/failure shape of a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyShape {
    Any,
    /// A JSON array, possibly empty.
    JsonArray,
    /// `[{"text": "..."}, ...]` with a non-empty first text.
    ArrayOfTextItems,
    /// `[{"text": "..."}, ...]` where no text is empty.
    NonEmptyTexts,
    /// A single text mentioning `TITLE:` and `BLOG OUTLINE:`. When
    /// `structured`, the title line must directly precede the outline header
    /// and the text must span more than two lines.
    BlogOutline { structured: bool },
    /// Exactly one generated article with titled sections under `data`.
    ArrayOfArticles,
    /// `{"data": [...]}`
    ObjectWithDataArray,
    /// `{"detail": ...}`, optionally containing a substring.
    ErrorDetail { contains: Option<&'static str> },
}

impl BodyShape {
    pub fn name(&self) -> &'static str {
        match self {
            BodyShape::Any => "any",
            BodyShape::JsonArray => "json array",
            BodyShape::ArrayOfTextItems => "array of text items",
            BodyShape::NonEmptyTexts => "array of non-empty texts",
            BodyShape::BlogOutline { .. } => "blog outline",
            BodyShape::ArrayOfArticles => "array of articles",
            BodyShape::ObjectWithDataArray => "object with data array",
            BodyShape::ErrorDetail { .. } => "error detail",
        }
    }
}

/// One acceptable answer: a status and the body shape that must accompany it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: u16,
    pub shape: BodyShape,
    /// Substring the `Content-Type` header must contain.
    pub content_type: Option<&'static str>,
}

impl Outcome {
    fn new(status: u16, shape: BodyShape) -> Self {
        Self {
            status,
            shape,
            content_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub outcomes: Vec<Outcome>,
    pub max_duration_ms: Option<u64>,
}

impl Expectation {
    pub fn status(status: u16) -> Self {
        Self::shaped(status, BodyShape::Any)
    }

    pub fn shaped(status: u16, shape: BodyShape) -> Self {
        Self {
            outcomes: vec![Outcome::new(status, shape)],
            max_duration_ms: None,
        }
    }

    pub fn or(mut self, status: u16, shape: BodyShape) -> Self {
        self.outcomes.push(Outcome::new(status, shape));
        self
    }

    /// Requires the most recently added outcome to carry this content type.
    pub fn content_type(mut self, content_type: &'static str) -> Self {
        if let Some(outcome) = self.outcomes.last_mut() {
            outcome.content_type = Some(content_type);
        }
        self
    }

    pub fn within_ms(mut self, max_duration_ms: u64) -> Self {
        self.max_duration_ms = Some(max_duration_ms);
        self
    }

    pub fn statuses(&self) -> Vec<u16> {
        self.outcomes.iter().map(|outcome| outcome.status).collect()
    }

    pub fn outcome_for(&self, status: u16) -> Option<&Outcome> {
        self.outcomes.iter().find(|outcome| outcome.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Method, QueryParams};
    use serde_json::json;

    fn request() -> RequestDescriptor {
        RequestDescriptor::new(Method::Post, "https://api.example.com/x")
            .query(QueryParams::from([
                ("engine".to_string(), "premium".to_string()),
                (
                    "data".to_string(),
                    json!({"article_title": "AI"}).to_string(),
                ),
            ]))
            .json(json!({"topic": "AI", "primary_keyword": "test"}))
    }

    #[test]
    fn set_and_remove_field_edit_body_copy() -> Result<()> {
        let original = request();
        let emptied = Mutation::SetField("topic", json!("")).apply(&original)?;
        let removed = Mutation::RemoveField("primary_keyword").apply(&original)?;

        assert_eq!(emptied.body, Some(json!({"topic": "", "primary_keyword": "test"})));
        assert_eq!(removed.body, Some(json!({"topic": "AI"})));
        assert_eq!(
            original.body,
            Some(json!({"topic": "AI", "primary_keyword": "test"}))
        );
        Ok(())
    }

    #[test]
    fn set_field_rejects_non_object_body() {
        let request = request().json(json!(["not", "an", "object"]));
        let err = Mutation::SetField("topic", json!("")).apply(&request).unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn query_mutations() -> Result<()> {
        let emptied = Mutation::SetQuery("engine", String::new()).apply(&request())?;
        assert_eq!(emptied.query_params["engine"], "");

        let removed = Mutation::RemoveQuery("engine").apply(&request())?;
        assert!(!removed.query_params.contains_key("engine"));
        Ok(())
    }

    #[test]
    fn set_query_json_field_rewrites_embedded_object() -> Result<()> {
        let updated = Mutation::SetQueryJsonField {
            param: "data",
            field: "article_title",
            value: json!(""),
        }
        .apply(&request())?;
        let data: Value = serde_json::from_str(&updated.query_params["data"])?;
        assert_eq!(data, json!({"article_title": ""}));
        Ok(())
    }

    #[test]
    fn set_query_json_field_requires_parameter() {
        let err = Mutation::SetQueryJsonField {
            param: "missing",
            field: "x",
            value: json!(1),
        }
        .apply(&request())
        .unwrap_err();
        assert!(err.to_string().contains("query parameter missing is not set"));
    }

    #[test]
    fn set_header_overrides_value() -> Result<()> {
        let updated = Mutation::SetHeader("X-API-KEY", "invalid-key".to_string()).apply(&request())?;
        assert_eq!(updated.headers["X-API-KEY"], "invalid-key");
        Ok(())
    }

    #[test]
    fn intent_parses_tags() {
        assert_eq!("@positive".parse::<Intent>().unwrap(), Intent::Positive);
        assert_eq!("Negative".parse::<Intent>().unwrap(), Intent::Negative);
        assert!("smoke".parse::<Intent>().is_err());
    }

    #[test]
    fn expectation_lists_alternatives() {
        let expectation = Expectation::shaped(200, BodyShape::ArrayOfTextItems)
            .or(401, BodyShape::Any)
            .within_ms(30_000);
        assert_eq!(expectation.statuses(), vec![200, 401]);
        assert_eq!(expectation.outcome_for(401).map(|o| &o.shape), Some(&BodyShape::Any));
        assert!(expectation.outcome_for(500).is_none());
        assert_eq!(expectation.max_duration_ms, Some(30_000));
    }

    #[test]
    fn content_type_applies_to_last_outcome() {
        let expectation = Expectation::shaped(200, BodyShape::BlogOutline { structured: true })
            .content_type("application/json")
            .or(401, BodyShape::Any);
        assert_eq!(
            expectation.outcome_for(200).and_then(|o| o.content_type),
            Some("application/json")
        );
        assert_eq!(expectation.outcome_for(401).and_then(|o| o.content_type), None);
    }
}
