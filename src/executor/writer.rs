use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use petname::petname;
use serde_json::json;

use super::models::{RequestDescriptor, ResponseDescriptor};

/// Where a failed scenario's artifacts came from.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactLabel<'a> {
    pub run_id: &'a str,
    pub environment: &'a str,
    pub endpoint: &'a str,
    pub scenario: &'a str,
}

/// Persists response bodies of failed scenarios for later inspection.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `<root>/<environment>/<endpoint>/NNN-<name>.<ext>` with the
    /// response body, plus a `.context.json` sidecar describing the exchange.
    /// Returns the body path.
    pub fn write_failure(
        &self,
        label: ArtifactLabel<'_>,
        request: &RequestDescriptor,
        response: &ResponseDescriptor,
        mismatches: &[String],
    ) -> Result<PathBuf> {
        let dir = self
            .root
            .join(sanitize_component(label.environment))
            .join(sanitize_component(label.endpoint));
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating artifact directory {}", dir.display()))?;

        let index = next_index(&dir)?;
        let stem = format!("{:03}-{}", index, petname(2, "-"));
        let body_path = dir.join(format!(
            "{}{}",
            stem,
            extension_for_content_type(response.content_type())
        ));
        let body = response.body.as_bytes();
        fs::write(&body_path, body)
            .with_context(|| format!("writing response body to {}", body_path.display()))?;

        let context = json!({
            "run_id": label.run_id,
            "environment": label.environment,
            "endpoint": label.endpoint,
            "scenario": label.scenario,
            "recorded_at": chrono::Utc::now().to_rfc3339(),
            "request": request.redacted(),
            "curl": request.redacted().to_curl(),
            "response": {
                "status": response.status,
                "headers": response.headers,
                "duration_ms": response.duration_ms,
                "body_bytes": body.len(),
                "body_file": body_path.file_name().map(|name| name.to_string_lossy().to_string()),
            },
            "mismatches": mismatches,
        });
        let context_path = dir.join(format!("{stem}.context.json"));
        let rendered =
            serde_json::to_string_pretty(&context).context("serializing artifact context")?;
        fs::write(&context_path, rendered)
            .with_context(|| format!("writing artifact context to {}", context_path.display()))?;

        Ok(body_path)
    }
}

/// First `limit` bytes of a body, as text when it is UTF-8 and hex otherwise.
pub fn create_preview(bytes: &[u8], limit: usize) -> String {
    let slice = if bytes.len() > limit {
        &bytes[..limit]
    } else {
        bytes
    };
    match std::str::from_utf8(slice) {
        Ok(text) => text.to_string(),
        Err(_) => hex::encode(slice),
    }
}

pub(super) fn sanitize_component(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => ch,
            _ => '-',
        })
        .collect();
    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        "artifact".to_string()
    } else {
        trimmed.to_string()
    }
}

pub(super) fn extension_for_content_type(content_type: Option<&str>) -> &'static str {
    match content_type
        .unwrap_or("")
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
    {
        "application/json" | "application/problem+json" => ".json",
        "text/event-stream" => ".sse",
        "text/html" => ".html",
        "text/plain" => ".txt",
        "application/xml" | "text/xml" => ".xml",
        _ => ".bin",
    }
}

pub(super) fn next_index(dir: &Path) -> Result<u32> {
    let mut max_index = 0;
    for entry in
        fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?
    {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            if name.len() >= 3 && name.chars().take(3).all(|c| c.is_ascii_digit()) {
                if let Ok(value) = name[0..3].parse::<u32>() {
                    max_index = max_index.max(value + 1);
                }
            }
        }
    }
    Ok(max_index)
}
