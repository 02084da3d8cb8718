use std::{collections::BTreeMap, fmt, time::Duration};

use serde::Serialize;
use serde_json::Value;
use url::Url;

pub type Headers = BTreeMap<String, String>;
pub type QueryParams = BTreeMap<String, String>;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const CREDENTIAL_HEADERS: [&str; 2] = ["x-api-key", "authorization"];
const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
        }
    }

    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Head => reqwest::Method::HEAD,
        }
    }
}

/// A fully specified request, built fresh for every scenario.
///
/// Variations are produced as copies through the `with_*`/`without_*`
/// helpers; a descriptor is never changed once handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub query_params: QueryParams,
    pub body: Option<Value>,
    pub timeout_ms: u64,
    pub fail_on_status_code: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            query_params: QueryParams::new(),
            body: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            fail_on_status_code: false,
        }
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn query(mut self, query_params: QueryParams) -> Self {
        self.query_params = query_params;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn with_header(&self, name: &str, value: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.headers.insert(name.to_string(), value.into());
        copy
    }

    pub fn with_query(&self, name: &str, value: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.query_params.insert(name.to_string(), value.into());
        copy
    }

    pub fn without_query(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.query_params.remove(name);
        copy
    }

    pub fn with_body(&self, body: Value) -> Self {
        let mut copy = self.clone();
        copy.body = Some(body);
        copy
    }

    /// Copy with credential header values masked, safe to log or persist.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for (name, value) in copy.headers.iter_mut() {
            if CREDENTIAL_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                *value = REDACTED.to_string();
            }
        }
        copy
    }

    /// URL including the encoded query string. Falls back to the raw URL when
    /// it does not parse.
    pub fn full_url(&self) -> String {
        if self.query_params.is_empty() {
            return self.url.clone();
        }
        match Url::parse_with_params(&self.url, &self.query_params) {
            Ok(url) => url.to_string(),
            Err(_) => self.url.clone(),
        }
    }

    /// Shell-quoted `curl` invocation reproducing this request.
    pub fn to_curl(&self) -> String {
        let mut args = vec![
            "curl".to_string(),
            "-X".to_string(),
            self.method.to_string(),
            self.full_url(),
        ];
        for (name, value) in &self.headers {
            args.push("-H".to_string());
            args.push(format!("{name}: {value}"));
        }
        if self.method.carries_body() {
            if let Some(body) = &self.body {
                args.push("--data".to_string());
                args.push(body.to_string());
            }
        }
        shell_words::join(args)
    }
}

/// Response payload exactly as received, decoded as JSON when it parses.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json { value: Value, raw: Vec<u8> },
    Raw(Vec<u8>),
}

impl ResponseBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(value) => ResponseBody::Json {
                value,
                raw: bytes.to_vec(),
            },
            Err(_) => ResponseBody::Raw(bytes.to_vec()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json { value, .. } => Some(value),
            ResponseBody::Raw(_) => None,
        }
    }

    /// The bytes the server sent, untouched by decoding.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResponseBody::Json { raw, .. } => raw,
            ResponseBody::Raw(bytes) => bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub headers: Headers,
    pub body: ResponseBody,
    pub duration_ms: u64,
}

impl ResponseDescriptor {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
