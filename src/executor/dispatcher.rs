use std::time::Instant;

use anyhow::{Context, Result};
use reqwest::{header::HeaderMap, Client};
use url::Url;

use super::{
    error::TransportError,
    models::{Headers, RequestDescriptor, ResponseBody, ResponseDescriptor},
};

/// Single chokepoint for outbound calls. Holds no per-request state: no
/// retries, no cookie store, nothing carried between calls.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("apiprobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }

    /// Sends the request and returns whatever the server answered.
    ///
    /// Non-2xx statuses are returned as ordinary responses; only network
    /// failures and the descriptor's timeout produce an error.
    pub async fn dispatch(
        &self,
        request: &RequestDescriptor,
    ) -> Result<ResponseDescriptor, TransportError> {
        if request.fail_on_status_code {
            tracing::warn!(url = %request.url, "fail_on_status_code is ignored by the dispatcher");
        }

        let url = Url::parse(&request.url).map_err(|source| TransportError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;

        let mut request_builder = self
            .client
            .request(request.method.into(), url)
            .timeout(request.timeout());

        if !request.query_params.is_empty() {
            request_builder = request_builder.query(&request.query_params);
        }

        for (name, value) in &request.headers {
            request_builder = request_builder.header(name, value);
        }

        if request.method.carries_body() {
            if let Some(body) = &request.body {
                request_builder = request_builder.json(body);
            }
        }

        let transport_error =
            |err: reqwest::Error| TransportError::from_reqwest(&request.url, request.timeout_ms, err);

        let start = Instant::now();
        let response = request_builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let bytes = response.bytes().await.map_err(transport_error)?;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status,
            duration_ms,
            body_bytes = bytes.len(),
            "request dispatched"
        );

        Ok(ResponseDescriptor {
            status,
            headers,
            body: ResponseBody::from_bytes(&bytes),
            duration_ms,
        })
    }
}

fn collect_headers(headers: &HeaderMap) -> Headers {
    let mut collected = Headers::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or_default();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}
