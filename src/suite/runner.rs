use std::{collections::BTreeMap, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{standard_headers, ConfigResolver, Environment, EnvironmentProfile};
use crate::executor::{
    create_preview, ArtifactLabel, ArtifactWriter, Dispatcher, QueryParams, RequestDescriptor,
    ResponseDescriptor,
};
use crate::scenarios::{Endpoint, Intent, Scenario};

use super::assertions::{evaluate, Mismatch};

pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_PREVIEW_BYTES: usize = 256;

/// Narrows the catalog down to the scenarios a run should execute.
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    pub endpoints: Vec<String>,
    pub intent: Option<Intent>,
    pub pattern: Option<Regex>,
}

impl ScenarioFilter {
    pub fn matches(&self, endpoint: &Endpoint, scenario: &Scenario) -> bool {
        if !self.endpoints.is_empty() && !self.endpoints.iter().any(|name| name == endpoint.name) {
            return false;
        }
        if self.intent.is_some_and(|intent| intent != scenario.intent) {
            return false;
        }
        match &self.pattern {
            Some(pattern) => {
                pattern.is_match(&scenario.name)
                    || pattern.is_match(&format!("{} {}", endpoint.name, scenario.name))
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Extra attempts granted to a failing scenario.
    pub retries: u32,
    pub filter: ScenarioFilter,
    pub artifacts_dir: Option<PathBuf>,
    pub preview_bytes: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            filter: ScenarioFilter::default(),
            artifacts_dir: None,
            preview_bytes: DEFAULT_PREVIEW_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed(Vec<Mismatch>),
    /// The request never produced a response.
    Errored(String),
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub environment: Environment,
    pub endpoint: &'static str,
    pub scenario: String,
    pub intent: Intent,
    pub verdict: Verdict,
    pub attempts: u32,
    pub status: Option<u16>,
    pub duration_ms: Option<u64>,
    pub artifact: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Tally {
    fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Passed => self.passed += 1,
            Verdict::Failed(_) => self.failed += 1,
            Verdict::Errored(_) => self.errored += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }
}

#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn totals(&self) -> Tally {
        let mut tally = Tally::default();
        for result in &self.results {
            tally.record(&result.verdict);
        }
        tally
    }

    pub fn by_environment(&self) -> BTreeMap<Environment, Tally> {
        let mut tallies = BTreeMap::new();
        for result in &self.results {
            tallies
                .entry(result.environment)
                .or_insert_with(Tally::default)
                .record(&result.verdict);
        }
        tallies
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(|result| result.verdict.is_passed())
    }
}

/// A scenario selected for execution, before any environment is applied.
#[derive(Debug, Clone, Copy)]
pub struct PlannedScenario<'a> {
    pub endpoint: &'a Endpoint,
    pub scenario: &'a Scenario,
}

/// Drives every selected scenario against every selected environment.
///
/// Each scenario starts from a freshly built request, so no state leaks from
/// one scenario (or attempt) into the next.
pub struct SuiteRunner<'a> {
    resolver: ConfigResolver<'a>,
    dispatcher: &'a Dispatcher,
    catalog: &'a [Endpoint],
    options: RunOptions,
    artifacts: Option<ArtifactWriter>,
    run_id: Uuid,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(
        resolver: ConfigResolver<'a>,
        dispatcher: &'a Dispatcher,
        catalog: &'a [Endpoint],
        options: RunOptions,
    ) -> Self {
        let artifacts = options.artifacts_dir.clone().map(ArtifactWriter::new);
        Self {
            resolver,
            dispatcher,
            catalog,
            options,
            artifacts,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn environments(&self) -> Vec<Environment> {
        self.resolver.environments()
    }

    pub fn planned(&self) -> Vec<PlannedScenario<'a>> {
        self.catalog
            .iter()
            .flat_map(|endpoint| {
                endpoint
                    .scenarios
                    .iter()
                    .map(move |scenario| PlannedScenario { endpoint, scenario })
            })
            .filter(|planned| self.options.filter.matches(planned.endpoint, planned.scenario))
            .collect()
    }

    pub async fn run(&self) -> SuiteReport {
        self.run_with(|_| {}).await
    }

    /// Runs the plan, handing each result to `on_result` as soon as it is known.
    pub async fn run_with<F>(&self, mut on_result: F) -> SuiteReport
    where
        F: FnMut(&ScenarioResult),
    {
        let started_at = Utc::now();
        let planned = self.planned();
        let mut results = Vec::new();

        for environment in self.environments() {
            let profile = self.resolver.resolve(environment);
            tracing::info!(profile = %profile.redacted(), "running scenarios");
            if profile.base_url.is_none() {
                tracing::warn!(%environment, "no base url configured");
            }
            if profile.api_key.is_none() {
                tracing::warn!(%environment, "no api key configured");
            }

            for PlannedScenario { endpoint, scenario } in &planned {
                let result = self.run_scenario(&profile, endpoint, scenario).await;
                on_result(&result);
                results.push(result);
            }
        }

        SuiteReport {
            run_id: self.run_id,
            started_at,
            results,
        }
    }

    pub async fn run_scenario(
        &self,
        profile: &EnvironmentProfile,
        endpoint: &Endpoint,
        scenario: &Scenario,
    ) -> ScenarioResult {
        let mut result = ScenarioResult {
            environment: profile.name,
            endpoint: endpoint.name,
            scenario: scenario.name.clone(),
            intent: scenario.intent,
            verdict: Verdict::Passed,
            attempts: 0,
            status: None,
            duration_ms: None,
            artifact: None,
        };

        let defaults = self.resolver.default_query_params();
        let request = match build_request(profile, &defaults, endpoint, scenario) {
            Ok(request) => request,
            Err(err) => {
                result.verdict = Verdict::Errored(format!("{err:#}"));
                return result;
            }
        };

        let mut last_response = None;
        while result.attempts <= self.options.retries {
            result.attempts += 1;
            match self.dispatcher.dispatch(&request).await {
                Ok(response) => {
                    result.status = Some(response.status);
                    result.duration_ms = Some(response.duration_ms);
                    let mismatches = evaluate(&scenario.expectation, &response);
                    last_response = Some(response);
                    if mismatches.is_empty() {
                        result.verdict = Verdict::Passed;
                        break;
                    }
                    result.verdict = Verdict::Failed(mismatches);
                }
                Err(err) => {
                    result.status = None;
                    result.duration_ms = None;
                    last_response = None;
                    result.verdict = Verdict::Errored(err.detailed());
                }
            }
            if result.attempts <= self.options.retries {
                tracing::debug!(
                    endpoint = endpoint.name,
                    scenario = %scenario.name,
                    attempt = result.attempts,
                    "retrying scenario"
                );
            }
        }

        match &result.verdict {
            Verdict::Passed => tracing::info!(
                environment = %profile.name,
                endpoint = endpoint.name,
                scenario = %scenario.name,
                attempts = result.attempts,
                "scenario passed"
            ),
            Verdict::Failed(_) | Verdict::Errored(_) => {
                self.report_failure(&mut result, &request, last_response.as_ref())
            }
        }

        result
    }

    fn report_failure(
        &self,
        result: &mut ScenarioResult,
        request: &RequestDescriptor,
        response: Option<&ResponseDescriptor>,
    ) {
        let reasons: Vec<String> = match &result.verdict {
            Verdict::Failed(mismatches) => mismatches.iter().map(ToString::to_string).collect(),
            Verdict::Errored(message) => vec![message.clone()],
            Verdict::Passed => return,
        };
        let preview = response
            .map(|response| create_preview(response.body.as_bytes(), self.options.preview_bytes))
            .unwrap_or_default();

        tracing::warn!(
            environment = %result.environment,
            endpoint = result.endpoint,
            scenario = %result.scenario,
            attempts = result.attempts,
            reasons = %reasons.join("; "),
            curl = %request.redacted().to_curl(),
            preview = %preview,
            "scenario failed"
        );

        let (Some(writer), Some(response)) = (&self.artifacts, response) else {
            return;
        };
        let run_id = self.run_id.to_string();
        let label = ArtifactLabel {
            run_id: &run_id,
            environment: result.environment.as_str(),
            endpoint: result.endpoint,
            scenario: &result.scenario,
        };
        match writer.write_failure(label, request, response, &reasons) {
            Ok(path) => result.artifact = Some(path),
            Err(err) => tracing::warn!(
                root = %writer.root().display(),
                "failed to write artifact: {err:#}"
            ),
        }
    }
}

/// The valid request for `endpoint` in `profile`'s environment, with the
/// scenario's mutations applied in order.
pub fn build_request(
    profile: &EnvironmentProfile,
    defaults: &QueryParams,
    endpoint: &Endpoint,
    scenario: &Scenario,
) -> Result<RequestDescriptor> {
    let mut query = defaults.clone();
    for (name, value) in &endpoint.query {
        query.insert(name.to_string(), value.clone());
    }

    let mut request = RequestDescriptor::new(endpoint.method, profile.endpoint_url(&endpoint.path))
        .headers(standard_headers(profile))
        .query(query);
    if let Some(payload) = &endpoint.payload {
        request = request.json(payload.clone());
    }

    scenario
        .mutations
        .iter()
        .try_fold(request, |request, mutation| mutation.apply(&request))
        .with_context(|| format!("building request for {} / {}", endpoint.name, scenario.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::env::EnvMap;
    use crate::scenarios::{catalog, find_endpoint, Mutation};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn settings() -> Settings {
        let vars: EnvMap = [
            ("STAGING_BASE_URL", "https://staging.example.com"),
            ("STAGING_X_API_KEY", "stage-key"),
            ("STAGING_TOKEN", "Bearer stage"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Settings::from_map(&vars)
    }

    fn scenario<'a>(endpoint: &'a Endpoint, name: &str) -> &'a Scenario {
        endpoint
            .scenarios
            .iter()
            .find(|scenario| scenario.name == name)
            .unwrap()
    }

    #[test]
    fn build_request_applies_defaults_headers_and_payload() -> Result<()> {
        let settings = settings();
        let resolver = ConfigResolver::new(&settings);
        let profile = resolver.resolve(Environment::Staging);
        let endpoint = find_endpoint("blog-ideas").unwrap();

        let request = build_request(
            &profile,
            &resolver.default_query_params(),
            endpoint,
            scenario(endpoint, "accepts a valid request"),
        )?;

        assert_eq!(
            request.url,
            "https://staging.example.com/v2/business/content/blog-ideas"
        );
        assert_eq!(request.query_params["engine"], "premium");
        assert_eq!(request.query_params["language"], "en");
        assert_eq!(request.query_params["num_copies"], "1");
        assert_eq!(request.headers["X-API-KEY"], "stage-key");
        assert_eq!(request.headers["Authorization"], "Bearer stage");
        assert_eq!(
            request.body,
            Some(json!({
                "topic": "Artificial Intelligence in Copywriting",
                "primary_keyword": "test"
            }))
        );
        Ok(())
    }

    #[test]
    fn build_request_applies_mutations() -> Result<()> {
        let settings = settings();
        let resolver = ConfigResolver::new(&settings);
        let profile = resolver.resolve(Environment::Staging);
        let endpoint = find_endpoint("blog-ideas").unwrap();
        let defaults = resolver.default_query_params();

        let empty = build_request(&profile, &defaults, endpoint, scenario(endpoint, "rejects empty topic"))?;
        assert_eq!(empty.body.as_ref().unwrap()["topic"], "");

        let bad_key = build_request(
            &profile,
            &defaults,
            endpoint,
            scenario(endpoint, "rejects an invalid api key"),
        )?;
        assert_eq!(bad_key.headers["X-API-KEY"], "invalid-key");
        assert_eq!(bad_key.headers["Authorization"], "Bearer stage");
        Ok(())
    }

    #[test]
    fn sse_request_keeps_defaults_next_to_data() -> Result<()> {
        let settings = settings();
        let resolver = ConfigResolver::new(&settings);
        let profile = resolver.resolve(Environment::Staging);
        let endpoint = find_endpoint("ai-article-writer-v3-sse").unwrap();
        let valid = &endpoint.scenarios[0];

        let request = build_request(&profile, &resolver.default_query_params(), endpoint, valid)?;
        assert_eq!(request.body, None);
        assert!(request.query_params.contains_key("data"));
        assert_eq!(request.query_params["num_copies"], "1");
        Ok(())
    }

    #[test]
    fn article_rewriter_keeps_pinned_engine_over_configured_defaults() -> Result<()> {
        let vars: EnvMap = [("ENGINE", "economy"), ("NUM_COPIES", "3"), ("LANGUAGE", "de")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let settings = Settings::from_map(&vars);
        let resolver = ConfigResolver::new(&settings);
        let profile = resolver.resolve(Environment::Staging);
        let endpoint = find_endpoint("article-rewriter").unwrap();

        let request = build_request(
            &profile,
            &resolver.default_query_params(),
            endpoint,
            scenario(endpoint, "accepts a valid request"),
        )?;
        assert_eq!(request.query_params["engine"], "premium");
        assert_eq!(request.query_params["num_copies"], "1");
        assert_eq!(request.query_params["language"], "de");

        let bad_engine = build_request(
            &profile,
            &resolver.default_query_params(),
            endpoint,
            scenario(endpoint, "rejects an invalid engine parameter"),
        )?;
        assert_eq!(bad_engine.query_params["engine"], "invalid");
        Ok(())
    }

    #[test]
    fn every_request_carries_default_query_unless_mutated() -> Result<()> {
        let settings = settings();
        let resolver = ConfigResolver::new(&settings);
        let profile = resolver.resolve(Environment::Staging);
        let defaults = resolver.default_query_params();

        for endpoint in catalog() {
            for scenario in &endpoint.scenarios {
                let request = build_request(&profile, &defaults, endpoint, scenario)?;
                for key in ["engine", "language", "num_copies"] {
                    let removed = scenario
                        .mutations
                        .contains(&Mutation::RemoveQuery(key));
                    let overridden = scenario
                        .mutations
                        .iter()
                        .any(|mutation| matches!(mutation, Mutation::SetQuery(name, _) if *name == key));
                    let value = request.query_params.get(key);
                    if removed {
                        assert!(value.is_none(), "{} / {}: {key}", endpoint.name, scenario.name);
                        continue;
                    }
                    let value = value.unwrap_or_else(|| {
                        panic!("{} / {} lacks {key}", endpoint.name, scenario.name)
                    });
                    if !overridden {
                        assert!(!value.is_empty(), "{} / {}: empty {key}", endpoint.name, scenario.name);
                    }
                }
            }
        }
        Ok(())
    }

    #[test]
    fn filter_by_endpoint_intent_and_pattern() {
        let endpoint = find_endpoint("blog-ideas").unwrap();
        let valid = scenario(endpoint, "accepts a valid request");
        let empty = scenario(endpoint, "rejects empty topic");

        let by_endpoint = ScenarioFilter {
            endpoints: vec!["blog-intros".to_string()],
            ..ScenarioFilter::default()
        };
        assert!(!by_endpoint.matches(endpoint, valid));

        let by_intent = ScenarioFilter {
            intent: Some(Intent::Negative),
            ..ScenarioFilter::default()
        };
        assert!(!by_intent.matches(endpoint, valid));
        assert!(by_intent.matches(endpoint, empty));

        let by_pattern = ScenarioFilter {
            pattern: Some(Regex::new("^blog-ideas rejects").unwrap()),
            ..ScenarioFilter::default()
        };
        assert!(by_pattern.matches(endpoint, empty));
        assert!(!by_pattern.matches(endpoint, valid));
    }

    #[test]
    fn planned_respects_filter() {
        let settings = settings();
        let dispatcher = Dispatcher::new().unwrap();
        let options = RunOptions {
            filter: ScenarioFilter {
                endpoints: vec!["define-this".to_string()],
                ..ScenarioFilter::default()
            },
            ..RunOptions::default()
        };
        let runner = SuiteRunner::new(
            ConfigResolver::new(&settings),
            &dispatcher,
            catalog(),
            options,
        );
        let planned = runner.planned();
        assert!(!planned.is_empty());
        assert!(planned
            .iter()
            .all(|planned| planned.endpoint.name == "define-this"));
    }

    #[test]
    fn report_tallies_per_environment() {
        let result = |environment, verdict| ScenarioResult {
            environment,
            endpoint: "blog-ideas",
            scenario: "accepts a valid request".to_string(),
            intent: Intent::Positive,
            verdict,
            attempts: 1,
            status: Some(200),
            duration_ms: Some(10),
            artifact: None,
        };
        let report = SuiteReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            results: vec![
                result(Environment::Staging, Verdict::Passed),
                result(Environment::Staging, Verdict::Errored("boom".to_string())),
                result(
                    Environment::Production,
                    Verdict::Failed(vec![Mismatch::Status {
                        expected: vec![200],
                        actual: 500,
                    }]),
                ),
            ],
        };

        let tallies = report.by_environment();
        assert_eq!(
            tallies[&Environment::Staging],
            Tally {
                passed: 1,
                failed: 0,
                errored: 1
            }
        );
        assert_eq!(tallies[&Environment::Production].failed, 1);
        assert_eq!(report.totals().total(), 3);
        assert!(!report.is_success());
    }
}
