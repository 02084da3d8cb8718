mod assertions;
mod diagnostics;
#[cfg(feature = "cli")]
mod printer;
mod runner;

pub use assertions::{check_shape, evaluate, Mismatch};
pub use diagnostics::{
    describe_settings, probe_environments, KeyStatus, ProbeOutcome, ProbeResult, PROBE_TIMEOUT_MS,
};
#[cfg(feature = "cli")]
pub use printer::{print_diagnostics, print_plan, print_summary, render_result};
pub use runner::{
    build_request, PlannedScenario, RunOptions, ScenarioFilter, ScenarioResult, SuiteReport,
    SuiteRunner, Tally, Verdict, DEFAULT_PREVIEW_BYTES, DEFAULT_RETRIES,
};
