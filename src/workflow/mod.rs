//! Step-by-step execution of the tour.
//!
//! Each stage is a [`WorkflowStep`]. The runner executes steps in order and
//! records a [`StepReport`] for each one, so a failure is attributed to the
//! step that caused it. Values one step hands to a later one (the uploaded
//! file id, the created index name) travel in the [`StepContext`]; a step
//! whose input was never produced is reported as skipped.

pub mod fixtures;
pub mod steps;

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use mongodb::Client;
use mongodb::bson::Bson;

use crate::config::TourConfig;
use crate::connection::ConnectionManager;
use crate::error::{Error, Result};

/// Handles and values available to a running step.
pub struct StepContext<'a> {
    pub manager: &'a ConnectionManager,
    pub client: &'a Client,
    pub config: &'a TourConfig,
    uploaded_file: Option<Bson>,
    created_index: Option<String>,
}

impl<'a> StepContext<'a> {
    pub fn new(manager: &'a ConnectionManager, client: &'a Client, config: &'a TourConfig) -> Self {
        Self { manager, client, config, uploaded_file: None, created_index: None }
    }

    /// Id of the file stored by the upload step.
    pub fn uploaded_file(&self) -> Result<Bson> {
        self.uploaded_file
            .clone()
            .ok_or_else(|| Error::MissingInput("no file was uploaded".to_string()))
    }

    pub fn set_uploaded_file(&mut self, id: Option<Bson>) {
        self.uploaded_file = id;
    }

    /// Name of the index built by the create-index step.
    pub fn created_index(&self) -> Result<String> {
        self.created_index
            .clone()
            .ok_or_else(|| Error::MissingInput("no index was created".to_string()))
    }

    pub fn set_created_index(&mut self, name: Option<String>) {
        self.created_index = name;
    }
}

/// One named stage of a workflow.
pub trait WorkflowStep {
    fn name(&self) -> &str;

    /// Run the step, returning a one-line summary of what it did.
    fn run(&self, ctx: &mut StepContext<'_>) -> Result<String>;
}

/// A step backed by a plain function.
pub struct FnStep {
    name: &'static str,
    action: fn(&mut StepContext<'_>) -> Result<String>,
}

impl FnStep {
    pub const fn new(
        name: &'static str,
        action: fn(&mut StepContext<'_>) -> Result<String>,
    ) -> Self {
        Self { name, action }
    }
}

impl WorkflowStep for FnStep {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<String> {
        (self.action)(ctx)
    }
}

/// How a step ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Completed(String),
    Skipped(String),
    Failed(String),
}

impl StepOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            StepOutcome::Completed(_) => "ok",
            StepOutcome::Skipped(_) => "skipped",
            StepOutcome::Failed(_) => "failed",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            StepOutcome::Completed(msg) | StepOutcome::Skipped(msg) | StepOutcome::Failed(msg) => {
                msg
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct StepReport {
    pub name: String,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({} ms)",
            self.outcome.label(),
            self.name,
            self.outcome.message(),
            self.elapsed.as_millis()
        )
    }
}

/// Outcome of a whole run, in step order.
#[derive(Clone, Debug)]
pub struct WorkflowReport {
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
}

impl WorkflowReport {
    fn new() -> Self {
        Self { started_at: Utc::now(), steps: Vec::new() }
    }

    pub fn completed(&self) -> usize {
        self.count(|outcome| matches!(outcome, StepOutcome::Completed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, StepOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, StepOutcome::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|step| step.name == name)
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} step(s): {} ok, {} skipped, {} failed (started {})",
            self.steps.len(),
            self.completed(),
            self.skipped(),
            self.failed(),
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }

    fn count(&self, pred: impl Fn(&StepOutcome) -> bool) -> usize {
        self.steps.iter().filter(|step| pred(&step.outcome)).count()
    }
}

/// Executes steps in order against one context.
pub struct WorkflowRunner {
    steps: Vec<Box<dyn WorkflowStep>>,
    stop_on_error: bool,
}

impl WorkflowRunner {
    pub fn new(steps: Vec<Box<dyn WorkflowStep>>) -> Self {
        Self { steps, stop_on_error: false }
    }

    /// The full tour, in order.
    pub fn tour() -> Self {
        Self::new(steps::tour_steps())
    }

    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    pub fn run(&self, ctx: &mut StepContext<'_>) -> WorkflowReport {
        let mut report = WorkflowReport::new();

        for step in &self.steps {
            let name = step.name();
            log::info!("Running step: {name}");

            let start = Instant::now();
            let outcome = match step.run(ctx) {
                Ok(summary) => StepOutcome::Completed(summary),
                Err(Error::MissingInput(reason)) => {
                    log::warn!("Skipping {name}: {reason}");
                    StepOutcome::Skipped(reason)
                }
                Err(err) => {
                    log::warn!("Step {name} failed: {err}");
                    StepOutcome::Failed(err.to_string())
                }
            };

            let failed = matches!(outcome, StepOutcome::Failed(_));
            report.steps.push(StepReport {
                name: name.to_string(),
                outcome,
                elapsed: start.elapsed(),
            });

            if failed && self.stop_on_error {
                log::warn!("Stopping after failed step {name}");
                break;
            }
        }

        report
    }
}

/// Connect using `config` and run the full tour.
///
/// A failed connection is returned as an error since no step could run.
pub fn run_tour(manager: &ConnectionManager, config: &TourConfig) -> Result<WorkflowReport> {
    let start = Instant::now();
    let client = manager.connect(&config.uri, config.server_selection_timeout())?;
    let connect = StepReport {
        name: "connect".to_string(),
        outcome: StepOutcome::Completed(format!("Connected to {}", config.uri)),
        elapsed: start.elapsed(),
    };

    let mut ctx = StepContext::new(manager, &client, config);
    let mut report = WorkflowRunner::tour().stop_on_error(config.stop_on_error).run(&mut ctx);
    report.steps.insert(0, connect);
    Ok(report)
}
