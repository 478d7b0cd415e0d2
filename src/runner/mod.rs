mod artifacts;

use crate::config::{BrowserConfig, Fixture, Params, ProjectConfig, SuiteConfig};
use crate::locale::Locale;
use crate::pages::PageContext;
use crate::scenario::{CheckPayment, CheckoutOutcome, ScenarioSettings};
use crate::session::{EokaSession, FRAME_ACCESS_ARGS};
use crate::step::{StepRecorder, StepReport};
use crate::Result;
use eoka::Browser;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of running one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectResult {
    pub name: String,
    pub locale: Locale,
    pub success: bool,
    /// Error of the last attempt, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of retry attempts made.
    pub retries: u32,
    pub duration_ms: u64,
    /// Screenshot saved at the end of the scenario, or on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CheckoutOutcome>,
    /// Step tree of the last attempt.
    pub steps: Vec<StepReport>,
}

/// Result of running a suite.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    pub name: String,
    pub duration_ms: u64,
    /// In config order.
    pub projects: Vec<ProjectResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.projects.iter().all(|p| p.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProjectResult> {
        self.projects.iter().filter(|p| !p.success)
    }
}

struct Attempt {
    result: Result<CheckoutOutcome>,
    steps: Vec<StepReport>,
    screenshot: Option<PathBuf>,
}

/// Runs the check-payment scenario for each selected project.
pub struct Runner {
    config: SuiteConfig,
    base_path: PathBuf,
    params: Params,
    projects: Vec<String>,
    ci: bool,
}

impl Runner {
    /// `base_path` resolves fixture paths, usually the config file's directory.
    pub fn new(config: SuiteConfig, base_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            base_path: base_path.into(),
            params: Params::new(),
            projects: Vec::new(),
            ci: false,
        }
    }

    /// Parameters substituted into fixture files.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Only run these projects (all when empty).
    pub fn with_projects(mut self, names: Vec<String>) -> Self {
        self.projects = names;
        self
    }

    /// CI mode changes retry and worker defaults.
    pub fn with_ci(mut self, ci: bool) -> Self {
        self.ci = ci;
        self
    }

    /// Directory containing `config_path`, for resolving fixtures.
    pub fn base_path_of(config_path: &Path) -> &Path {
        match config_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// Whether the `CI` environment variable asks for CI mode.
    pub fn ci_from_env() -> bool {
        ci_flag(std::env::var("CI").ok().as_deref())
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run every selected project and write the report if configured.
    pub async fn run(&self) -> Result<SuiteResult> {
        let start = Instant::now();
        let selected = self.config.select_projects(&self.projects)?;
        let workers = self.config.run.effective_workers(self.ci, selected.len());
        info!(
            "Running {} project(s) with {} worker(s)",
            selected.len(),
            workers
        );

        let mut projects: Vec<(usize, ProjectResult)> = stream::iter(selected.into_iter().enumerate())
            .map(|(i, project)| async move { (i, self.run_project(project).await) })
            .buffer_unordered(workers)
            .collect()
            .await;
        projects.sort_by_key(|(i, _)| *i);

        let result = SuiteResult {
            name: self.config.name.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
            projects: projects.into_iter().map(|(_, p)| p).collect(),
        };

        if let Some(ref path) = self.config.run.report {
            artifacts::write_report(path, &result)?;
            info!("Report written to: {}", path.display());
        }
        Ok(result)
    }

    async fn run_project(&self, project: &ProjectConfig) -> ProjectResult {
        let start = Instant::now();
        let mut result = ProjectResult {
            name: project.name.clone(),
            locale: project.locale,
            success: false,
            error: None,
            retries: 0,
            duration_ms: 0,
            screenshot: None,
            outcome: None,
            steps: Vec::new(),
        };

        let fixture_path = self.base_path.join(&project.fixture);
        let fixture = match Fixture::load_with_params(&fixture_path, &self.params) {
            Ok(f) => f,
            Err(e) => {
                warn!("[{}] cannot load {}: {}", project.name, fixture_path.display(), e);
                result.error = Some(format!("fixture {}: {}", fixture_path.display(), e));
                result.duration_ms = start.elapsed().as_millis() as u64;
                return result;
            }
        };

        let max_attempts = self.config.run.effective_retries(self.ci) + 1;
        for attempt in 1..=max_attempts {
            if attempt > 1 {
                result.retries += 1;
                info!("[{}] Retry attempt {}/{}", project.name, attempt, max_attempts);
            }

            let last = attempt == max_attempts;
            let run = match self.attempt(project, &fixture, last).await {
                Ok(run) => run,
                Err(e) => Attempt {
                    result: Err(e),
                    steps: Vec::new(),
                    screenshot: None,
                },
            };
            result.steps = run.steps;
            result.screenshot = run.screenshot;
            match run.result {
                Ok(outcome) => {
                    result.success = true;
                    result.error = None;
                    result.outcome = Some(outcome);
                    break;
                }
                Err(e) => {
                    warn!("[{}] Attempt {} failed: {}", project.name, attempt, e);
                    result.error = Some(e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    /// One scenario run in a fresh browser. Browser launch errors are
    /// returned as `Err`; scenario errors are in [`Attempt::result`].
    async fn attempt(&self, project: &ProjectConfig, fixture: &Fixture, last: bool) -> Result<Attempt> {
        let browser_config = project.browser_config(&self.config.browser);
        let browser = launch(&browser_config, project.locale).await?;
        let page = browser.new_page("about:blank").await?;
        let run = &self.config.run;
        let session = EokaSession::new(page, run.timeout());
        let steps = StepRecorder::new();

        let ctx = PageContext::new(&session, &steps)
            .with_timeout(run.timeout())
            .with_soft_assertions(run.soft_assertions);
        let scenario = CheckPayment::new(&project.base_url, project.locale, fixture)
            .with_settings(ScenarioSettings::from(run));

        let mut result = scenario.run(ctx).await;
        if result.is_ok() {
            if let Err(e) = steps.finish() {
                result = Err(e);
            }
        }

        let screenshot = match result {
            Ok(_) => {
                let path = run
                    .screenshot_dir
                    .join(artifacts::screenshot_name(&project.name));
                artifacts::save_screenshot(&session, &path).await
            }
            Err(_) if last => match self.config.on_failure {
                Some(ref on_failure) => match on_failure.screenshot {
                    Some(ref template) => {
                        let path = artifacts::failure_screenshot_path(template, &project.name);
                        artifacts::save_screenshot(&session, &path).await
                    }
                    None => None,
                },
                None => None,
            },
            Err(_) => None,
        };

        drop(session);
        if let Err(e) = browser.close().await {
            debug!("[{}] browser close failed: {}", project.name, e);
        }

        Ok(Attempt {
            result,
            steps: steps.into_report(),
            screenshot,
        })
    }
}

/// Set, non-empty and not `false`/`0`.
fn ci_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(v) => !v.eq_ignore_ascii_case("false"),
    }
}

/// Launch settings for one project: the browser config plus the project's
/// language and access to cross-origin payment frames.
fn stealth_config(config: &BrowserConfig, locale: Locale) -> eoka::StealthConfig {
    let mut extra_args: Vec<String> = FRAME_ACCESS_ARGS.iter().map(|a| a.to_string()).collect();
    extra_args.push(format!("--lang={}", locale.language_tag()));

    eoka::StealthConfig {
        headless: config.headless,
        proxy: config.proxy.clone(),
        user_agent: config.user_agent.clone(),
        viewport_width: config.viewport.as_ref().map(|v| v.width).unwrap_or(1280),
        viewport_height: config.viewport.as_ref().map(|v| v.height).unwrap_or(720),
        extra_args,
        ..Default::default()
    }
}

async fn launch(config: &BrowserConfig, locale: Locale) -> Result<Browser> {
    debug!(
        "Launching browser (headless: {}, proxy: {:?}, lang: {})",
        config.headless,
        config.proxy,
        locale.language_tag()
    );
    Ok(Browser::launch_with_config(stealth_config(config, locale)).await?)
}
