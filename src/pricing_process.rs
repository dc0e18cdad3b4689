//! Out-of-process price strategy.
//!
//! The reference deployment scores prices in a separate process: the feature
//! set goes in as one JSON argument, and the last stdout line comes back as
//! `{"price": number}`. The wait is bounded; a slow or wedged scorer turns
//! into an [`EstimateError::TimedOut`] and the caller's heuristic takes over.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::pricing::{EstimateError, TripFeatures};
use crate::traits::PriceStrategy;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Interpreter or executable to invoke.
    pub command: String,
    /// Leading arguments (script path etc.). The JSON feature payload is
    /// appended as the final argument.
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            command: "python3".to_string(),
            args: vec!["pricing.py".to_string()],
            timeout_secs: 3,
        }
    }
}

/// Spawns the configured scoring process once per estimation.
///
/// Each call is independent: no state is shared between concurrent
/// estimations, and a failed call is never retried here.
#[derive(Debug, Clone)]
pub struct ProcessStrategy {
    config: ProcessConfig,
}

impl ProcessStrategy {
    pub fn new(config: ProcessConfig) -> Self {
        Self { config }
    }
}

impl PriceStrategy for ProcessStrategy {
    fn estimate(&self, features: &TripFeatures) -> Result<f64, EstimateError> {
        let payload = serde_json::to_string(features)?;

        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .arg(payload)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let status = match wait_with_deadline(&mut child, timeout)? {
            Some(status) => status,
            None => {
                child.kill().ok();
                child.wait().ok();
                return Err(EstimateError::TimedOut);
            }
        };

        // Output is read only after exit; a scorer that floods the pipe
        // blocks itself and lands in the timeout path above instead.
        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout)?;
        }

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                pipe.read_to_string(&mut stderr).ok();
            }
            let detail = if stderr.trim().is_empty() {
                format!("scoring process exited with {}", status)
            } else {
                stderr.trim().to_string()
            };
            return Err(EstimateError::Process(detail));
        }

        parse_price(&stdout)
    }
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<ExitStatus>, EstimateError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// The scorer may emit warnings before the result; only the last non-empty
/// stdout line is the response.
fn parse_price(stdout: &str) -> Result<f64, EstimateError> {
    let line = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| EstimateError::Process("no output from scoring process".to_string()))?;

    let response: PriceResponse = serde_json::from_str(line.trim())?;
    if response.price.is_finite() {
        Ok(response.price)
    } else {
        Err(EstimateError::Process(
            "scoring process returned a non-finite price".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: f64,
}
