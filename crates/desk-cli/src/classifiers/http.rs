//! HTTP classifier provider.
//!
//! POSTs `{"text": "..."}` and expects `{"probabilities": [..]}` back, one
//! entry per configured category in configured order.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use triage::{ClassifierAdapter, ClassifierError, ClassifierResult, ProbabilityVector};

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    probabilities: Vec<f64>,
}

pub struct HttpClassifier {
    name: String,
    url: String,
    timeout: Duration,
    http: reqwest::blocking::Client,
}

impl HttpClassifier {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        timeout: Duration,
    ) -> ClassifierResult<Self> {
        let name = name.into();
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Unavailable {
                provider: name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            name,
            url: url.into(),
            timeout,
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, err: reqwest::Error) -> ClassifierError {
        if err.is_timeout() {
            ClassifierError::Timeout {
                provider: self.name.clone(),
                after_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ClassifierError::Unavailable {
                provider: self.name.clone(),
                reason: err.to_string(),
            }
        }
    }
}

impl ClassifierAdapter for HttpClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, text: &str) -> ClassifierResult<ProbabilityVector> {
        let response = self
            .http
            .post(&self.url)
            .json(&ClassifyRequest { text })
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Unavailable {
                provider: self.name.clone(),
                reason: format!("HTTP {status}"),
            });
        }

        let body: ClassifyResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                ClassifierError::Malformed {
                    provider: self.name.clone(),
                    reason: e.to_string(),
                }
            }
        })?;
        debug!(provider = %self.name, len = body.probabilities.len(), "Classifier responded");
        Ok(ProbabilityVector::new(body.probabilities))
    }
}
