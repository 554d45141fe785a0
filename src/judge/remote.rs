//! HTTP clients for the hosted judge models.

use std::thread;
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use parking_lot::Mutex;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::evaluation::RelevanceGrade;

use super::JudgeError;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

lazy_static! {
    static ref GRADE_RE: Regex = Regex::new(r"\b([012])\b").expect("valid grade regex");
    static ref RETRY_IN_RE: Regex =
        Regex::new(r"(?i)retry in ([0-9]+(?:\.[0-9]+)?)\s*s").expect("valid retry regex");
    static ref RETRY_DELAY_RE: Regex =
        Regex::new(r#""retryDelay"\s*:\s*"([0-9]+(?:\.[0-9]+)?)s""#).expect("valid retry regex");
}

/// Prompt asking for a single 0/1/2 grade.
pub fn judge_prompt(query: &str, document: &str) -> String {
    format!(
        "You are a search relevance assessor.\n\
         Rate how relevant the document is to the query on this scale:\n\
         0 = not relevant, 1 = partially relevant, 2 = highly relevant.\n\
         Answer with a single digit and nothing else.\n\n\
         Query: {query}\n\n\
         Document: {document}\n"
    )
}

/// First standalone 0, 1 or 2 in a model reply.
pub fn parse_grade(reply: &str) -> Option<RelevanceGrade> {
    GRADE_RE
        .captures(reply)
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .and_then(|raw| RelevanceGrade::try_from(raw).ok())
}

/// Server-suggested wait from a rate-limit reply, header first, then body.
fn retry_after(header: Option<&str>, body: &str) -> Option<Duration> {
    let seconds = header
        .and_then(|h| h.trim().parse::<f64>().ok())
        .or_else(|| {
            RETRY_IN_RE
                .captures(body)
                .or_else(|| RETRY_DELAY_RE.captures(body))
                .and_then(|caps| caps[1].parse::<f64>().ok())
        })?;
    (seconds.is_finite() && seconds >= 0.0).then(|| Duration::from_secs_f64(seconds))
}

pub fn http_client(timeout: Duration) -> Result<Client, JudgeError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// OpenAI-compatible chat completions endpoint hosted by Groq.
#[derive(Debug)]
pub struct GroqClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(http: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: GROQ_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn complete(&self, prompt: &str) -> Result<String, JudgeError> {
        let started = Instant::now();
        info!(model = %self.model, prompt_chars = prompt.len(), "groq call: start");

        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0,
        });
        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            warn!(status = status.as_u16(), elapsed_ms = started.elapsed().as_millis() as u64, "groq call: failed");
            return Err(JudgeError::Api {
                backend: "groq",
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = resp.json()?;
        let content = value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "groq call: ok");
        Ok(content)
    }
}

/// Gemini `generateContent` with request spacing and rate-limit retries.
#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
    min_delay: Duration,
    max_retries: u32,
    last_call: Mutex<Option<Instant>>,
}

impl GeminiClient {
    pub fn new(
        http: Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        min_delay: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            min_delay,
            max_retries,
            last_call: Mutex::new(None),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn throttle(&self) {
        let mut last_call = self.last_call.lock();
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_delay {
                thread::sleep(self.min_delay - elapsed);
            }
        }
        *last_call = Some(Instant::now());
    }

    pub fn complete(&self, prompt: &str) -> Result<String, JudgeError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0 },
        });

        let mut attempt = 0;
        loop {
            self.throttle();
            let started = Instant::now();
            info!(model = %self.model, attempt, prompt_chars = prompt.len(), "gemini call: start");

            let resp = self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()?;
            let status = resp.status();

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                let header = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let text = resp.text().unwrap_or_default();
                let wait = retry_after(header.as_deref(), &text)
                    .unwrap_or_else(|| self.min_delay.max(Duration::from_secs(1)));
                warn!(attempt, wait_ms = wait.as_millis() as u64, "gemini call: rate limited; retrying");
                thread::sleep(wait);
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                let body = resp.text().unwrap_or_default();
                warn!(status = status.as_u16(), elapsed_ms = started.elapsed().as_millis() as u64, "gemini call: failed");
                return Err(JudgeError::Api {
                    backend: "gemini",
                    status: status.as_u16(),
                    body,
                });
            }

            let value: Value = resp.json()?;
            let text: String = value
                .pointer("/candidates/0/content/parts")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(|part| part.get("text").and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default();
            info!(elapsed_ms = started.elapsed().as_millis() as u64, "gemini call: ok");
            return Ok(text.trim().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_is_the_first_standalone_digit() {
        assert_eq!(parse_grade("2"), Some(RelevanceGrade::High));
        assert_eq!(parse_grade("Relevance: 1."), Some(RelevanceGrade::Partial));
        assert_eq!(parse_grade("score 10 then 0"), Some(RelevanceGrade::NotRelevant));
        assert_eq!(parse_grade("3"), None);
        assert_eq!(parse_grade(""), None);
    }

    #[test]
    fn retry_hint_from_header_or_body() {
        assert_eq!(retry_after(Some("7"), ""), Some(Duration::from_secs(7)));
        assert_eq!(
            retry_after(None, "Please retry in 12.5s."),
            Some(Duration::from_millis(12_500))
        );
        assert_eq!(
            retry_after(None, r#"{"retryDelay": "30s"}"#),
            Some(Duration::from_secs(30))
        );
        assert_eq!(retry_after(None, "quota exceeded"), None);
    }

    #[test]
    fn prompt_carries_query_and_document() {
        let prompt = judge_prompt("jazz", "A history of jazz.");
        assert!(prompt.contains("Query: jazz"));
        assert!(prompt.contains("Document: A history of jazz."));
    }
}
