use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::info;

use super::types::{
    AgentPersona, AnswerResponse, EndSessionRequest, Prompt, SessionStart, StartSessionRequest,
};
use crate::error::ApiError;

/// Typed client for the remote interview service. No retries: a failed call
/// surfaces to the caller, which still drives the session to a terminal
/// state instead of looping.
#[derive(Clone)]
pub struct InterviewClient {
    client: Client,
    base_url: String,
}

impl InterviewClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: format!("{}/api/v1", base_url.trim_end_matches('/')),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Upload a job-description document; the parsed metadata comes back as
    /// an opaque value for persona construction.
    pub async fn upload_jd(&self, file_name: &str, bytes: Vec<u8>) -> Result<Value, ApiError> {
        self.upload("upload/jd", file_name, bytes).await
    }

    pub async fn upload_resume(&self, file_name: &str, bytes: Vec<u8>) -> Result<Value, ApiError> {
        self.upload("upload/resume", file_name, bytes).await
    }

    async fn upload(&self, path: &str, file_name: &str, bytes: Vec<u8>) -> Result<Value, ApiError> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .multipart(form)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn build_persona(&self, jd: Value, resume: Value) -> Result<AgentPersona, ApiError> {
        let response = self
            .client
            .post(format!("{}/agent/build", self.base_url))
            .json(&serde_json::json!({ "jd": jd, "resume": resume }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn start_session(
        &self,
        persona: AgentPersona,
        duration_minutes: u64,
    ) -> Result<SessionStart, ApiError> {
        let response = self
            .client
            .post(format!("{}/session/start", self.base_url))
            .json(&StartSessionRequest {
                agent_persona: persona,
                duration_minutes,
            })
            .send()
            .await?;
        let start: SessionStart = Self::check(response).await?.json().await?;
        info!("session {} started", start.session_id);
        Ok(start)
    }

    /// Submit one captured answer as a WAV artifact. Returns the next
    /// prompt, or None when the interview is over.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        wav: Vec<u8>,
    ) -> Result<Option<Prompt>, ApiError> {
        let part = Part::bytes(wav)
            .file_name("answer.wav")
            .mime_str("audio/wav")
            .map_err(ApiError::Transport)?;
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(format!("{}/session/{}/audio", self.base_url, session_id))
            .multipart(form)
            .send()
            .await?;
        let answer: AnswerResponse = Self::check(response).await?.json().await?;
        Ok(answer.next_question)
    }

    /// Report the accumulated missing-presence seconds before the report is
    /// generated.
    pub async fn end_session(
        &self,
        session_id: &str,
        face_missing_seconds: u64,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/session/{}/end", self.base_url, session_id))
            .json(&EndSessionRequest {
                face_missing_seconds,
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Fetch the final report artifact. Report generation is slow on the
    /// server side, so this call gets a longer per-request timeout.
    pub async fn final_report(&self, session_id: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(format!("{}/session/{}/final", self.base_url, session_id))
            .timeout(Duration::from_secs(180))
            .send()
            .await?;
        let bytes = Self::check(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
