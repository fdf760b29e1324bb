use serde::{Deserialize, Serialize};

/// One interviewer question. The service sends more fields (type, reason,
/// difficulty); the client only ever reads the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub question_text: String,
}

/// Opaque interviewer persona, produced by the persona-build endpoint and
/// passed back verbatim at session start. The client never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentPersona(pub serde_json::Value);

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest {
    pub agent_persona: AgentPersona,
    pub duration_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionStart {
    pub session_id: String,
    pub first_question: Prompt,
}

/// Answer round-trip result. `next_question: null` is the end-of-interview
/// signal.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerResponse {
    pub next_question: Option<Prompt>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndSessionRequest {
    pub face_missing_seconds: u64,
}
