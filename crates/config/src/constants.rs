//! Centralized constants for the tutor
//!
//! Single source of truth for default values and fixed strings that more
//! than one crate needs.

/// Default service endpoints
pub mod endpoints {
    /// OpenAI chat completions base URL
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// Local Ollama server
    pub const OLLAMA_DEFAULT: &str = "http://localhost:11434";

    /// Spacing side-car (only used with the `http` spacing provider)
    pub const SPACING_SIDECAR_DEFAULT: &str = "http://localhost:8090/spacing";
}

/// Generation defaults
pub mod generation {
    /// Model used by the original deployment
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

    /// Correction must be near-deterministic
    pub const CORRECTION_TEMPERATURE: f32 = 0.1;

    /// Replies are conversational
    pub const REPLY_TEMPERATURE: f32 = 0.7;

    /// Upper bound on generated tokens per call
    pub const MAX_TOKENS: u32 = 512;

    /// Request timeout in seconds
    pub const TIMEOUT_SECS: u64 = 30;
}

/// Conversation defaults
pub mod conversation {
    /// Prior turns shown to the rewriter
    pub const HISTORY_WINDOW: usize = 6;

    /// Proficiency tag used when the request has none
    pub const DEFAULT_LEVEL: &str = "intermediate";

    /// Tutor persona name
    pub const PERSONA_NAME: &str = "무궁화";
}

/// Fixed strings the pipeline emits
pub mod sentinels {
    /// Transcript placeholder when there is no history
    pub const EMPTY_HISTORY: &str = "(대화 시작)";

    /// Retrieval result when no key matches
    pub const NO_KNOWLEDGE: &str = "관련 지식 없음";

    /// Prefix of the reply text when reply generation fails
    pub const REPLY_ERROR_PREFIX: &str = "오류 발생";
}

/// Environment variables read outside the `TUTOR__` namespace
pub mod env {
    /// Settings file selector (config/{TUTOR_ENV}.yaml)
    pub const ENVIRONMENT: &str = "TUTOR_ENV";

    /// Fallback API key, same variable the OpenAI SDKs read
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
}
