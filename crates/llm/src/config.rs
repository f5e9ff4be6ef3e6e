/// Completion API configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible API, without `/chat/completions`.
    pub api_url: String,
    /// Bearer token for the API.
    pub api_key: String,
    /// Model name sent with every request.
    pub model: String,
    /// Sampling temperature, fixed for every phase.
    pub temperature: f32,
    /// Token cap for initial-phase requests.
    pub initial_max_tokens: u32,
    /// Ask for schema-constrained JSON in the initial phase.
    pub structured_output: bool,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl CompletionConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                         | Default                     |
    /// |---------------------------------|-----------------------------|
    /// | `COMPLETION_API_URL`            | `https://api.openai.com/v1` |
    /// | `COMPLETION_API_KEY`            | required                    |
    /// | `COMPLETION_MODEL`              | `gpt-4o`                    |
    /// | `COMPLETION_TEMPERATURE`        | `0.7`                       |
    /// | `COMPLETION_INITIAL_MAX_TOKENS` | `2000`                      |
    /// | `COMPLETION_STRUCTURED_OUTPUT`  | `true`                      |
    /// | `COMPLETION_TIMEOUT_SECS`       | `60`                        |
    ///
    /// # Panics
    ///
    /// Panics if `COMPLETION_API_KEY` is missing or a numeric value does not parse.
    pub fn from_env() -> Self {
        let api_url = std::env::var("COMPLETION_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into())
            .trim_end_matches('/')
            .to_string();

        let api_key =
            std::env::var("COMPLETION_API_KEY").expect("COMPLETION_API_KEY must be set");

        let model = std::env::var("COMPLETION_MODEL").unwrap_or_else(|_| "gpt-4o".into());

        let temperature: f32 = std::env::var("COMPLETION_TEMPERATURE")
            .unwrap_or_else(|_| "0.7".into())
            .parse()
            .expect("COMPLETION_TEMPERATURE must be a valid f32");

        let initial_max_tokens: u32 = std::env::var("COMPLETION_INITIAL_MAX_TOKENS")
            .unwrap_or_else(|_| "2000".into())
            .parse()
            .expect("COMPLETION_INITIAL_MAX_TOKENS must be a valid u32");

        let structured_output: bool = std::env::var("COMPLETION_STRUCTURED_OUTPUT")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("COMPLETION_STRUCTURED_OUTPUT must be true or false");

        let timeout_secs: u64 = std::env::var("COMPLETION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("COMPLETION_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            api_key,
            model,
            temperature,
            initial_max_tokens,
            structured_output,
            timeout_secs,
        }
    }
}
