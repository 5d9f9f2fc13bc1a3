//! Default model identifiers for the supported providers

/// Claude model constants
pub mod claude {
    /// Claude Sonnet 4.5
    pub const SONNET_4_5_ID: &str = "claude-sonnet-4-5-20250929";

    /// Claude Haiku 4.5, a good fit for classification
    pub const HAIKU_4_5_ID: &str = "claude-haiku-4-5-20251001";
}

/// OpenAI model constants
pub mod openai {
    /// GPT-4o
    pub const GPT_4O_ID: &str = "gpt-4o";

    /// GPT-4o Mini
    pub const GPT_4O_MINI_ID: &str = "gpt-4o-mini";
}

/// Ollama model constants
pub mod ollama {
    /// Llama 3.1 8B
    pub const LLAMA_3_1_8B_ID: &str = "llama3.1:8b";
}
