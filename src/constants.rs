/// Centralized constants for kcc
pub mod constants {
    /// Directory name for workspace-local kcc metadata (hidden directory in the working directory)
    pub const KCC_DIR_NAME: &str = ".kcc";

    /// Configuration filename
    pub const CONFIG_FILENAME: &str = "config.toml";

    /// Global config directory name (in user config directory)
    pub const GLOBAL_CONFIG_DIR_NAME: &str = "kcc";

    /// Number of results returned by a search unless told otherwise
    pub const DEFAULT_TOP_K: usize = 3;

    /// Results scoring below this are dropped
    pub const DEFAULT_MIN_SCORE: f64 = 0.2;

    /// Answer-text similarity counts at half strength relative to the question
    pub const ANSWER_WEIGHT: f64 = 0.5;

    /// Weight applied to the fraction of a record's keywords found in the query
    pub const KEYWORD_WEIGHT: f64 = 0.3;

    /// Sequences at least this long get their popular characters junked
    pub const AUTOJUNK_MIN_LEN: usize = 200;

    /// OpenAI-compatible endpoint of the Groq API
    pub const DEFAULT_ADVISOR_BASE_URL: &str = "https://api.groq.com/openai/v1";

    /// Llama 3.3 70B Versatile
    pub const DEFAULT_ADVISOR_MODEL: &str = "llama-3.3-70b-versatile";

    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Environment variable holding the advisor API key
    pub const API_KEY_ENV: &str = "GROQ_API_KEY";

    /// Value shipped in setup templates; never a real key
    pub const PLACEHOLDER_API_KEY: &str = "your-groq-api-key-here";

    /// Context handed to the advisor when the local search found nothing
    pub const NO_LOCAL_CONTEXT: &str = "No local context available.";
}
