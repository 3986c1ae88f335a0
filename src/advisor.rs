use crate::config::AdvisorConfig;
use crate::constants::constants;
use crate::protocol::SearchResult;
use anyhow::{anyhow, Context as AnyhowContext, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// The advisor's answer to one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub content: String,
    pub model: String,
    pub usage: Option<Usage>,
}

/// Client for an OpenAI-compatible chat completions API (Groq by default).
pub struct Advisor {
    config: AdvisorConfig,
    api_key: String,
    client: reqwest::Client,
}

impl Advisor {
    pub fn new(config: AdvisorConfig) -> Result<Self> {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: AdvisorConfig, client: reqwest::Client) -> Result<Self> {
        config.validate()?;
        let api_key = config.api_key.clone().unwrap_or_default();
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Ask for expert advice on `query`, grounded on the local search results.
    ///
    /// `results` may be empty; the prompt then carries a placeholder context.
    pub async fn ask(&self, query: &str, results: &[SearchResult]) -> Result<Advice> {
        let prompt = build_prompt(&build_context(results), query);
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending chat completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach advisor at {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Advisor returned {}: {}", status, text));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .context("Failed to parse advisor response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("Advisor response contained no choices"))?;

        if let Some(usage) = &completion.usage {
            info!(
                "Advisor usage: {} prompt + {} completion = {} tokens",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(Advice {
            content,
            model: self.config.model.clone(),
            usage: completion.usage,
        })
    }
}

/// Join the results into Q/A context, or a placeholder when there are none.
pub fn build_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return constants::NO_LOCAL_CONTEXT.to_string();
    }
    results
        .iter()
        .map(|r| format!("Q: {}\nA: {}\n\n", r.question, r.answer))
        .collect()
}

pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "You are an expert agricultural advisor helping farmers. Based on the following context from our knowledge base and the user's question, provide a comprehensive, practical answer.

Context from Knowledge Base:
{context}

User Question: {query}

Please provide:
1. A clear, actionable answer
2. Practical recommendations
3. Any important warnings or considerations

Keep your response concise but informative, suitable for farmers."
    )
}
