use crate::error::{TranslateError, TranslateResult};
use crate::remote::{
    AuthScheme, RemoteOptions, RemoteTranslator, DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
use crate::{FallbackTranslator, RuleBasedTranslator, Translator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Environment variables consulted for the credential, first non-empty wins
pub const API_KEY_ENV_VARS: [&str; 2] = ["PAGESMITH_API_KEY", "ANTHROPIC_API_KEY"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Keyword rules only
    Rules,
    /// Language model only; a missing key is a configuration error
    Remote,
    /// Language model with the rules as fallback when a key is present,
    /// rules otherwise
    #[default]
    Auto,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Rules => "rules",
            Strategy::Remote => "remote",
            Strategy::Auto => "auto",
        };
        f.write_str(name)
    }
}

impl FromStr for Strategy {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" | "local" => Ok(Strategy::Rules),
            "remote" | "llm" => Ok(Strategy::Remote),
            "auto" => Ok(Strategy::Auto),
            other => Err(TranslateError::config(format!(
                "unknown strategy '{other}' (expected rules, remote or auto)"
            ))),
        }
    }
}

/// `translator` section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslatorConfig {
    pub strategy: Strategy,
    pub model: String,
    pub endpoint: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub auth: AuthScheme,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth: AuthScheme::default(),
        }
    }
}

impl TranslatorConfig {
    pub fn remote_options(&self) -> RemoteOptions {
        RemoteOptions {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            auth: self.auth,
        }
    }
}

/// First non-empty credential from [`API_KEY_ENV_VARS`]
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Resolve the configured strategy into a translator
///
/// A key that is present but malformed is an error for `remote` and `auto`
/// alike; `auto` only degrades to rules when no key was given at all.
pub fn build_translator(
    config: &TranslatorConfig,
    api_key: Option<String>,
) -> TranslateResult<Arc<dyn Translator>> {
    let api_key = api_key.filter(|key| !key.trim().is_empty());

    let translator: Arc<dyn Translator> = match (config.strategy, api_key) {
        (Strategy::Rules, _) => Arc::new(RuleBasedTranslator::new()),
        (Strategy::Remote, None) => {
            return Err(TranslateError::config(format!(
                "the remote strategy needs an API key in {}",
                API_KEY_ENV_VARS.join(" or ")
            )))
        }
        (Strategy::Remote, Some(key)) => Arc::new(RemoteTranslator::new(&key, config.remote_options())?),
        (Strategy::Auto, None) => Arc::new(RuleBasedTranslator::new()),
        (Strategy::Auto, Some(key)) => Arc::new(FallbackTranslator::new(
            Arc::new(RemoteTranslator::new(&key, config.remote_options())?),
            Arc::new(RuleBasedTranslator::new()),
        )),
    };

    info!(
        strategy = %config.strategy,
        translator = translator.name(),
        "Translator selected"
    );
    Ok(translator)
}
