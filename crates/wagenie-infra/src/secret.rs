//! API key resolution from the environment.
//!
//! Environment variables are the only secret backend: `WAGENIE_OPENAI_API_KEY`
//! takes precedence over the conventional `OPENAI_API_KEY`.

use secrecy::SecretString;

/// Project-scoped variable, checked first.
pub const ENV_API_KEY: &str = "WAGENIE_OPENAI_API_KEY";

/// Conventional fallback shared with other OpenAI tooling.
pub const ENV_API_KEY_FALLBACK: &str = "OPENAI_API_KEY";

/// Resolve the OpenAI API key, wrapped so it never appears in logs or
/// Debug output.
pub fn api_key_from_env() -> Option<SecretString> {
    for name in [ENV_API_KEY, ENV_API_KEY_FALLBACK] {
        match std::env::var(name) {
            Ok(val) if !val.is_empty() => return Some(SecretString::from(val)),
            // Invalid Unicode is treated as not found; keys must be
            // valid strings.
            _ => continue,
        }
    }
    None
}
