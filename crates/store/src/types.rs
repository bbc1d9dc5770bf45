//! Domain types for the prompt catalog.

use serde::{Deserialize, Serialize};

/// Delimiter joining (user, purpose) into a snapshot activation key.
pub const ACTIVATION_KEY_DELIMITER: &str = ":";

/// A versioned prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Opaque unique id, generated at creation, immutable
    pub id: String,

    /// Free-form category string (e.g., "summarize")
    pub purpose: String,

    /// Display label
    pub name: String,

    /// Raw template text
    pub template: String,

    /// Starts at 1, increments by exactly 1 on every successful update
    pub version: u32,

    /// Identity of the creating user, immutable after creation
    pub owner: String,
}

/// Join a (user, purpose) pair into the activation key used by the
/// snapshot file format.
pub fn activation_key(user: &str, purpose: &str) -> String {
    format!("{}{}{}", user, ACTIVATION_KEY_DELIMITER, purpose)
}

/// Split an activation key back into its (user, purpose) pair.
pub fn split_activation_key(key: &str) -> Option<(String, String)> {
    key.split_once(ACTIVATION_KEY_DELIMITER)
        .map(|(user, purpose)| (user.to_string(), purpose.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_key_round_trip() {
        let key = activation_key("u1", "summarize");
        assert_eq!(key, "u1:summarize");
        assert_eq!(
            split_activation_key(&key),
            Some(("u1".to_string(), "summarize".to_string()))
        );
    }

    #[test]
    fn test_split_rejects_bare_key() {
        assert_eq!(split_activation_key("nodelimiter"), None);
    }

    #[test]
    fn test_prompt_serde_round_trip() {
        let prompt = Prompt {
            id: "abc".to_string(),
            purpose: "summarize".to_string(),
            name: "Summary v1".to_string(),
            template: "Summarize: {document}".to_string(),
            version: 3,
            owner: "u1".to_string(),
        };
        let json = serde_json::to_string(&prompt).unwrap();
        let back: Prompt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prompt);
    }
}
