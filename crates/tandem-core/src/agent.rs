//! Agent identity
//!
//! An agent is whichever tool is driving this process. The identity is
//! resolved once per invocation and never changes afterwards.

use serde::{Deserialize, Serialize};

/// Identity used when nothing else is known.
pub const DEFAULT_AGENT: &str = "antigravity";

/// Environment signals checked in order; first match wins.
///
/// `None` means the variable's own value is the identity.
const ENV_SIGNALS: &[(&str, Option<&str>)] = &[
    ("CLAUDE_CODE_SESSION", Some("claude_code")),
    ("GEMINI_SESSION", Some("antigravity")),
    ("AGENT_SOURCE", None),
];

/// Opaque agent identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Create a new agent ID
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the acting agent from the process environment.
    ///
    /// An explicit override wins, then the environment signals, then
    /// `fallback`.
    #[must_use]
    pub fn resolve(explicit: Option<&str>, fallback: &str) -> Self {
        Self::resolve_with(explicit, fallback, |key| std::env::var(key).ok())
    }

    /// Same as [`AgentId::resolve`] with an injectable variable lookup.
    pub fn resolve_with(
        explicit: Option<&str>,
        fallback: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        explicit
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(Self::new)
            .or_else(|| {
                ENV_SIGNALS.iter().find_map(|(key, identity)| {
                    lookup(*key)
                        .filter(|value| !value.trim().is_empty())
                        .map(|value| identity.map_or_else(|| Self::new(value.trim()), Self::new))
                })
            })
            .unwrap_or_else(|| Self::new(fallback))
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for AgentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_explicit_override_wins() {
        let agent = AgentId::resolve_with(
            Some("codex"),
            DEFAULT_AGENT,
            env(&[("CLAUDE_CODE_SESSION", "1")]),
        );
        assert_eq!(agent.as_str(), "codex");
    }

    #[test]
    fn test_signals_checked_in_order() {
        let agent = AgentId::resolve_with(
            None,
            DEFAULT_AGENT,
            env(&[("AGENT_SOURCE", "cursor"), ("CLAUDE_CODE_SESSION", "1")]),
        );
        assert_eq!(agent.as_str(), "claude_code");

        let agent = AgentId::resolve_with(None, DEFAULT_AGENT, env(&[("GEMINI_SESSION", "x")]));
        assert_eq!(agent.as_str(), "antigravity");

        let agent = AgentId::resolve_with(None, DEFAULT_AGENT, env(&[("AGENT_SOURCE", "cursor")]));
        assert_eq!(agent.as_str(), "cursor");
    }

    #[test]
    fn test_fallback_when_nothing_set() {
        let agent = AgentId::resolve_with(None, "local", env(&[]));
        assert_eq!(agent.as_str(), "local");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let agent = AgentId::resolve_with(
            Some("  "),
            DEFAULT_AGENT,
            env(&[("CLAUDE_CODE_SESSION", ""), ("AGENT_SOURCE", "cursor")]),
        );
        assert_eq!(agent.as_str(), "cursor");
    }
}
