//! Epic ownership checks.
//!
//! Resolution and enforcement are separate steps: [`resolve`] reads the
//! backlog and says who owns the task's epic, and [`OwnershipPolicy`] turns
//! that answer plus the caller's `force` flag into allow or deny.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::grammar::{epic_number, Backlog};
use crate::{AgentId, Error, Result};

/// What the backlog says about the epic a task belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipDecision {
    /// No epic header, or a header without an owner annotation
    Unclaimed,
    /// The caller owns the epic
    Owner,
    /// Someone else owns the epic
    Foreign { epic: String, owner: AgentId },
}

/// How a foreign owner is enforced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OwnershipPolicy {
    /// Deny unless forced; forcing proceeds with a warning
    Soft,
    /// Deny, force or not
    Strict,
}

/// Outcome of an ownership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipCheck {
    pub allow: bool,
    pub message: Option<String>,
}

impl OwnershipCheck {
    const fn allowed() -> Self {
        Self {
            allow: true,
            message: None,
        }
    }
}

impl OwnershipPolicy {
    pub fn apply(self, decision: &OwnershipDecision, force: bool) -> OwnershipCheck {
        let OwnershipDecision::Foreign { epic, owner } = decision else {
            return OwnershipCheck::allowed();
        };

        match (self, force) {
            (Self::Soft, true) => OwnershipCheck {
                allow: true,
                message: Some(format!(
                    "Epic {epic} belongs to '{owner}', but proceeding with --force."
                )),
            },
            (Self::Soft, false) => OwnershipCheck {
                allow: false,
                message: Some(format!(
                    "Epic {epic} belongs to '{owner}'. Use --force to override."
                )),
            },
            (Self::Strict, _) => OwnershipCheck {
                allow: false,
                message: Some(format!(
                    "Epic {epic} belongs to '{owner}' and the ownership policy is strict."
                )),
            },
        }
    }

    /// [`OwnershipPolicy::apply`] as a `Result`, carrying any warning.
    ///
    /// # Errors
    ///
    /// Returns `Error::OwnershipConflict` when the policy denies the caller.
    pub fn enforce(self, decision: &OwnershipDecision, force: bool) -> Result<Option<String>> {
        let check = self.apply(decision, force);
        match decision {
            OwnershipDecision::Foreign { epic, owner } if !check.allow => {
                Err(Error::OwnershipConflict {
                    epic: epic.clone(),
                    owner: owner.to_string(),
                })
            }
            _ => Ok(check.message),
        }
    }
}

/// Who owns the epic of `task_id` according to `backlog`.
pub fn resolve(backlog: &Backlog, task_id: &str, agent: &AgentId) -> OwnershipDecision {
    let Some(number) = epic_number(task_id) else {
        return OwnershipDecision::Unclaimed;
    };

    match backlog.epic(&number).and_then(|epic| epic.owner) {
        None => OwnershipDecision::Unclaimed,
        Some(owner) if owner == *agent => OwnershipDecision::Owner,
        Some(owner) => OwnershipDecision::Foreign { epic: number, owner },
    }
}

/// Ownership check under the default soft policy.
pub fn check(content: &str, task_id: &str, agent: &AgentId, force: bool) -> OwnershipCheck {
    check_with_policy(content, task_id, agent, force, OwnershipPolicy::Soft)
}

pub fn check_with_policy(
    content: &str,
    task_id: &str,
    agent: &AgentId,
    force: bool,
    policy: OwnershipPolicy,
) -> OwnershipCheck {
    let decision = resolve(&Backlog::parse(content), task_id, agent);
    tracing::debug!(task_id, %agent, ?decision, %policy, "ownership resolved");
    policy.apply(&decision, force)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKLOG: &str = "## Epic 2: Billing\n\
- [ ] **Story 2.1:** Invoices\n\
\n\
## Epic 3: Reports [OWNER: claude_code] ⏳\n\
- [ ] **Story 3.1:** Weekly summary\n";

    fn agent(name: &str) -> AgentId {
        AgentId::new(name)
    }

    #[test]
    fn test_missing_epic_is_allowed() {
        let result = check(BACKLOG, "9.1", &agent("antigravity"), false);
        assert_eq!(result, OwnershipCheck::allowed());
    }

    #[test]
    fn test_unowned_epic_is_allowed() {
        let result = check(BACKLOG, "2.1", &agent("antigravity"), false);
        assert_eq!(result, OwnershipCheck::allowed());
    }

    #[test]
    fn test_owner_is_allowed() {
        let result = check(BACKLOG, "Story 3.1", &agent("claude_code"), false);
        assert_eq!(result, OwnershipCheck::allowed());
    }

    #[test]
    fn test_foreign_epic_is_denied() {
        let result = check(BACKLOG, "3.1", &agent("antigravity"), false);
        assert!(!result.allow);
        assert_eq!(
            result.message.as_deref(),
            Some("Epic 3 belongs to 'claude_code'. Use --force to override.")
        );
    }

    #[test]
    fn test_force_allows_with_warning() {
        let result = check(BACKLOG, "3.1", &agent("antigravity"), true);
        assert!(result.allow);
        assert!(result
            .message
            .as_deref()
            .is_some_and(|m| m.contains("proceeding with --force")));
    }

    #[test]
    fn test_strict_policy_ignores_force() {
        let result = check_with_policy(
            BACKLOG,
            "3.1",
            &agent("antigravity"),
            true,
            OwnershipPolicy::Strict,
        );
        assert!(!result.allow);
    }

    #[test]
    fn test_enforce_maps_denial_to_error() {
        let decision = OwnershipDecision::Foreign {
            epic: "3".into(),
            owner: agent("claude_code"),
        };
        assert!(matches!(
            OwnershipPolicy::Soft.enforce(&decision, false),
            Err(Error::OwnershipConflict { .. })
        ));
        assert!(matches!(
            OwnershipPolicy::Soft.enforce(&decision, true),
            Ok(Some(_))
        ));
        assert_eq!(
            OwnershipPolicy::Soft.enforce(&OwnershipDecision::Owner, false),
            Ok(None)
        );
    }

    #[test]
    fn test_policy_parses_lowercase() {
        assert_eq!("strict".parse::<OwnershipPolicy>(), Ok(OwnershipPolicy::Strict));
        assert_eq!(OwnershipPolicy::Soft.to_string(), "soft");
        assert!("hard".parse::<OwnershipPolicy>().is_err());
    }
}
