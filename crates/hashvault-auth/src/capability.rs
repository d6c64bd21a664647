//! Server-side capabilities and the role mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

use hashvault_core::Role;

/// One permission a session may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Upload a file for anchoring.
    Submit,
    /// Re-hash a file against an anchored record.
    Verify,
    /// List submissions and audit the hash chain.
    Audit,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Verify => "verify",
            Self::Audit => "audit",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities granted to a role, sorted.
pub fn capabilities_for(role: Role) -> Vec<Capability> {
    match role {
        Role::Operator => vec![Capability::Submit],
        Role::Admin => vec![Capability::Submit, Capability::Verify, Capability::Audit],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_may_only_submit() {
        assert_eq!(capabilities_for(Role::Operator), vec![Capability::Submit]);
    }

    #[test]
    fn test_admin_has_everything() {
        let caps = capabilities_for(Role::Admin);
        assert!(caps.contains(&Capability::Submit));
        assert!(caps.contains(&Capability::Verify));
        assert!(caps.contains(&Capability::Audit));
    }
}
