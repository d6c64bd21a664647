//! Submission identifier issuance.
//!
//! The issuer only draws random ids. Uniqueness against existing records is
//! the ledger's job, enforced at insert time.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::types::{SubmissionId, ID_ENTROPY_BYTES};

/// Source of fresh submission identifiers.
pub trait IdIssuer: Send + Sync {
    fn issue(&self) -> SubmissionId;
}

/// Issues `HV-` ids backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdIssuer;

impl IdIssuer for RandomIdIssuer {
    fn issue(&self) -> SubmissionId {
        let mut bytes = [0u8; ID_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        SubmissionId::from_entropy(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_ids_are_well_formed() {
        let issuer = RandomIdIssuer;
        for _ in 0..100 {
            let id = issuer.issue();
            assert!(id.is_well_formed(), "bad id: {id}");
        }
    }

    #[test]
    fn test_random_ids_do_not_repeat() {
        let issuer = RandomIdIssuer;
        let ids: HashSet<_> = (0..10_000).map(|_| issuer.issue()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
