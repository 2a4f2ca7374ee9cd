//! # Stateless Validation
//!
//! Field and format checks that never touch ledger state. The concrete
//! validator is injected; the default covers structural rules, while
//! cryptographic signature verification belongs to the crypto collaborator
//! a deployment wires in.

use shared_types::Transaction;

/// Field/format validation of parsed transactions.
pub trait StatelessValidator: Send + Sync {
    /// Validate one transaction. The error is the human-readable reason
    /// recorded with the failure status.
    fn validate(&self, tx: &Transaction) -> Result<(), String>;

    /// Validate a submitted sequence as a unit. The default checks every
    /// member and fails on the first violation.
    fn validate_sequence(&self, txs: &[Transaction]) -> Result<(), String> {
        for tx in txs {
            self.validate(tx)?;
        }
        Ok(())
    }
}

/// Structural validation rules every deployment shares.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStatelessValidator;

impl StatelessValidator for DefaultStatelessValidator {
    fn validate(&self, tx: &Transaction) -> Result<(), String> {
        if tx.payload.commands.is_empty() {
            return Err("transaction carries no commands".into());
        }
        if tx.payload.quorum == 0 {
            return Err("quorum must be at least 1".into());
        }
        if tx.signatures.is_empty() {
            return Err("transaction is unsigned".into());
        }
        if tx.payload.created_at == 0 {
            return Err("missing creation timestamp".into());
        }
        if let Some(batch) = &tx.payload.batch {
            if !batch.reduced_hashes.contains(&tx.reduced_hash()) {
                return Err("batch metadata does not include this transaction".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{
        AccountId, BatchMeta, Command, TransactionPayload, TransactionSignature,
    };

    fn valid_tx() -> Transaction {
        Transaction {
            payload: TransactionPayload {
                creator: AccountId::new("admin", "test"),
                commands: vec![Command::CreateDomain {
                    domain_id: "d".into(),
                    default_role: "user".into(),
                }],
                created_at: 1_700_000_000_000,
                quorum: 1,
                batch: None,
            },
            signatures: vec![TransactionSignature {
                public_key: [1u8; 32],
                signature: [0u8; 64],
            }],
        }
    }

    #[test]
    fn accepts_well_formed_transaction() {
        assert!(DefaultStatelessValidator.validate(&valid_tx()).is_ok());
    }

    #[test]
    fn rejects_structural_violations() {
        let mut no_commands = valid_tx();
        no_commands.payload.commands.clear();
        assert!(DefaultStatelessValidator.validate(&no_commands).is_err());

        let mut unsigned = valid_tx();
        unsigned.signatures.clear();
        assert!(DefaultStatelessValidator.validate(&unsigned).is_err());

        let mut zero_quorum = valid_tx();
        zero_quorum.payload.quorum = 0;
        assert!(DefaultStatelessValidator.validate(&zero_quorum).is_err());
    }

    #[test]
    fn batch_metadata_must_reference_the_transaction() {
        let mut foreign_batch = valid_tx();
        foreign_batch.payload.batch = Some(BatchMeta {
            reduced_hashes: vec![[9u8; 32]],
        });
        assert!(DefaultStatelessValidator.validate(&foreign_batch).is_err());

        // The reduced hash excludes batch metadata, so a member can carry
        // its own reduced hash in the batch list.
        let mut member = valid_tx();
        let own_hash = member.reduced_hash();
        member.payload.batch = Some(BatchMeta {
            reduced_hashes: vec![own_hash, [9u8; 32]],
        });
        assert_eq!(member.reduced_hash(), own_hash);
        assert!(DefaultStatelessValidator.validate(&member).is_ok());
    }

    #[test]
    fn sequence_validation_fails_on_first_bad_member() {
        let good = valid_tx();
        let mut bad = valid_tx();
        bad.signatures.clear();
        let err = DefaultStatelessValidator
            .validate_sequence(&[good, bad])
            .unwrap_err();
        assert!(err.contains("unsigned"));
    }
}
