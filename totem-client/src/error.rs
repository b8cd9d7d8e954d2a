use thiserror::Error;

use totem_registry_api::{Category, TemplateId};

use crate::session::TxHash;

#[derive(Error, Debug, PartialEq)]
pub enum ClientError {
    /// Query failure: network, revert, or payload decode. Retryable by
    /// re-invoking the resolver.
    #[error("chain read failed: {0}")]
    Read(String),

    /// Balance is nonzero but the index-0 token lookup failed. Indicates a
    /// contract/client inconsistency and is surfaced, never retried.
    #[error("avatar lookup inconsistent: {0}")]
    OwnershipResolution(String),

    #[error("no wallet connected")]
    NoWallet,

    #[error("selection is missing: {}", format_categories(.0))]
    IncompleteSelection(Vec<Category>),

    #[error("no changes to apply")]
    NoChanges,

    #[error("wallet does not own an avatar")]
    NoAvatar,

    #[error("wallet already owns an avatar")]
    AvatarAlreadyMinted,

    #[error("template {template_id} is not available in the {category} catalog")]
    TemplateUnavailable {
        category: Category,
        template_id: TemplateId,
    },

    #[error("the body category is fixed and cannot be customized")]
    BodyFixed,

    #[error("avatar name cannot be empty")]
    EmptyName,

    /// The user declined to sign. Distinct from on-chain failure; no retry
    /// is implied.
    #[error("transaction rejected by user")]
    TransactionRejected,

    /// Terminal on-chain failure after submission. Prior steps of a
    /// multi-step mutation are not rolled back; chain truth must be
    /// re-resolved on the next read.
    #[error("transaction {tx_hash} reverted: {reason}")]
    TransactionReverted { tx_hash: TxHash, reason: String },

    #[error("transaction {tx_hash} unconfirmed after {attempts} receipt polls")]
    ConfirmationTimeout { tx_hash: TxHash, attempts: u32 },

    /// A second mutation was attempted while one is awaiting confirmation.
    #[error("a mutation is already in flight")]
    MutationInFlight,

    #[error("metadata decode failed: {0}")]
    Decode(String),
}

fn format_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_selection_lists_missing_categories() {
        let err = ClientError::IncompleteSelection(vec![Category::Eyes, Category::Mouth]);
        assert_eq!(err.to_string(), "selection is missing: eyes, mouth");
    }
}
