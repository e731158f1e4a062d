use crate::core::connection::ProviderError;
use crate::core::constants::USER_REJECTED_CODE;
use crate::core::signer::WalletExtension;
use crate::error::SubmitError;
use crate::types::{PendingTransaction, UnsignedTransaction};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

const NONCE_MESSAGES: &[&str] = &[
    "nonce too low",
    "nonce too high",
    "invalid nonce",
    "replacement transaction underpriced",
    "already known",
];

/// Hands transactions to the wallet extension for signing and broadcast.
///
/// Submission happens at most once per call. On [`SubmitError::NonceConflict`] the caller
/// decides whether to rebuild and submit again.
pub struct TransactionSubmitter<E> {
    extension: Arc<E>,
}

impl<E: WalletExtension> TransactionSubmitter<E> {
    pub fn new(extension: Arc<E>) -> Self {
        Self { extension }
    }

    pub async fn submit(&self, tx: &UnsignedTransaction) -> Result<PendingTransaction, SubmitError> {
        debug!(kind = %tx.kind, to = %tx.to, "requesting signature");

        let hash = self.extension.sign_and_send(tx).await.map_err(|e| {
            let err = classify_provider_error(e);
            warn!(kind = %tx.kind, error = %err, "submission failed");
            err
        })?;

        info!(kind = %tx.kind, %hash, "transaction submitted");

        Ok(PendingTransaction {
            hash,
            submitted_at: SystemTime::now(),
            kind: tx.kind,
            confirmations: 0,
        })
    }
}

/// Map a wallet or node error onto the submission error kinds.
pub fn classify_provider_error(error: ProviderError) -> SubmitError {
    if error.code == USER_REJECTED_CODE {
        return SubmitError::UserRejected;
    }

    let message = error.message.to_ascii_lowercase();
    if message.contains("insufficient funds") {
        SubmitError::InsufficientFunds(error.message)
    } else if NONCE_MESSAGES.iter().any(|m| message.contains(m)) {
        SubmitError::NonceConflict(error.message)
    } else {
        SubmitError::RpcUnavailable(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_rejection_is_by_code() {
        let err = classify_provider_error(ProviderError::new(4001, "User denied transaction"));
        assert_eq!(err, SubmitError::UserRejected);
    }

    #[test]
    fn insufficient_funds_is_by_message() {
        let err = classify_provider_error(ProviderError::new(
            -32000,
            "Insufficient funds for gas * price + value",
        ));
        assert!(matches!(err, SubmitError::InsufficientFunds(_)));
    }

    #[test]
    fn nonce_messages_are_conflicts() {
        for message in [
            "nonce too low",
            "replacement transaction underpriced",
            "already known",
        ] {
            let err = classify_provider_error(ProviderError::new(-32000, message));
            assert!(matches!(err, SubmitError::NonceConflict(_)), "{message}");
        }
    }

    #[test]
    fn everything_else_is_unavailable() {
        let err = classify_provider_error(ProviderError::new(-32603, "Internal error"));
        assert_eq!(
            err,
            SubmitError::RpcUnavailable("Internal error (code -32603)".to_string())
        );
    }
}
