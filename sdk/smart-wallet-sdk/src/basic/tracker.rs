use crate::core::config::SdkConfig;
use crate::core::connection::{ChainConnection, TxNotification};
use crate::error::ConfirmationError;
use crate::types::{IntentKind, PendingTransaction, TransactionOutcome, TransactionReceipt};
use crate::utils;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Watches a submitted transaction until it reaches a terminal outcome.
///
/// Every call to [`track`](Self::track) resolves within the configured deadline: either to
/// `Confirmed`, `Failed` or `Dropped`, or to `TimedOut` when the deadline elapses first. The
/// receipt subscription is owned by the tracking future and released when it completes, is
/// cancelled or is dropped. Failed receipt or block lookups while watching are retried on the
/// next poll; only a failed subscription ends the watch with an error.
pub struct ConfirmationTracker<C> {
    connection: Arc<C>,
    config: Arc<SdkConfig>,
}

impl<C: ChainConnection> ConfirmationTracker<C> {
    pub fn new(connection: Arc<C>, config: Arc<SdkConfig>) -> Self {
        Self { connection, config }
    }

    pub async fn track(
        &self,
        pending: &PendingTransaction,
    ) -> Result<TransactionOutcome, ConfirmationError> {
        self.track_until(pending, std::future::pending()).await
    }

    /// Like [`track`](Self::track), but gives up with [`ConfirmationError::Cancelled`] as soon
    /// as `cancel` completes.
    pub async fn track_until<F>(
        &self,
        pending: &PendingTransaction,
        cancel: F,
    ) -> Result<TransactionOutcome, ConfirmationError>
    where
        F: Future<Output = ()>,
    {
        let deadline = self.config.confirmation_deadline();
        debug!(hash = %pending.hash, kind = %pending.kind, ?deadline, "watching transaction");

        let watch = async {
            let notifications = self
                .connection
                .subscribe_transaction(pending.hash)
                .await
                .map_err(ConfirmationError::Provider)?;
            self.watch(pending, notifications).await
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel => {
                debug!(hash = %pending.hash, "confirmation watch cancelled");
                return Err(ConfirmationError::Cancelled);
            },
            result = tokio::time::timeout(deadline, watch) => match result {
                Ok(outcome) => outcome?,
                Err(_) => TransactionOutcome::TimedOut,
            },
        };

        log_outcome(pending, &outcome);
        Ok(outcome)
    }

    /// Look the receipt up once after a timeout.
    ///
    /// A receipt settles the transaction; no receipt means the node no longer knows it and it
    /// is reported as dropped. A receipt still short of the required confirmations is reported
    /// as timed out again.
    pub async fn requery(
        &self,
        pending: &PendingTransaction,
    ) -> Result<TransactionOutcome, ConfirmationError> {
        let receipt = self
            .connection
            .get_transaction_receipt(pending.hash)
            .await
            .map_err(ConfirmationError::Provider)?;

        let outcome = match receipt {
            Some(receipt) => self
                .settle(pending.kind, receipt)
                .await?
                .unwrap_or(TransactionOutcome::TimedOut),
            None => TransactionOutcome::Dropped,
        };

        log_outcome(pending, &outcome);
        Ok(outcome)
    }

    async fn watch(
        &self,
        pending: &PendingTransaction,
        mut notifications: mpsc::Receiver<TxNotification>,
    ) -> Result<TransactionOutcome, ConfirmationError> {
        let mut poll = tokio::time::interval(self.config.poll_interval());
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut subscribed = true;

        loop {
            let receipt = tokio::select! {
                notification = notifications.recv(), if subscribed => match notification {
                    Some(TxNotification::Mined(receipt)) => receipt,
                    Some(TxNotification::Dropped) => return Ok(TransactionOutcome::Dropped),
                    None => {
                        // The client closed the stream; polling carries on alone.
                        subscribed = false;
                        continue;
                    },
                },
                _ = poll.tick() => match self.connection.get_transaction_receipt(pending.hash).await {
                    Ok(Some(receipt)) => receipt,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!(hash = %pending.hash, error = %e, "receipt lookup failed");
                        continue;
                    },
                },
            };

            // RPC hiccups are retried on the next tick; the deadline bounds the wait.
            match self.settle(pending.kind, receipt).await {
                Ok(Some(outcome)) => return Ok(outcome),
                Ok(None) => {},
                Err(ConfirmationError::Provider(e)) => {
                    warn!(hash = %pending.hash, error = %e, "block number lookup failed");
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// Turn a receipt into an outcome, or `None` while confirmations are still short.
    async fn settle(
        &self,
        kind: IntentKind,
        mut receipt: TransactionReceipt,
    ) -> Result<Option<TransactionOutcome>, ConfirmationError> {
        if !receipt.status {
            return Ok(Some(TransactionOutcome::Failed {
                reason: receipt.revert_reason.clone(),
            }));
        }

        let head = self
            .connection
            .get_block_number()
            .await
            .map_err(ConfirmationError::Provider)?;
        receipt.confirmations = head.saturating_sub(receipt.block_number) + 1;
        if receipt.confirmations < self.config.confirmations {
            debug!(
                hash = %receipt.transaction_hash,
                confirmations = receipt.confirmations,
                required = self.config.confirmations,
                "waiting for confirmations"
            );
            return Ok(None);
        }

        let position = match kind {
            IntentKind::CreateWallet => Some(self.config.create_log),
            IntentKind::RecreateWallet => Some(self.config.recreate_log),
            _ => None,
        };

        let wallet_address = match position {
            Some(position) => {
                let address = utils::extract_address_from_log(&receipt, position)
                    .filter(|address| !address.is_zero())
                    .ok_or(ConfirmationError::MissingExpectedLog {
                        log_index: position.log_index,
                        topic_index: position.topic_index,
                    })?;
                Some(address)
            },
            None => None,
        };

        Ok(Some(TransactionOutcome::Confirmed {
            receipt,
            wallet_address,
        }))
    }
}

fn log_outcome(pending: &PendingTransaction, outcome: &TransactionOutcome) {
    match outcome {
        TransactionOutcome::Confirmed { receipt, .. } => info!(
            hash = %pending.hash,
            block = receipt.block_number,
            confirmations = receipt.confirmations,
            "transaction confirmed"
        ),
        TransactionOutcome::Failed { reason } => {
            warn!(hash = %pending.hash, ?reason, "transaction failed")
        },
        TransactionOutcome::TimedOut => warn!(hash = %pending.hash, "transaction timed out"),
        TransactionOutcome::Dropped => warn!(hash = %pending.hash, "transaction dropped"),
    }
}
