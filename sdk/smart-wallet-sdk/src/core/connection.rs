use crate::types::TransactionReceipt;
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;

/// Error reported by a chain client or wallet extension, in EIP-1193 shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for ProviderError {}

/// Read-only call or gas-estimation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Event pushed by the chain client for a watched transaction hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxNotification {
    Mined(TransactionReceipt),

    /// The node evicted the transaction from its pool
    Dropped,
}

/// Chain RPC client consumed by the builder, tracker and session manager.
///
/// `subscribe_transaction` hands back the receiving half of a channel; the client must
/// stop publishing once the receiver is dropped.
#[async_trait]
pub trait ChainConnection: Send + Sync {
    async fn get_gas_price(&self) -> Result<u128, ProviderError>;

    async fn estimate_eip1559_fees(&self) -> Result<FeeEstimate, ProviderError>;

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, ProviderError>;

    async fn call(&self, request: &CallRequest) -> Result<Bytes, ProviderError>;

    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError>;

    async fn get_block_number(&self) -> Result<u64, ProviderError>;

    async fn get_transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError>;

    async fn subscribe_transaction(
        &self,
        hash: B256,
    ) -> Result<mpsc::Receiver<TxNotification>, ProviderError>;
}
