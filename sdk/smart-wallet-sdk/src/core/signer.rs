use crate::core::connection::ProviderError;
use crate::types::UnsignedTransaction;
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Browser wallet extension holding the user's keys.
///
/// The SDK never sees key material: it hands unsigned transactions over and gets a hash back.
#[async_trait]
pub trait WalletExtension: Send + Sync {
    /// Ask the user for account access. The first account is the active one.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Address the extension currently signs with.
    async fn signer_address(&self) -> Result<Address, ProviderError>;

    /// Sign `tx` with the active account and broadcast it.
    async fn sign_and_send(&self, tx: &UnsignedTransaction) -> Result<B256, ProviderError>;

    /// Stream of account lists, emitted whenever the user switches accounts in the extension.
    fn account_changes(&self) -> broadcast::Receiver<Vec<Address>>;
}
