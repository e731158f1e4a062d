use crate::advanced::{abi, calls};
use crate::core::config::{FeeMode, SdkConfig};
use crate::core::connection::{CallRequest, ChainConnection};
use crate::error::BuildError;
use crate::types::{GasParams, Intent, Session, SmartWalletRef, UnsignedTransaction};
use alloy_primitives::{Address, Bytes, U256};
use std::sync::Arc;
use tracing::debug;

/// Turns an [`Intent`] into an [`UnsignedTransaction`].
///
/// Gas parameters are fetched from the chain on every build; nothing is cached.
pub struct TransactionBuilder<C> {
    connection: Arc<C>,
    config: Arc<SdkConfig>,
}

impl<C: ChainConnection> TransactionBuilder<C> {
    pub fn new(connection: Arc<C>, config: Arc<SdkConfig>) -> Self {
        Self { connection, config }
    }

    pub async fn build(
        &self,
        intent: Intent,
        session: &Session,
        wallet_ref: &SmartWalletRef,
    ) -> Result<UnsignedTransaction, BuildError> {
        let kind = intent.kind();

        let (to, value, data) = match intent {
            Intent::CreateWallet => (
                wallet_ref.factory_address,
                U256::ZERO,
                calls::create_smart_wallet(),
            ),
            Intent::DestroyWallet => (
                wallet_ref.factory_address,
                U256::ZERO,
                calls::destroy_smart_wallet(),
            ),
            Intent::RecreateWallet => (
                wallet_ref.factory_address,
                U256::ZERO,
                calls::destroy_and_recreate_smart_wallet(),
            ),
            Intent::FundWallet { amount } => (active_wallet(wallet_ref)?, amount, Bytes::new()),
            Intent::TransferFunds { to, amount } => (
                active_wallet(wallet_ref)?,
                U256::ZERO,
                calls::send_ether(to, amount),
            ),
            Intent::DelegateCall {
                target,
                signature,
                params,
            } => {
                let wallet = active_wallet(wallet_ref)?;
                let inner = abi::encode_call(&signature, params.as_slice())?;
                (
                    wallet,
                    U256::ZERO,
                    calls::delegate_call_to_contract(target, inner),
                )
            },
        };

        // Plain value transfers have a fixed cost; anything touching contract code is estimated.
        let gas_limit = if data.is_empty() {
            self.config.simple_transfer_gas_limit
        } else {
            let request = CallRequest {
                from: Some(session.account_address),
                to,
                value,
                data: data.clone(),
            };
            self.connection
                .estimate_gas(&request)
                .await
                .map_err(BuildError::Gas)?
        };

        let gas = self.gas_params().await?;

        debug!(
            kind = %kind,
            from = %session.account_address,
            %to,
            %value,
            gas_limit,
            "built transaction"
        );

        Ok(UnsignedTransaction {
            from: session.account_address,
            to,
            value,
            data,
            gas_limit,
            gas,
            kind,
        })
    }

    async fn gas_params(&self) -> Result<GasParams, BuildError> {
        match self.config.fee_mode {
            FeeMode::Legacy => {
                let gas_price = self
                    .connection
                    .get_gas_price()
                    .await
                    .map_err(BuildError::Gas)?;
                Ok(GasParams::Legacy { gas_price })
            },
            FeeMode::Eip1559 => {
                let fees = self
                    .connection
                    .estimate_eip1559_fees()
                    .await
                    .map_err(BuildError::Gas)?;
                Ok(GasParams::Eip1559 {
                    max_fee_per_gas: fees.max_fee_per_gas,
                    max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
                })
            },
        }
    }
}

fn active_wallet(wallet_ref: &SmartWalletRef) -> Result<Address, BuildError> {
    wallet_ref
        .active_address()
        .ok_or(BuildError::WalletNotReady(wallet_ref.lifecycle_state))
}
