use alloy_primitives::{Address, Bytes, B256, U256};
use std::time::SystemTime;

/// A connected browser-wallet account.
///
/// Handed out by value; the session manager is the only owner of the live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_address: Address,

    /// Account balance in wei at connect time
    pub chain_balance: U256,

    pub connected_at: SystemTime,

    /// Bumped on every connect; outcomes carrying a stale epoch are discarded
    pub epoch: u64,
}

/// Lifecycle of the user's smart wallet as far as this client has observed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Unknown,
    Creating,
    Active,
    Destroying,
    Destroyed,
}

impl LifecycleState {
    pub fn is_active(self) -> bool {
        self == LifecycleState::Active
    }
}

/// The factory-deployed wallet belonging to the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartWalletRef {
    pub factory_address: Address,

    /// Set only from a confirmed create or recreate
    pub wallet_address: Option<Address>,

    pub lifecycle_state: LifecycleState,
}

impl SmartWalletRef {
    pub fn unknown(factory_address: Address) -> Self {
        Self {
            factory_address,
            wallet_address: None,
            lifecycle_state: LifecycleState::Unknown,
        }
    }

    pub fn active(factory_address: Address, wallet_address: Address) -> Self {
        Self {
            factory_address,
            wallet_address: Some(wallet_address),
            lifecycle_state: LifecycleState::Active,
        }
    }

    /// Wallet address, only when the wallet is known to be live.
    pub fn active_address(&self) -> Option<Address> {
        if self.lifecycle_state.is_active() {
            self.wallet_address
        } else {
            None
        }
    }
}

/// A single user request against the factory or the smart wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateWallet,
    DestroyWallet,
    RecreateWallet,
    FundWallet {
        amount: U256,
    },
    TransferFunds {
        to: Address,
        amount: U256,
    },
    DelegateCall {
        target: Address,
        signature: String,
        params: Vec<String>,
    },
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::CreateWallet => IntentKind::CreateWallet,
            Intent::DestroyWallet => IntentKind::DestroyWallet,
            Intent::RecreateWallet => IntentKind::RecreateWallet,
            Intent::FundWallet { .. } => IntentKind::FundWallet,
            Intent::TransferFunds { .. } => IntentKind::TransferFunds,
            Intent::DelegateCall { .. } => IntentKind::DelegateCall,
        }
    }
}

/// Payload-free tag of an [`Intent`], used to correlate transactions with what produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    CreateWallet,
    DestroyWallet,
    RecreateWallet,
    FundWallet,
    TransferFunds,
    DelegateCall,
}

impl IntentKind {
    /// Whether the intent operates on an already deployed wallet.
    pub fn requires_active_wallet(self) -> bool {
        matches!(
            self,
            IntentKind::FundWallet | IntentKind::TransferFunds | IntentKind::DelegateCall
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntentKind::CreateWallet => "create",
            IntentKind::DestroyWallet => "destroy",
            IntentKind::RecreateWallet => "recreate",
            IntentKind::FundWallet => "fund",
            IntentKind::TransferFunds => "transfer",
            IntentKind::DelegateCall => "delegateCall",
        }
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasParams {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub gas_limit: u64,
    pub gas: GasParams,

    /// Which intent this transaction was built from
    pub kind: IntentKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: B256,
    pub submitted_at: SystemTime,
    pub kind: IntentKind,

    /// Confirmations at submission time, so always zero for a fresh broadcast. The tracker
    /// reports the live count on the confirmed [`TransactionReceipt`].
    pub confirmations: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,

    /// `true` when the transaction executed without reverting
    pub status: bool,

    pub gas_used: u64,
    pub logs: Vec<Log>,

    /// Decoded revert reason, when the client could recover one
    pub revert_reason: Option<String>,

    /// Confirmations observed when the receipt was reported
    pub confirmations: u64,
}

/// Terminal result of a tracked transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Confirmed {
        receipt: TransactionReceipt,
        /// Wallet address extracted from the factory log, for create and recreate
        wallet_address: Option<Address>,
    },
    Failed {
        reason: Option<String>,
    },
    TimedOut,
    Dropped,
}

impl TransactionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed { .. })
    }
}
