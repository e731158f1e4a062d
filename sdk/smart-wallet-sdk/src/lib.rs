pub mod advanced;
pub mod basic;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

pub use crate::advanced::abi::{encode_call, FunctionSignature};
pub use crate::basic::builder::TransactionBuilder;
pub use crate::basic::client::SmartWalletClient;
pub use crate::basic::session::{IntentGuard, WalletSessionManager};
pub use crate::basic::submitter::TransactionSubmitter;
pub use crate::basic::tracker::ConfirmationTracker;
pub use crate::core::config::{FeeMode, LogPosition, SdkConfig};
pub use crate::core::connection::{ChainConnection, ProviderError, TxNotification};
pub use crate::core::signer::WalletExtension;
pub use crate::error::{
    BuildError, ConfigError, ConfirmationError, ConnectError, EncodingError, Result,
    SessionError, SmartWalletSdkError, SubmitError,
};
pub use crate::types::{
    GasParams, Intent, IntentKind, LifecycleState, Log, PendingTransaction, Session,
    SmartWalletRef, TransactionOutcome, TransactionReceipt, UnsignedTransaction,
};
pub use crate::utils::{parse_address, parse_wei};
