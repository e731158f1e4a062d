use crate::core::connection::ProviderError;
use crate::types::LifecycleState;
use thiserror::Error;

/// Failures while establishing a wallet session.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// No browser wallet extension is installed
    #[error("Wallet extension not found")]
    ExtensionNotFound,

    /// The user declined the account access request
    #[error("User rejected the account access request")]
    UserRejected,

    /// The extension granted access but exposed no account
    #[error("Wallet extension returned no accounts")]
    NoAccounts,

    #[error("Connection error: {0}")]
    Provider(ProviderError),
}

/// Failures while turning a function signature and parameter strings into call data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Malformed function signature `{signature}`: {reason}")]
    MalformedSignature { signature: String, reason: String },

    #[error("Unsupported parameter type `{0}`")]
    UnsupportedType(String),

    #[error("Signature declares {expected} parameters but {actual} were supplied")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Parameter {index} value `{value}` is not a valid `{expected}`")]
    TypeMismatch {
        index: usize,
        expected: String,
        value: String,
    },
}

/// Failures while assembling an unsigned transaction from an intent.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Smart wallet is not ready (state: {0:?})")]
    WalletNotReady(LifecycleState),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Gas lookup failed: {0}")]
    Gas(ProviderError),
}

/// Failures while signing and broadcasting a transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("User rejected the transaction")]
    UserRejected,

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Nonce conflict: {0}")]
    NonceConflict(String),

    #[error("RPC unavailable: {0}")]
    RpcUnavailable(String),
}

/// Failures while watching a submitted transaction.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// The receipt lacks the factory log at the configured position
    #[error("Receipt has no topic {topic_index} in log {log_index}")]
    MissingExpectedLog { log_index: usize, topic_index: usize },

    #[error("Confirmation watch cancelled")]
    Cancelled,

    #[error("Connection error: {0}")]
    Provider(ProviderError),
}

/// Violations of the one-intent-per-session rule and session lifetime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Wallet is not connected")]
    NotConnected,

    /// Another intent is in flight for this session
    #[error("Another transaction is already in flight")]
    Busy,

    /// The account changed while the intent was in flight
    #[error("Session changed while the transaction was in flight")]
    SessionChanged,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// SDK-level error returned by the client facade.
#[derive(Debug, Error)]
pub enum SmartWalletSdkError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SmartWalletSdkError>;
