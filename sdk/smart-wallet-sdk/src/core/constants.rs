use std::time::Duration;

/// Gas limit of a plain value transfer to an address.
pub const SIMPLE_TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Nominal block interval used to size the default confirmation deadline.
pub const BLOCK_INTERVAL: Duration = Duration::from_secs(12);

/// Number of block intervals a transaction may stay pending before it is reported as timed out.
pub const DEFAULT_DEADLINE_BLOCKS: u32 = 12;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// EIP-1193 code for a request the user declined in the wallet extension.
pub const USER_REJECTED_CODE: i64 = 4001;
