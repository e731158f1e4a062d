use crate::core::config::LogPosition;
use crate::error::EncodingError;
use crate::types::TransactionReceipt;
use alloy_primitives::{Address, U256};

//=============================================================================
// Input Parsing
//=============================================================================

/// Parse a `0x`-prefixed (or bare) 20-byte hex address.
pub fn parse_address(input: &str) -> Result<Address, EncodingError> {
    input
        .trim()
        .parse::<Address>()
        .map_err(|_| EncodingError::TypeMismatch {
            index: 0,
            expected: "address".to_string(),
            value: input.to_string(),
        })
}

/// Parse an amount given in wei as a decimal integer string.
pub fn parse_wei(input: &str) -> Result<U256, EncodingError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EncodingError::TypeMismatch {
            index: 0,
            expected: "uint256".to_string(),
            value: input.to_string(),
        });
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| EncodingError::TypeMismatch {
        index: 0,
        expected: "uint256".to_string(),
        value: input.to_string(),
    })
}

//=============================================================================
// Receipt Inspection
//=============================================================================

/// Read the address stored in the topic at `position`.
///
/// Topics are 32-byte words; an indexed address occupies the low 20 bytes.
pub fn extract_address_from_log(
    receipt: &TransactionReceipt,
    position: LogPosition,
) -> Option<Address> {
    let topic = receipt
        .logs
        .get(position.log_index)?
        .topics
        .get(position.topic_index)?;
    Some(Address::from_word(*topic))
}

//=============================================================================
// Delegate-call Parameters
//=============================================================================

/// Ordered delegate-call parameter values, collected one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegateCallParams {
    values: Vec<String>,
}

impl DelegateCallParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    /// Remove the value at `index`, returning it if it existed.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.values.len() {
            Some(self.values.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<String> {
        self.values
    }
}
