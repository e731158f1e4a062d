//! Call-data encoding for free-form function signatures.
//!
//! Signatures follow the Solidity canonical form `name(type1,type2,...)`. Each parameter may
//! carry a name (`transfer(address to, uint256 amount)`), which is dropped when computing the
//! selector. Tuple parameters are rejected instead of being split on their inner commas.

use crate::error::EncodingError;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Bytes, Selector};

/// A parsed and validated function signature.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    name: String,
    param_types: Vec<DynSolType>,
}

impl FunctionSignature {
    pub fn parse(signature: &str) -> Result<Self, EncodingError> {
        let malformed = |reason: &str| EncodingError::MalformedSignature {
            signature: signature.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = signature.trim();
        let (name, rest) = trimmed
            .split_once('(')
            .ok_or_else(|| malformed("missing `(`"))?;
        let name = name.trim();
        if !is_identifier(name) {
            return Err(malformed("invalid function name"));
        }

        let inner = rest
            .strip_suffix(')')
            .ok_or_else(|| malformed("missing closing `)`"))?;
        if inner.contains(|c| c == '(' || c == ')') {
            return Err(malformed("tuple parameters are not supported"));
        }

        let mut param_types = Vec::new();
        if !inner.trim().is_empty() {
            for piece in inner.split(',') {
                let mut tokens = piece.split_whitespace();
                let ty = tokens
                    .next()
                    .ok_or_else(|| malformed("empty parameter type"))?;
                match (tokens.next(), tokens.next()) {
                    (None, _) => {},
                    (Some(param_name), None) if is_identifier(param_name) => {},
                    _ => return Err(malformed("unexpected tokens in parameter")),
                }
                param_types.push(parse_param_type(ty)?);
            }
        }

        Ok(Self {
            name: name.to_string(),
            param_types,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_types(&self) -> &[DynSolType] {
        &self.param_types
    }

    /// Canonical form used for the selector, e.g. `transfer(address,uint256)`.
    pub fn canonical(&self) -> String {
        let types: Vec<_> = self
            .param_types
            .iter()
            .map(|ty| ty.sol_type_name())
            .collect();
        format!("{}({})", self.name, types.join(","))
    }

    pub fn selector(&self) -> Selector {
        Selector::from_slice(&keccak256(self.canonical().as_bytes())[..4])
    }

    /// Selector followed by the ABI encoding of `params`, each coerced to its declared type.
    pub fn encode<S: AsRef<str>>(&self, params: &[S]) -> Result<Bytes, EncodingError> {
        if params.len() != self.param_types.len() {
            return Err(EncodingError::ArityMismatch {
                expected: self.param_types.len(),
                actual: params.len(),
            });
        }

        let values = self
            .param_types
            .iter()
            .zip(params)
            .enumerate()
            .map(|(index, (ty, value))| {
                let value = value.as_ref();
                ty.coerce_str(value.trim())
                    .map_err(|_| EncodingError::TypeMismatch {
                        index,
                        expected: ty.sol_type_name().into_owned(),
                        value: value.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut data = self.selector().to_vec();
        data.extend_from_slice(&DynSolValue::Tuple(values).abi_encode_params());
        Ok(data.into())
    }
}

/// Encode a call to `signature` with string-typed `params`.
pub fn encode_call<S: AsRef<str>>(signature: &str, params: &[S]) -> Result<Bytes, EncodingError> {
    FunctionSignature::parse(signature)?.encode(params)
}

fn parse_param_type(ty: &str) -> Result<DynSolType, EncodingError> {
    let parsed =
        DynSolType::parse(ty).map_err(|_| EncodingError::UnsupportedType(ty.to_string()))?;
    if contains_tuple(&parsed) {
        return Err(EncodingError::UnsupportedType(ty.to_string()));
    }
    Ok(parsed)
}

fn contains_tuple(ty: &DynSolType) -> bool {
    match ty {
        DynSolType::Tuple(_) => true,
        DynSolType::Array(inner) | DynSolType::FixedArray(inner, _) => contains_tuple(inner),
        _ => false,
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
