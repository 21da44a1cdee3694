//! Constructor arguments and ABI encoding.

use std::fmt;

use alloy_core::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::{Constructor, Function},
    primitives::{Address, B256, Bytes, U256, ruint::UintTryFrom},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A single ABI-typed constructor or call argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConstructorArg {
    Uint { bits: usize, value: U256 },
    Address { value: Address },
    Bytes32 { value: B256 },
}

impl ConstructorArg {
    pub fn uint<T>(bits: usize, value: T) -> Self
    where
        U256: UintTryFrom<T>,
    {
        Self::Uint {
            bits,
            value: U256::from(value),
        }
    }

    pub fn address(value: Address) -> Self {
        Self::Address { value }
    }

    pub fn bytes32(value: B256) -> Self {
        Self::Bytes32 { value }
    }

    /// The solidity type name, e.g. `uint64`.
    pub fn sol_type(&self) -> String {
        match self {
            Self::Uint { bits, .. } => format!("uint{bits}"),
            Self::Address { .. } => "address".to_string(),
            Self::Bytes32 { .. } => "bytes32".to_string(),
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address { value } => Some(*value),
            _ => None,
        }
    }

    pub fn to_sol_value(&self) -> DynSolValue {
        match self {
            Self::Uint { bits, value } => DynSolValue::Uint(*value, *bits),
            Self::Address { value } => DynSolValue::Address(*value),
            Self::Bytes32 { value } => DynSolValue::FixedBytes(*value, 32),
        }
    }
}

impl fmt::Display for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint { bits, value } => write!(f, "uint{bits}({value})"),
            Self::Address { value } => write!(f, "address({value})"),
            Self::Bytes32 { value } => write!(f, "bytes32({value})"),
        }
    }
}

fn to_sol_values(args: &[ConstructorArg]) -> Vec<DynSolValue> {
    args.iter().map(ConstructorArg::to_sol_value).collect()
}

/// A parsed constructor declaration.
#[derive(Debug, Clone)]
pub struct ConstructorSignature(Constructor);

impl ConstructorSignature {
    /// Parse a human-readable declaration such as `constructor(uint256 fee, address oracle)`.
    pub fn parse(signature: &str) -> Result<Self> {
        Constructor::parse(signature)
            .map(Self)
            .with_context(|| format!("Failed to parse constructor signature: {signature}"))
    }

    /// Input types in declaration order.
    pub fn input_types(&self) -> Vec<&str> {
        self.0.inputs.iter().map(|param| param.ty.as_str()).collect()
    }

    /// Check that `args` match the declared inputs one for one.
    pub fn check(&self, args: &[ConstructorArg]) -> Result<(), String> {
        let expected = self.input_types();

        if expected.len() != args.len() {
            return Err(format!(
                "expected {} arguments, got {}",
                expected.len(),
                args.len()
            ));
        }

        for (index, (param, arg)) in self.0.inputs.iter().zip(args).enumerate() {
            if param.ty != arg.sol_type() {
                return Err(format!(
                    "argument {index} ({}) is declared {}, got {}",
                    param.name,
                    param.ty,
                    arg.sol_type()
                ));
            }
        }

        Ok(())
    }

    /// ABI-encode `args` as constructor input (no selector).
    pub fn encode(&self, args: &[ConstructorArg]) -> Result<Bytes> {
        self.0
            .abi_encode_input(&to_sol_values(args))
            .map(Bytes::from)
            .context("Failed to ABI-encode constructor arguments")
    }
}

/// ABI-encode a call, selector included, from a declaration like `function f(uint64 id)`.
pub fn encode_call(signature: &str, args: &[ConstructorArg]) -> Result<Bytes> {
    let function = Function::parse(signature)
        .with_context(|| format!("Failed to parse function signature: {signature}"))?;

    function
        .abi_encode_input(&to_sol_values(args))
        .map(Bytes::from)
        .with_context(|| format!("Failed to ABI-encode call to {}", function.name))
}

/// ABI-encode constructor arguments for an undeclared constructor, inferring types from the values.
pub fn encode_args(args: &[ConstructorArg]) -> Bytes {
    DynSolValue::Tuple(to_sol_values(args))
        .abi_encode_params()
        .into()
}
