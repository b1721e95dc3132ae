// ════════════════════════════════════════════════════════════════════════════
// CHAIN ERRORS
// ════════════════════════════════════════════════════════════════════════════
// Every error here is recoverable at the operation/transaction boundary.
// Arithmetic overflow of balances or usage counters is NOT represented:
// it panics, because the supply invariants are already broken upstream.
// ════════════════════════════════════════════════════════════════════════════

use thiserror::Error;

use crate::actuator::ExecutionReceipt;
use crate::tx::OperationKind;
use crate::types::Address;

/// Business-rule rejection raised by `Actuator::validate`.
///
/// Raising one guarantees the store was not touched for this operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid asset name: {0}")]
    InvalidAssetName(String),

    #[error("invalid description: {0}")]
    InvalidDescription(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),
}

/// Failure inside `Actuator::execute`. Only reachable when validate and
/// execute disagree about the state; the caller still records a `Failed`
/// receipt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),
}

/// Admission rejection from the bandwidth engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BandwidthError {
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("bandwidth exhausted: {0}")]
    BandwidthExhausted(String),
}

/// Envelope payload decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Bytes do not decode as any operation shape.
    #[error("payload is not a valid operation record: {0}")]
    Malformed(String),

    /// Bytes decode, but into a different operation than the envelope declares.
    #[error("contract type error, expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        expected: OperationKind,
        actual: OperationKind,
    },
}

/// Balance adjustment failure in the account store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("account {0} does not exist")]
    AccountNotFound(Address),

    #[error("account {address} balance {balance} cannot absorb {delta}")]
    Insufficient {
        address: Address,
        balance: i64,
        delta: i64,
    },
}

/// Store construction and head maintenance errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    #[error("head slot cannot move backwards: current {current}, requested {requested}")]
    HeadRegression { current: u64, requested: u64 },
}

/// Outcome of a rejected transaction in `TransactionProcessor`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("transaction contains no operations")]
    EmptyTransaction,

    #[error("operation {index}: bandwidth rejected: {source}")]
    Bandwidth {
        index: usize,
        source: BandwidthError,
    },

    #[error("operation {index}: validation failed: {source}")]
    Validation {
        index: usize,
        source: ValidationError,
    },

    #[error("operation {index}: execution failed: {source}")]
    Execution {
        index: usize,
        receipt: ExecutionReceipt,
        source: ExecutionError,
    },
}

impl ProcessError {
    /// Index of the offending operation, if any.
    pub fn operation_index(&self) -> Option<usize> {
        match self {
            ProcessError::EmptyTransaction => None,
            ProcessError::Bandwidth { index, .. }
            | ProcessError::Validation { index, .. }
            | ProcessError::Execution { index, .. } => Some(*index),
        }
    }
}

impl From<PayloadError> for ValidationError {
    fn from(e: PayloadError) -> Self {
        ValidationError::MalformedPayload(e.to_string())
    }
}

impl From<PayloadError> for ExecutionError {
    fn from(e: PayloadError) -> Self {
        ExecutionError::MalformedPayload(e.to_string())
    }
}

impl From<BalanceError> for ExecutionError {
    fn from(e: BalanceError) -> Self {
        match e {
            BalanceError::AccountNotFound(addr) => ExecutionError::AccountNotFound(addr.to_string()),
            insufficient @ BalanceError::Insufficient { .. } => {
                ExecutionError::InsufficientBalance(insufficient.to_string())
            }
        }
    }
}
