//! Escrow facility error definitions.

use odra::prelude::*;

/// Failure class an [`EscrowError`] belongs to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// No matching branch, malformed arguments, or a failed precondition.
    RejectedInvocation,
    /// Division by zero, overflow or underflow in balance/ratio math.
    Arithmetic,
    /// Update/delete by a non-creator or with a bad signature.
    Authorization,
    /// Lifecycle transition the facility does not allow.
    UnsupportedLifecycleTransition,
    /// Outbound asset transfer refused by the host.
    Transfer,
}

/// Escrow facility errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EscrowError {
    // Rejected invocations (1xx)
    NoMatchingBranch = 100,
    MalformedArguments = 101,
    GroupedCall = 102,
    InsufficientStableBalance = 103,
    ZeroAmount = 104,
    MissingAttachedAsset = 105,
    WrongAsset = 106,
    NotCreated = 107,
    AlreadyCreated = 108,
    NotOptedIn = 109,
    AlreadyOptedIn = 110,
    StaleSnapshot = 111,
    Retired = 112,
    InvalidConfig = 113,

    // Arithmetic errors (2xx)
    DivisionByZero = 200,
    Overflow = 201,
    Underflow = 202,

    // Authorization errors (3xx)
    NotCreator = 300,
    InvalidSignature = 301,

    // Lifecycle errors (4xx)
    CloseOutDisallowed = 400,
    CloseOutWithBalance = 401,

    // Transfer errors (5xx)
    TransferFailed = 500,
    UnknownAsset = 501,
}

impl EscrowError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Rejected
            EscrowError::NoMatchingBranch => "Rejected: no matching branch",
            EscrowError::MalformedArguments => "Rejected: malformed arguments",
            EscrowError::GroupedCall => "Rejected: call must not be grouped",
            EscrowError::InsufficientStableBalance => "Rejected: stable balance too low",
            EscrowError::ZeroAmount => "Rejected: amount must be positive",
            EscrowError::MissingAttachedAsset => "Rejected: no asset attached",
            EscrowError::WrongAsset => "Rejected: unexpected asset",
            EscrowError::NotCreated => "Rejected: facility not created",
            EscrowError::AlreadyCreated => "Rejected: facility already created",
            EscrowError::NotOptedIn => "Rejected: account not opted in",
            EscrowError::AlreadyOptedIn => "Rejected: account already opted in",
            EscrowError::StaleSnapshot => "Rejected: state changed since snapshot",
            EscrowError::Retired => "Rejected: facility retired",
            EscrowError::InvalidConfig => "Rejected: invalid configuration",

            // Arithmetic
            EscrowError::DivisionByZero => "Arithmetic: division by zero ratio",
            EscrowError::Overflow => "Arithmetic: overflow",
            EscrowError::Underflow => "Arithmetic: underflow",

            // Authorization
            EscrowError::NotCreator => "Unauthorized: caller is not creator",
            EscrowError::InvalidSignature => "Unauthorized: signature check failed",

            // Lifecycle
            EscrowError::CloseOutDisallowed => "Close-out is not allowed",
            EscrowError::CloseOutWithBalance => "Close-out requires zero balances",

            // Transfer
            EscrowError::TransferFailed => "Asset transfer failed",
            EscrowError::UnknownAsset => "Asset id not resolvable",
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match *self as u16 {
            100..=199 => ErrorKind::RejectedInvocation,
            200..=299 => ErrorKind::Arithmetic,
            300..=399 => ErrorKind::Authorization,
            400..=499 => ErrorKind::UnsupportedLifecycleTransition,
            _ => ErrorKind::Transfer,
        }
    }
}

impl core::fmt::Display for EscrowError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<EscrowError> for OdraError {
    fn from(error: EscrowError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
