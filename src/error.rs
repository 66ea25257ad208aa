use near_sdk::env;

/// Failure modes of the protocol operations. Each aborts the invocation
/// with a stable message; the runtime reverts any state the aborted call
/// wrote, so callers never observe partial writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HtlcError {
    /// No record carries the given id.
    NotFound,
    /// The record already reached a terminal state.
    AlreadySettled,
    /// Withdraw attempted at or after the timelock.
    Expired,
    /// Refund attempted before the timelock.
    NotYetExpired,
    /// The supplied preimage does not hash to the hashlock.
    InvalidPreimage,
    /// The expiry is not strictly in the future at creation.
    InvalidTimelock,
    /// A non-positive amount was offered for escrow.
    InvalidAmount,
    /// A record with the same commitment already exists.
    DuplicateContract,
    /// The ledger declined to move the escrowed asset.
    TransferRejected,
    /// The caller does not hold the role the operation requires.
    Unauthorized,
}

impl HtlcError {
    pub fn message(self) -> &'static str {
        match self {
            HtlcError::NotFound => "No HTLC with this id",
            HtlcError::AlreadySettled => "HTLC already settled",
            HtlcError::Expired => "HTLC timelock has expired",
            HtlcError::NotYetExpired => "HTLC timelock has not expired yet",
            HtlcError::InvalidPreimage => "Preimage does not match the hashlock",
            HtlcError::InvalidTimelock => "Timelock must be in the future",
            HtlcError::InvalidAmount => "Escrow amount must be positive",
            HtlcError::DuplicateContract => "HTLC with this commitment already exists",
            HtlcError::TransferRejected => "Asset transfer was rejected",
            HtlcError::Unauthorized => "Caller is not authorized for this action",
        }
    }
}

/// `require!` with a named failure mode.
pub(crate) fn check(condition: bool, error: HtlcError) {
    if !condition {
        abort(error);
    }
}

pub(crate) fn abort(error: HtlcError) -> ! {
    env::panic_str(error.message())
}
