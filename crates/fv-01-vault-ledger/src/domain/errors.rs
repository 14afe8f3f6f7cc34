use shared_types::{Address, AssetId, U256};
use thiserror::Error;

/// Errors raised by the asset book and the vault ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient balance of {asset} on {account}: required {required}, available {available}")]
    InsufficientBalance {
        asset: AssetId,
        account: Address,
        required: U256,
        available: U256,
    },

    #[error("Insufficient allowance of {asset} from {owner} to {spender}: required {required}, available {available}")]
    InsufficientAllowance {
        asset: AssetId,
        owner: Address,
        spender: Address,
        required: U256,
        available: U256,
    },

    #[error("Balance overflow of {asset} on {account}")]
    Overflow { asset: AssetId, account: Address },

    #[error("Limit exceeded: at most {limit} tracked assets")]
    TrackedAssetLimitExceeded { limit: usize },

    #[error("Cannot remove denomination asset {0}")]
    CannotRemoveDenominationAsset(AssetId),

    #[error("Asset {0} is not tracked")]
    NotTracked(AssetId),

    #[error("Exceeds dust threshold: {asset} valued {value} > {threshold}")]
    ExceedsDustThreshold {
        asset: AssetId,
        value: U256,
        threshold: U256,
    },

    #[error("Invalid asset valuation for {0}")]
    InvalidValuation(AssetId),

    #[error("Commit conflict on {asset} for {account}: concurrent change left insufficient balance")]
    CommitConflict { asset: AssetId, account: Address },

    #[error("{0} is not a registered protocol account")]
    UnknownProtocol(Address),

    #[error("{account} is not the issuer of {asset}")]
    NotIssuer { asset: AssetId, account: Address },
}
