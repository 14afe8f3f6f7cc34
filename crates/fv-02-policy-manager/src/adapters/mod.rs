//! # Adapters Layer
//!
//! Built-in policy implementations.

pub mod address_lists;
pub mod max_concentration;
pub mod min_max_investment;

pub use address_lists::*;
pub use max_concentration::*;
pub use min_max_investment::*;

use crate::ports::outbound::Policy;
use std::sync::Arc;

/// Every built-in policy, in a stable registration order.
#[must_use]
pub fn builtin_policies() -> Vec<Arc<dyn Policy>> {
    vec![
        Arc::new(AddressListPolicy::asset_blacklist()),
        Arc::new(AddressListPolicy::asset_whitelist()),
        Arc::new(AddressListPolicy::adapter_blacklist()),
        Arc::new(AddressListPolicy::adapter_whitelist()),
        Arc::new(AddressListPolicy::investor_whitelist()),
        Arc::new(AddressListPolicy::buy_shares_caller_whitelist()),
        Arc::new(MinMaxInvestmentPolicy),
        Arc::new(MaxConcentrationPolicy),
    ]
}
