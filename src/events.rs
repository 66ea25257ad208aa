use near_sdk::{bs58, env, AccountId, NearToken};

use crate::record::HtlcId;

// Helper for consistent logging
pub fn log_htlc_event(event: &str, id: &HtlcId, actor: &AccountId, amount: NearToken) {
    env::log_str(&format!(
        "HTLC_{}: id='{}', actor='{}', amount='{}'",
        event,
        bs58::encode(id).into_string(),
        actor,
        amount.as_yoctonear()
    ));
}
