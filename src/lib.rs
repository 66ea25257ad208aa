use near_sdk::json_types::{Base58CryptoHash, Base64VecU8, U128};
use near_sdk::{
    bs58, env, ext_contract, near, serde_json, AccountId, CryptoHash, NearToken, Promise,
    PromiseError, PromiseOrValue, Timestamp,
};

mod error;
mod events;
mod record;
mod store;

pub use error::HtlcError;
pub use record::{Asset, CreateMsg, HtlcId, HtlcRecord};
pub use store::HtlcStore;

use error::{abort, check};
use events::log_htlc_event;

// External contract interfaces
#[ext_contract(ext_fungible_token)]
pub trait FungibleToken {
    fn ft_transfer(&mut self, receiver_id: AccountId, amount: U128, memo: Option<String>);
}

#[ext_contract(ext_self)]
pub trait SelfCallbacks {
    fn on_htlc_settled(&mut self, key: u64);
}

// Define the contract structure
#[near(contract_state)]
pub struct Contract {
    // All HTLC records, addressable by sequence key and by content id
    pub htlcs: HtlcStore,
}

impl Default for Contract {
    fn default() -> Self {
        Self {
            htlcs: HtlcStore::new(),
        }
    }
}

// Implement the contract structure
#[near]
impl Contract {
    #[init]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an HTLC over native NEAR. The attached deposit is the locked
    /// amount and the predecessor is the sender, so custody moves to the
    /// contract account atomically with this call. Returns the content id
    /// the counterparty later withdraws against.
    #[payable]
    pub fn create(
        &mut self,
        receiver: AccountId,
        hashlock: Base58CryptoHash,
        timelock: Timestamp,
    ) -> Base58CryptoHash {
        let sender = env::predecessor_account_id();
        let amount = env::attached_deposit();
        check(amount.as_yoctonear() > 0, HtlcError::InvalidAmount);

        let id = self.open_htlc(
            sender,
            receiver,
            Asset::Native,
            amount,
            hashlock.into(),
            timelock,
        );
        id.into()
    }

    /// NEP-141 receiver hook: opens an HTLC over the calling token
    /// contract's asset. The tokens are already in custody when this runs;
    /// aborting makes the token contract return them to `sender_id`, so a
    /// rejected deposit leaves no record behind.
    pub fn ft_on_transfer(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        msg: String,
    ) -> PromiseOrValue<U128> {
        let token_id = env::predecessor_account_id();
        let params: CreateMsg =
            serde_json::from_str(&msg).expect("Invalid msg format for HTLC creation");
        check(amount.0 > 0, HtlcError::InvalidAmount);

        self.open_htlc(
            sender_id,
            params.receiver,
            Asset::Ft(token_id),
            NearToken::from_yoctonear(amount.0),
            params.hashlock.into(),
            params.timelock,
        );

        // The full amount stays in escrow.
        PromiseOrValue::Value(U128(0))
    }

    /// Claims an active HTLC by revealing the preimage of its hashlock.
    /// Only the receiver may claim, and only strictly before the timelock.
    pub fn withdraw(&mut self, id: Base58CryptoHash, preimage: Base64VecU8) -> Promise {
        let id: HtlcId = id.into();
        let preimage = preimage.0;
        let record = match self.htlcs.get_by_id(&id) {
            Some(record) => record.clone(),
            None => abort(HtlcError::NotFound),
        };

        let caller = env::predecessor_account_id();
        check(caller == record.receiver, HtlcError::Unauthorized);
        // Expiry is checked ahead of terminality: past the timelock only a
        // refund is permitted, whatever state the record is in.
        check(
            !record.is_expired(env::block_timestamp()),
            HtlcError::Expired,
        );
        check(!record.is_settled(), HtlcError::AlreadySettled);
        check(record.matches_hashlock(&preimage), HtlcError::InvalidPreimage);

        self.htlcs.update(record.key, |rec| {
            rec.preimage = preimage;
            rec.withdrawn = true;
        });

        log_htlc_event("WITHDRAWN", &id, &caller, record.amount);
        let recipient = record.receiver.clone();
        self.settle(&record, recipient)
    }

    /// Refunds an expired, unclaimed HTLC to its sender. Only the sender
    /// may refund, and only from the timelock instant on.
    pub fn refund(&mut self, id: Base58CryptoHash) -> Promise {
        let id: HtlcId = id.into();
        let record = match self.htlcs.get_by_id(&id) {
            Some(record) => record.clone(),
            None => abort(HtlcError::NotFound),
        };

        let caller = env::predecessor_account_id();
        check(caller == record.sender, HtlcError::Unauthorized);
        check(
            record.is_expired(env::block_timestamp()),
            HtlcError::NotYetExpired,
        );
        check(!record.is_settled(), HtlcError::AlreadySettled);

        self.htlcs.update(record.key, |rec| rec.refunded = true);

        log_htlc_event("REFUNDED", &id, &caller, record.amount);
        let recipient = record.sender.clone();
        self.settle(&record, recipient)
    }

    // --- PRIVATE CALLBACKS ---

    /// Completes a settlement. A failed transfer rolls the record back to
    /// active so another attempt can be made.
    #[private]
    pub fn on_htlc_settled(
        &mut self,
        #[callback_result] result: Result<(), PromiseError>,
        key: u64,
    ) {
        let record = match self.htlcs.get(key) {
            Some(record) => record.clone(),
            None => return,
        };

        if result.is_ok() {
            log_htlc_event(
                "SETTLED",
                &record.id,
                &env::current_account_id(),
                record.amount,
            );
            return;
        }

        self.htlcs.update(key, |rec| {
            rec.withdrawn = false;
            rec.refunded = false;
            rec.preimage.clear();
        });
        env::log_str(&format!(
            "HTLC_SETTLEMENT_FAILED: id='{}', reverted to active: {}",
            bs58::encode(&record.id).into_string(),
            HtlcError::TransferRejected.message()
        ));
    }

    // --- INTERNAL HELPERS ---

    /// Shared creation path: validates the commitment, builds the record,
    /// and stores it under a fresh sequence key.
    fn open_htlc(
        &mut self,
        sender: AccountId,
        receiver: AccountId,
        asset: Asset,
        amount: NearToken,
        hashlock: CryptoHash,
        timelock: Timestamp,
    ) -> HtlcId {
        check(timelock > env::block_timestamp(), HtlcError::InvalidTimelock);

        let record = HtlcRecord::new(sender.clone(), receiver, asset, amount, hashlock, timelock);
        check(
            !self.htlcs.contains_id(&record.id),
            HtlcError::DuplicateContract,
        );

        let id = record.id;
        self.htlcs.insert(record);
        log_htlc_event("CREATED", &id, &sender, amount);
        id
    }

    /// Issues the escrow-release transfer and chains the settlement
    /// callback behind it.
    fn settle(&self, record: &HtlcRecord, recipient: AccountId) -> Promise {
        let transfer = match &record.asset {
            Asset::Native => Promise::new(recipient).transfer(record.amount),
            Asset::Ft(token_id) => ext_fungible_token::ext(token_id.clone())
                .with_attached_deposit(NearToken::from_yoctonear(1))
                .with_static_gas(env::prepaid_gas().saturating_div(4))
                .ft_transfer(recipient, U128(record.amount.as_yoctonear()), None),
        };
        transfer.then(
            ext_self::ext(env::current_account_id())
                .with_static_gas(env::prepaid_gas().saturating_div(4))
                .on_htlc_settled(record.key),
        )
    }
}
