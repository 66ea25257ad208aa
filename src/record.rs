use near_sdk::borsh::BorshSerialize;
use near_sdk::{
    env, json_types::Base58CryptoHash, near, AccountId, CryptoHash, NearToken, Timestamp,
};

// Content-derived identifier of an HTLC, the secondary lookup key.
pub type HtlcId = CryptoHash;

// NEP-141 Fungible Token or Native NEAR
#[near(serializers = [json, borsh])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Asset {
    Native,
    Ft(AccountId),
}

/// A single hashed-timelock escrow. `sender` locked `amount` of `asset`
/// for `receiver`, claimable against the preimage of `hashlock` strictly
/// before `timelock`, refundable to `sender` from `timelock` on.
#[near(serializers = [json, borsh])]
#[derive(Clone, Debug)]
pub struct HtlcRecord {
    /// Store-assigned sequence key, set on insert. Never reused.
    pub key: u64,
    pub id: HtlcId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub asset: Asset,
    pub amount: NearToken,
    pub hashlock: CryptoHash,
    /// Absolute expiry, nanoseconds since epoch.
    pub timelock: Timestamp,
    pub withdrawn: bool,
    pub refunded: bool,
    /// The revealed secret, empty until withdrawal.
    pub preimage: Vec<u8>,
}

// Message for ft_on_transfer to open an HTLC over a fungible token
#[near(serializers = [json, borsh])]
pub struct CreateMsg {
    pub receiver: AccountId,
    pub hashlock: Base58CryptoHash,
    pub timelock: Timestamp,
}

impl HtlcRecord {
    /// Builds a record with the state flags at their creation defaults and
    /// derives its id. `key` is assigned later by the store.
    pub fn new(
        sender: AccountId,
        receiver: AccountId,
        asset: Asset,
        amount: NearToken,
        hashlock: CryptoHash,
        timelock: Timestamp,
    ) -> Self {
        let mut record = Self {
            key: 0,
            id: [0u8; 32],
            sender,
            receiver,
            asset,
            amount,
            hashlock,
            timelock,
            withdrawn: false,
            refunded: false,
            preimage: Vec::new(),
        };
        record.id = record.derive_id();
        record
    }

    pub fn is_settled(&self) -> bool {
        self.withdrawn || self.refunded
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.timelock
    }

    pub fn matches_hashlock(&self, preimage: &[u8]) -> bool {
        env::sha256_array(preimage) == self.hashlock
    }

    /// Canonical byte encoding of the creation-time commitment: the
    /// immutable fields, borsh-serialized in declaration order. `key` and
    /// the mutable state never participate, so the id stays stable after
    /// settlement.
    fn commitment_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.sender
            .serialize(&mut buffer)
            .expect("Serialization failed");
        self.receiver
            .serialize(&mut buffer)
            .expect("Serialization failed");
        self.asset
            .serialize(&mut buffer)
            .expect("Serialization failed");
        self.amount
            .serialize(&mut buffer)
            .expect("Serialization failed");
        self.hashlock
            .serialize(&mut buffer)
            .expect("Serialization failed");
        self.timelock
            .serialize(&mut buffer)
            .expect("Serialization failed");
        buffer
    }

    fn derive_id(&self) -> HtlcId {
        env::sha256_array(&self.commitment_bytes())
    }
}
