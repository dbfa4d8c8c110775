//! Domain types for the ticketing ledger.
//!
//! Value objects (addresses, token amounts, proof hashes) and the persisted
//! record types (event, tier list, holding). The serde definition of each
//! record type is its storage schema; see `turnstile_core::codec`.

use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Length in bytes of a wire address.
pub const ADDRESS_LEN: usize = 20;

/// Fixed-length account identifier, as the token contract reports it.
///
/// Well-formedness (exact length) is enforced at construction, so an
/// `Address` held anywhere in the ledger is valid by type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Creates an address from an exact-size array.
    #[must_use]
    pub const fn from_array(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a byte slice, rejecting wrong lengths.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if `bytes` is not exactly
    /// [`ADDRESS_LEN`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LedgerError> {
        <[u8; ADDRESS_LEN]>::try_from(bytes).map(Self).map_err(|_| {
            LedgerError::Validation(format!(
                "address must be {ADDRESS_LEN} bytes, got {}",
                bytes.len()
            ))
        })
    }

    /// Parses an address from a hex string.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the string is not valid hex or
    /// decodes to the wrong length.
    pub fn from_hex(hex_str: &str) -> Result<Self, LedgerError> {
        let bytes = hex::decode(hex_str)
            .map_err(|err| LedgerError::Validation(format!("invalid address hex: {err}")))?;
        Self::from_slice(&bytes)
    }

    /// The raw address bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

/// Tier identifier: the tier's index in the tier list.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TierId(u32);

impl TierId {
    /// Creates a tier id from its list index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The tier's position in the tier list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Length in bytes of a buyer proof hash.
pub const PROOF_LEN: usize = 32;

/// Opaque buyer-supplied hash, compared bytewise during identity verification.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofHash([u8; PROOF_LEN]);

impl ProofHash {
    /// Creates a proof hash from an exact-size array.
    #[must_use]
    pub const fn from_array(bytes: [u8; PROOF_LEN]) -> Self {
        Self(bytes)
    }

    /// Creates a proof hash from a byte slice, rejecting wrong lengths.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if `bytes` is not exactly
    /// [`PROOF_LEN`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LedgerError> {
        <[u8; PROOF_LEN]>::try_from(bytes).map(Self).map_err(|_| {
            LedgerError::Validation(format!(
                "proof hash must be {PROOF_LEN} bytes, got {}",
                bytes.len()
            ))
        })
    }

    /// The raw hash bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PROOF_LEN] {
        &self.0
    }
}

impl fmt::Display for ProofHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ProofHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofHash({})", hex::encode(self.0))
    }
}

// ============================================================================
// Token Amount (smallest-unit based to avoid fractional arithmetic)
// ============================================================================

/// A token quantity in the token's smallest unit.
///
/// All ledger arithmetic happens in smallest units; conversion from whole
/// tokens multiplies by the decimal scale the token contract declares.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Creates an amount from raw smallest units.
    #[must_use]
    pub const fn from_raw(units: u64) -> Self {
        Self(units)
    }

    /// The zero amount.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Converts a whole-token amount using the token's decimal scale.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub const fn from_whole(whole: u64, scale: u64) -> Option<Self> {
        match whole.checked_mul(scale) {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }

    /// The amount in raw smallest units.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a count, returning `None` on overflow.
    #[must_use]
    pub const fn checked_mul(self, count: u32) -> Option<Self> {
        match self.0.checked_mul(count as u64) {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }

    /// Adds another amount, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Persisted Records
// ============================================================================

/// The single event record, created once by deploy and immutable afterward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Human-readable event name.
    pub name: String,
    /// Instant after which ticket sales are open.
    pub start_time: DateTime<Utc>,
    /// Total ticket slots announced for the event.
    pub total_ticket_slots: u32,
}

/// One ticket tier: a category of ticket with its own price and supply cap.
///
/// `sold` is the only field that changes after creation, and it only grows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRecord {
    /// Tier label, e.g. "VIP".
    pub label: String,
    /// Price per ticket in smallest token units.
    pub unit_price: TokenAmount,
    /// Supply cap for this tier.
    pub total_supply: u32,
    /// Tickets sold so far. Invariant: `sold <= total_supply`.
    pub sold: u32,
}

impl TierRecord {
    /// Creates a fresh tier with nothing sold.
    #[must_use]
    pub const fn new(label: String, unit_price: TokenAmount, total_supply: u32) -> Self {
        Self {
            label,
            unit_price,
            total_supply,
            sold: 0,
        }
    }

    /// Tickets still available in this tier.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.total_supply.saturating_sub(self.sold)
    }

    /// Whether `quantity` more tickets can be sold without breaching supply.
    #[must_use]
    pub const fn can_sell(&self, quantity: u32) -> bool {
        match self.sold.checked_add(quantity) {
            Some(total) => total <= self.total_supply,
            None => false,
        }
    }

    /// Records a sale of `quantity` tickets.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::SupplyExhausted` if the sale would exceed the
    /// supply cap; `sold` is left unchanged in that case.
    pub fn record_sale(&mut self, quantity: u32) -> Result<(), LedgerError> {
        if !self.can_sell(quantity) {
            return Err(LedgerError::SupplyExhausted {
                requested: quantity,
                remaining: self.remaining(),
            });
        }
        self.sold += quantity;
        Ok(())
    }
}

/// The ordered tier list, persisted as one record under a sentinel key.
///
/// The list is read, modified, and rewritten as a unit; callers serialize
/// those sequences on the tier-list lock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TierList(Vec<TierRecord>);

impl TierList {
    /// Creates an empty tier list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a tier, returning its id (its index).
    ///
    /// Duplicate labels are permitted and create a second, independent entry.
    pub fn push(&mut self, tier: TierRecord) -> TierId {
        self.0.push(tier);
        TierId::new((self.0.len() - 1) as u32)
    }

    /// Looks up a tier by id.
    #[must_use]
    pub fn get(&self, id: TierId) -> Option<&TierRecord> {
        self.0.get(id.index())
    }

    /// Looks up a tier by id for mutation.
    #[must_use]
    pub fn get_mut(&mut self, id: TierId) -> Option<&mut TierRecord> {
        self.0.get_mut(id.index())
    }

    /// Number of tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no tiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates tiers in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, TierRecord> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a TierList {
    type Item = &'a TierRecord;
    type IntoIter = std::slice::Iter<'a, TierRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A buyer's accumulated tickets and redemption flag for one tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Tickets held, accumulated across purchases.
    pub quantity: u32,
    /// Whether the holding has been redeemed for entry.
    pub used: bool,
}

impl Holding {
    /// Creates a fresh, unredeemed holding.
    #[must_use]
    pub const fn new(quantity: u32) -> Self {
        Self {
            quantity,
            used: false,
        }
    }
}

// ============================================================================
// Query Views
// ============================================================================

/// Per-tier availability snapshot returned by queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierStatus {
    /// Tier label.
    pub label: String,
    /// Price per ticket in smallest token units.
    pub unit_price: TokenAmount,
    /// Supply cap.
    pub total_supply: u32,
    /// Tickets still available.
    pub remaining: u32,
}

impl From<&TierRecord> for TierStatus {
    fn from(tier: &TierRecord) -> Self {
        Self {
            label: tier.label.clone(),
            unit_price: tier.unit_price,
            total_supply: tier.total_supply,
            remaining: tier.remaining(),
        }
    }
}

/// All-tiers snapshot as parallel sequences, one entry per tier in id order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketsInfo {
    /// Tier labels.
    pub labels: Vec<String>,
    /// Prices per ticket in smallest token units.
    pub prices: Vec<TokenAmount>,
    /// Supply caps.
    pub totals: Vec<u32>,
    /// Tickets still available.
    pub remaining: Vec<u32>,
}

impl From<&TierList> for TicketsInfo {
    fn from(tiers: &TierList) -> Self {
        let mut info = Self {
            labels: Vec::with_capacity(tiers.len()),
            prices: Vec::with_capacity(tiers.len()),
            totals: Vec::with_capacity(tiers.len()),
            remaining: Vec::with_capacity(tiers.len()),
        };
        for tier in tiers {
            info.labels.push(tier.label.clone());
            info.prices.push(tier.unit_price);
            info.totals.push(tier.total_supply);
            info.remaining.push(tier.remaining());
        }
        info
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use turnstile_core::codec;

    #[test]
    fn address_rejects_wrong_lengths() {
        assert!(Address::from_slice(&[0u8; 19]).is_err());
        assert!(Address::from_slice(&[0u8; 21]).is_err());
        assert!(Address::from_slice(&[0u8; 20]).is_ok());
    }

    #[test]
    fn address_hex_round_trips() {
        let addr = Address::from_array([0xab; ADDRESS_LEN]);
        assert_eq!(Address::from_hex(&addr.to_string()).unwrap(), addr);
    }

    #[test]
    fn proof_hash_compares_bytewise() {
        let a = ProofHash::from_array([1; PROOF_LEN]);
        let b = ProofHash::from_array([1; PROOF_LEN]);
        let c = ProofHash::from_array([2; PROOF_LEN]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn token_amount_checked_math() {
        let price = TokenAmount::from_raw(50);
        assert_eq!(price.checked_mul(3), Some(TokenAmount::from_raw(150)));
        assert_eq!(TokenAmount::from_raw(u64::MAX).checked_mul(2), None);
        assert_eq!(
            TokenAmount::from_raw(1).checked_add(TokenAmount::from_raw(2)),
            Some(TokenAmount::from_raw(3))
        );
    }

    #[test]
    fn whole_token_scaling() {
        assert_eq!(
            TokenAmount::from_whole(3, 100_000_000),
            Some(TokenAmount::from_raw(300_000_000))
        );
        assert_eq!(TokenAmount::from_whole(u64::MAX, 2), None);
    }

    #[test]
    fn tier_record_sale_respects_supply() {
        let mut tier = TierRecord::new("VIP".to_string(), TokenAmount::from_raw(50), 10);
        tier.record_sale(3).unwrap();
        assert_eq!(tier.sold, 3);
        assert_eq!(tier.remaining(), 7);

        let err = tier.record_sale(8).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::SupplyExhausted {
                requested: 8,
                remaining: 7
            }
        ));
        assert_eq!(tier.sold, 3);
    }

    #[test]
    fn tier_record_sale_overflow_is_supply_exhausted() {
        let mut tier = TierRecord::new("GA".to_string(), TokenAmount::from_raw(1), u32::MAX);
        tier.sold = u32::MAX - 1;
        assert!(tier.record_sale(5).is_err());
    }

    #[test]
    fn tier_list_push_assigns_sequential_ids() {
        let mut tiers = TierList::new();
        let first = tiers.push(TierRecord::new("A".into(), TokenAmount::from_raw(1), 1));
        let second = tiers.push(TierRecord::new("B".into(), TokenAmount::from_raw(2), 2));
        assert_eq!(first, TierId::new(0));
        assert_eq!(second, TierId::new(1));
        assert_eq!(tiers.get(TierId::new(2)), None);
    }

    #[test]
    fn tickets_info_mirrors_tier_order() {
        let mut tiers = TierList::new();
        tiers.push(TierRecord::new("VIP".into(), TokenAmount::from_raw(50), 10));
        let mut ga = TierRecord::new("GA".into(), TokenAmount::from_raw(10), 100);
        ga.sold = 40;
        tiers.push(ga);

        let info = TicketsInfo::from(&tiers);
        assert_eq!(info.labels, vec!["VIP".to_string(), "GA".to_string()]);
        assert_eq!(
            info.prices,
            vec![TokenAmount::from_raw(50), TokenAmount::from_raw(10)]
        );
        assert_eq!(info.totals, vec![10, 100]);
        assert_eq!(info.remaining, vec![10, 60]);
    }

    fn tier_strategy() -> impl Strategy<Value = TierRecord> {
        ("[a-zA-Z ]{1,16}", any::<u64>(), any::<u32>(), any::<u32>()).prop_map(
            |(label, price, a, b)| TierRecord {
                label,
                unit_price: TokenAmount::from_raw(price),
                total_supply: a.max(b),
                sold: a.min(b),
            },
        )
    }

    proptest! {
        #[test]
        fn tier_list_round_trips_through_codec(
            tiers in proptest::collection::vec(tier_strategy(), 0..8)
        ) {
            let mut list = TierList::new();
            for tier in tiers {
                list.push(tier);
            }
            let bytes = codec::encode(&list).unwrap();
            let back: TierList = codec::decode(&bytes).unwrap();
            prop_assert_eq!(back, list);
        }

        #[test]
        fn remaining_never_exceeds_supply(tier in tier_strategy()) {
            prop_assert!(tier.sold <= tier.total_supply);
            prop_assert_eq!(tier.remaining(), tier.total_supply - tier.sold);
        }
    }
}
