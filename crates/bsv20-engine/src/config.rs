//! Protocol configuration and amount arithmetic.
//!
//! The configuration is fetched once from the service, validated, and
//! then treated as immutable: every engine operation takes it by
//! reference, so there is no global cache and no first-call race inside
//! the engine itself.

use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use bsv20_script::Network;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Decimal precision beyond which amounts stop being representable in
/// 64-bit atomic units for any plausible supply.
const MAX_DECIMALS: u8 = 18;

/// One protocol fee rule: transfers whose atomic total falls in
/// `[min, max]` pay `fee` atomic units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTier {
    /// Inclusive lower bound of the tier, in atomic units.
    pub min: u64,
    /// Inclusive upper bound of the tier, in atomic units.
    pub max: u64,
    /// Fee charged for totals in this tier, in atomic units.
    pub fee: u64,
}

/// The service-published protocol configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// The token this engine instance operates on.
    pub token_id: String,
    /// Compressed public key (hex) every transfer output must be
    /// cosigned by.
    pub cosigner_pubkey: String,
    /// Address collecting protocol fees.
    pub fee_address: String,
    /// The network's canonical mint address.
    pub mint_address: String,
    /// Transfers to this address burn tokens and pay no fee.
    pub burn_address: String,
    /// Decimal places of the human-readable unit.
    pub decimals: u8,
    /// Ordered, non-overlapping fee tiers.
    pub fee_tiers: Vec<FeeTier>,
    /// Further service-operated addresses whose spends count as mints.
    #[serde(default)]
    pub service_addresses: Vec<String>,
    /// Network for address rendering; mainnet unless stated.
    #[serde(default)]
    pub network: Network,
}

impl ProtocolConfig {
    /// Check structural invariants the rest of the engine relies on.
    ///
    /// Tiers must be ascending and non-overlapping with `min <= max`,
    /// decimals must be representable, and the cosigner key must decode
    /// to a 33-byte compressed point.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.decimals > MAX_DECIMALS {
            return Err(EngineError::ConfigUnavailable(format!(
                "decimals {} exceeds maximum {}",
                self.decimals, MAX_DECIMALS
            )));
        }

        self.cosigner()?;

        let mut prev_max: Option<u64> = None;
        for tier in &self.fee_tiers {
            if tier.min > tier.max {
                return Err(EngineError::ConfigUnavailable(format!(
                    "fee tier [{}, {}] is inverted",
                    tier.min, tier.max
                )));
            }
            if let Some(prev) = prev_max {
                if tier.min <= prev {
                    return Err(EngineError::ConfigUnavailable(format!(
                        "fee tier [{}, {}] overlaps or disorders the previous tier",
                        tier.min, tier.max
                    )));
                }
            }
            prev_max = Some(tier.max);
        }
        Ok(())
    }

    /// The cosigner key as raw compressed bytes.
    pub fn cosigner(&self) -> Result<[u8; 33], EngineError> {
        let bytes = hex::decode(&self.cosigner_pubkey).map_err(|e| {
            EngineError::ConfigUnavailable(format!("cosigner key is not hex: {e}"))
        })?;
        if bytes.len() != 33 {
            return Err(EngineError::ConfigUnavailable(format!(
                "cosigner key is {} bytes, expected 33",
                bytes.len()
            )));
        }
        let mut out = [0u8; 33];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// The protocol fee for an atomic transfer total.
    ///
    /// Transfers to the burn address pay no fee; otherwise exactly one
    /// tier must contain the total.
    pub fn fee_for(&self, atomic_total: u64, targets_burn: bool) -> Result<u64, EngineError> {
        if targets_burn {
            return Ok(0);
        }
        self.fee_tiers
            .iter()
            .find(|t| t.min <= atomic_total && atomic_total <= t.max)
            .map(|t| t.fee)
            .ok_or(EngineError::FeeRangeInadequate(atomic_total))
    }

    /// Convert a human-decimal amount string to atomic units.
    ///
    /// Fails closed: non-numeric input, negative values, and fractions
    /// finer than `decimals` are all `InvalidAmount`, as is anything
    /// that overflows 64 bits.
    pub fn to_atomic(&self, amount: &str) -> Result<u64, EngineError> {
        let scale = self.atomic_scale()?;
        let decimal = BigDecimal::from_str(amount.trim())
            .map_err(|_| EngineError::InvalidAmount(format!("not a number: {amount:?}")))?;
        if decimal.sign() == bigdecimal::num_bigint::Sign::Minus {
            return Err(EngineError::InvalidAmount(format!(
                "negative amount: {amount}"
            )));
        }

        let scaled = decimal * BigDecimal::from(scale);
        if !scaled.is_integer() {
            return Err(EngineError::InvalidAmount(format!(
                "{amount} is finer than {} decimal places",
                self.decimals
            )));
        }
        scaled.to_u64().ok_or_else(|| {
            EngineError::InvalidAmount(format!("{amount} overflows atomic units"))
        })
    }

    /// Render an atomic amount in the human-readable decimal unit.
    ///
    /// Falls back to the raw atomic figure if the configured decimals
    /// are out of range.
    pub fn to_decimal(&self, atomic: u64) -> String {
        match self.atomic_scale() {
            Ok(1) => atomic.to_string(),
            Ok(scale) => {
                let value = BigDecimal::from(atomic) / BigDecimal::from(scale);
                value.normalized().to_string()
            }
            Err(_) => atomic.to_string(),
        }
    }

    /// `10^decimals`, guarded against out-of-range configurations.
    fn atomic_scale(&self) -> Result<u64, EngineError> {
        if self.decimals > MAX_DECIMALS {
            return Err(EngineError::ConfigUnavailable(format!(
                "decimals {} exceeds maximum {}",
                self.decimals, MAX_DECIMALS
            )));
        }
        Ok(10u64.pow(self.decimals as u32))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use bsv20_script::Address;

    /// A deterministic test address: the mainnet address of a constant
    /// 20-byte hash.
    pub(crate) fn test_address(fill: u8) -> String {
        Address::from_hash160([fill; 20], Network::Mainnet).text
    }

    pub(crate) fn sample_config() -> ProtocolConfig {
        ProtocolConfig {
            token_id: "f572b1_0".to_string(),
            cosigner_pubkey:
                "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798".to_string(),
            fee_address: test_address(0xfe),
            mint_address: test_address(0x01),
            burn_address: test_address(0xbb),
            decimals: 2,
            fee_tiers: vec![
                FeeTier { min: 1, max: 1_000, fee: 1 },
                FeeTier { min: 1_001, max: 1_000_000, fee: 100 },
            ],
            service_addresses: Vec::new(),
            network: Network::Mainnet,
        }
    }

    // -----------------------------------------------------------------------
    // validation
    // -----------------------------------------------------------------------

    /// A well-formed config validates.
    #[test]
    fn valid_config() {
        assert!(sample_config().validate().is_ok());
    }

    /// Overlapping tiers are rejected.
    #[test]
    fn overlapping_tiers_rejected() {
        let mut config = sample_config();
        config.fee_tiers[1].min = 500;
        assert!(config.validate().is_err());
    }

    /// An inverted tier is rejected.
    #[test]
    fn inverted_tier_rejected() {
        let mut config = sample_config();
        config.fee_tiers[0] = FeeTier { min: 10, max: 5, fee: 1 };
        assert!(config.validate().is_err());
    }

    /// A cosigner key of the wrong length is rejected.
    #[test]
    fn short_cosigner_rejected() {
        let mut config = sample_config();
        config.cosigner_pubkey = "0279be".to_string();
        assert!(config.validate().is_err());
    }

    // -----------------------------------------------------------------------
    // fee tiers
    // -----------------------------------------------------------------------

    /// Every amount inside a tier maps to that tier's fee, and tier
    /// boundaries are inclusive on both ends.
    #[test]
    fn fee_tier_coverage() {
        let config = sample_config();
        assert_eq!(config.fee_for(1, false).expect("ok"), 1);
        assert_eq!(config.fee_for(1_000, false).expect("ok"), 1);
        assert_eq!(config.fee_for(1_001, false).expect("ok"), 100);
        assert_eq!(config.fee_for(1_000_000, false).expect("ok"), 100);
    }

    /// Amounts outside every tier are FeeRangeInadequate.
    #[test]
    fn fee_out_of_range() {
        let config = sample_config();
        assert!(matches!(
            config.fee_for(1_000_001, false),
            Err(EngineError::FeeRangeInadequate(1_000_001))
        ));
        assert!(config.fee_for(0, false).is_err());
    }

    /// Burn transfers pay no fee regardless of amount.
    #[test]
    fn burn_pays_no_fee() {
        let config = sample_config();
        assert_eq!(config.fee_for(999_999_999, true).expect("ok"), 0);
    }

    /// Exactly one tier matches every covered amount.
    #[test]
    fn tiers_disjoint() {
        let config = sample_config();
        for amount in [1u64, 999, 1_000, 1_001, 999_999, 1_000_000] {
            let matches = config
                .fee_tiers
                .iter()
                .filter(|t| t.min <= amount && amount <= t.max)
                .count();
            assert_eq!(matches, 1, "amount {amount} matched {matches} tiers");
        }
    }

    // -----------------------------------------------------------------------
    // amount conversion
    // -----------------------------------------------------------------------

    /// Decimal strings convert at the configured precision.
    #[test]
    fn to_atomic_conversions() {
        let config = sample_config();
        assert_eq!(config.to_atomic("1").expect("ok"), 100);
        assert_eq!(config.to_atomic("0.01").expect("ok"), 1);
        assert_eq!(config.to_atomic("5000.00").expect("ok"), 500_000);
        assert_eq!(config.to_atomic("0").expect("ok"), 0);
    }

    /// Excess precision, negatives, and garbage all fail closed.
    #[test]
    fn to_atomic_rejects() {
        let config = sample_config();
        assert!(config.to_atomic("0.001").is_err());
        assert!(config.to_atomic("-1").is_err());
        assert!(config.to_atomic("ten").is_err());
        assert!(config.to_atomic("").is_err());
    }

    /// Atomic amounts render back as normalized decimals.
    #[test]
    fn to_decimal_rendering() {
        let config = sample_config();
        assert_eq!(config.to_decimal(100), "1");
        assert_eq!(config.to_decimal(1), "0.01");
        assert_eq!(config.to_decimal(500_000), "5000");
    }

    /// Conversion round-trips through the decimal rendering.
    #[test]
    fn conversion_roundtrip() {
        let config = sample_config();
        for atomic in [1u64, 99, 100, 12_345, 500_000] {
            let rendered = config.to_decimal(atomic);
            assert_eq!(config.to_atomic(&rendered).expect("ok"), atomic);
        }
    }
}
