use crate::address::Address;
use crate::error::DexError;
use crate::{
    BPS_DENOMINATOR, DEFAULT_FORWARD_DEADLINE_SECS, DEFAULT_FORWARD_FEE_BPS,
    DEFAULT_MAX_OUTPUT_BPS, DEFAULT_SWAP_FEE_BPS, MAX_FEE_BPS,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;

/// Serde adapter for u128 ↔ TOML: serialize as string, deserialize from string or integer.
/// TOML crate doesn't natively support u128, so we round-trip through strings.
mod u128_toml {
    use super::*;

    pub fn serialize<S: Serializer>(val: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        use serde::de::{self, Visitor};
        struct U128Visitor;

        impl<'de> Visitor<'de> for U128Visitor {
            type Value = u128;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a u128 as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                if v >= 0 {
                    Ok(v as u128)
                } else {
                    Err(E::custom("negative value for u128"))
                }
            }
        }

        d.deserialize_any(U128Visitor)
    }
}

fn default_swap_fee_bps() -> u128 {
    DEFAULT_SWAP_FEE_BPS
}

fn default_forward_fee_bps() -> u128 {
    DEFAULT_FORWARD_FEE_BPS
}

fn default_forward_deadline_secs() -> u64 {
    DEFAULT_FORWARD_DEADLINE_SECS
}

fn default_max_output_bps() -> u128 {
    DEFAULT_MAX_OUTPUT_BPS
}

/// Construction-time DEX parameters. Immutable once the contract is deployed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DexConfig {
    /// Only this identity may call `distribute_fees`
    pub owner: Address,
    /// Trusted Uniswap-V2-compatible router for the forwarding fallback
    pub router: Address,
    #[serde(default = "default_swap_fee_bps", with = "u128_toml")]
    pub swap_fee_bps: u128,
    #[serde(default = "default_forward_fee_bps", with = "u128_toml")]
    pub forward_fee_bps: u128,
    #[serde(default = "default_forward_deadline_secs")]
    pub forward_deadline_secs: u64,
    /// Largest share of `reserve_out` a single swap may take
    #[serde(default = "default_max_output_bps", with = "u128_toml")]
    pub max_output_bps: u128,
}

impl DexConfig {
    /// Config with default fees and bounds.
    pub fn new(owner: Address, router: Address) -> Self {
        Self {
            owner,
            router,
            swap_fee_bps: DEFAULT_SWAP_FEE_BPS,
            forward_fee_bps: DEFAULT_FORWARD_FEE_BPS,
            forward_deadline_secs: DEFAULT_FORWARD_DEADLINE_SECS,
            max_output_bps: DEFAULT_MAX_OUTPUT_BPS,
        }
    }

    /// Load DEX config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: DexConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load DEX config from environment variables.
    /// Owner and router are mandatory, everything else falls back to defaults.
    pub fn load_from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let owner: Address = std::env::var("SWAPEO_OWNER")
            .map_err(|_| "SWAPEO_OWNER not set")?
            .parse()?;
        let router: Address = std::env::var("SWAPEO_ROUTER")
            .map_err(|_| "SWAPEO_ROUTER not set")?
            .parse()?;

        let swap_fee_bps: u128 = std::env::var("SWAPEO_SWAP_FEE_BPS")
            .unwrap_or_else(|_| DEFAULT_SWAP_FEE_BPS.to_string())
            .parse()?;
        let forward_fee_bps: u128 = std::env::var("SWAPEO_FORWARD_FEE_BPS")
            .unwrap_or_else(|_| DEFAULT_FORWARD_FEE_BPS.to_string())
            .parse()?;
        let forward_deadline_secs: u64 = std::env::var("SWAPEO_FORWARD_DEADLINE_SECS")
            .unwrap_or_else(|_| DEFAULT_FORWARD_DEADLINE_SECS.to_string())
            .parse()?;
        let max_output_bps: u128 = std::env::var("SWAPEO_MAX_OUTPUT_BPS")
            .unwrap_or_else(|_| DEFAULT_MAX_OUTPUT_BPS.to_string())
            .parse()?;

        let config = Self {
            owner,
            router,
            swap_fee_bps,
            forward_fee_bps,
            forward_deadline_secs,
            max_output_bps,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save DEX config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DexError> {
        if self.owner.is_zero() {
            return Err(DexError::InvalidConfig("owner cannot be the zero address".into()));
        }
        if self.router.is_zero() {
            return Err(DexError::InvalidConfig("router cannot be the zero address".into()));
        }
        if self.swap_fee_bps > MAX_FEE_BPS {
            return Err(DexError::InvalidConfig(format!(
                "swap_fee_bps {} exceeds max {}",
                self.swap_fee_bps, MAX_FEE_BPS
            )));
        }
        if self.forward_fee_bps > MAX_FEE_BPS {
            return Err(DexError::InvalidConfig(format!(
                "forward_fee_bps {} exceeds max {}",
                self.forward_fee_bps, MAX_FEE_BPS
            )));
        }
        if self.max_output_bps == 0 || self.max_output_bps >= BPS_DENOMINATOR {
            return Err(DexError::InvalidConfig(format!(
                "max_output_bps must be in 1..{}",
                BPS_DENOMINATOR
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> DexConfig {
        DexConfig::new(Address::derive("owner"), Address::derive("router"))
    }

    #[test]
    fn test_defaults_validate() {
        let config = sample();
        assert_eq!(config.swap_fee_bps, 100);
        assert_eq!(config.forward_fee_bps, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = sample();
        config.owner = Address::ZERO;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.router = Address::ZERO;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.swap_fee_bps = 1_001;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.forward_fee_bps = 5_000;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.max_output_bps = 10_000;
        assert!(config.validate().is_err());
        config.max_output_bps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("swapeo.toml");

        let mut config = sample();
        config.swap_fee_bps = 30;
        config.save_to_file(&path).unwrap();
        let loaded = DexConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_defaults_when_omitted() {
        let owner = Address::derive("owner");
        let router = Address::derive("router");
        let text = format!("owner = \"{}\"\nrouter = \"{}\"\nswap_fee_bps = 250\n", owner, router);
        let config: DexConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.swap_fee_bps, 250);
        assert_eq!(config.forward_fee_bps, DEFAULT_FORWARD_FEE_BPS);
        assert_eq!(config.forward_deadline_secs, DEFAULT_FORWARD_DEADLINE_SECS);
        assert_eq!(config.max_output_bps, DEFAULT_MAX_OUTPUT_BPS);
    }
}
