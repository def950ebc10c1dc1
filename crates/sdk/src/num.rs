//! Conversion between decimal token amounts and on-chain base units.

use alloy::primitives::{
    U256,
    utils::{format_units, parse_units},
};

use crate::error::{AlkahestError, Result};

/// Converter of decimal amounts <-> base units of a token with the given
/// number of decimals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Converter {
    decimals: u8,
}

impl Converter {
    pub const fn new(decimals: u8) -> Self { Self { decimals } }

    /// Native token of EVM chains, 18 decimals.
    pub const fn native() -> Self { Self::new(18) }

    pub fn decimals(&self) -> u8 { self.decimals }

    /// Converts decimal amount, e.g. `"1.25"`, to base units.
    ///
    /// Amounts more precise than the token allows are rejected rather than
    /// rounded.
    pub fn to_unsigned(&self, amount: &str) -> Result<U256> {
        let amount = amount.trim();
        let invalid = || AlkahestError::InvalidArgument(format!("invalid amount: '{amount}'"));
        let (int, frac) = amount.split_once('.').unwrap_or((amount, ""));
        if int.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > usize::from(self.decimals) {
            return Err(AlkahestError::InvalidArgument(format!(
                "amount '{amount}' has more than {} fractional digits",
                self.decimals
            )));
        }
        let int = if int.is_empty() { "0" } else { int };
        let normalized = if frac.is_empty() { int.to_string() } else { format!("{int}.{frac}") };
        Ok(parse_units(&normalized, self.decimals)?.get_absolute())
    }

    /// Converts base units to decimal amount without insignificant zeros.
    pub fn from_unsigned(&self, amount: U256) -> Result<String> {
        let formatted = format_units(amount, self.decimals)?;
        if !formatted.contains('.') {
            return Ok(formatted);
        }
        Ok(formatted.trim_end_matches('0').trim_end_matches('.').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_unsigned() {
        let usdc = Converter::new(6);
        assert_eq!(usdc.to_unsigned("1.5").unwrap(), U256::from(1_500_000));
        assert_eq!(usdc.to_unsigned(" 42 ").unwrap(), U256::from(42_000_000));
        assert!(usdc.to_unsigned("-1").is_err());
        assert!(usdc.to_unsigned("").is_err());
        assert!(usdc.to_unsigned("one").is_err());
        assert_eq!(usdc.to_unsigned(".5").unwrap(), U256::from(500_000));
        assert_eq!(usdc.to_unsigned("2.").unwrap(), U256::from(2_000_000));

        assert_eq!(
            Converter::native().to_unsigned("0.001").unwrap(),
            U256::from(1_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_to_unsigned_rejects_truncation() {
        let usdc = Converter::new(6);
        assert!(matches!(
            usdc.to_unsigned("0.0000009"),
            Err(AlkahestError::InvalidArgument(_))
        ));
        assert!(usdc.to_unsigned("1.0000009").is_err());
        assert_eq!(usdc.to_unsigned("1.000001").unwrap(), U256::from(1_000_001));
        assert!(Converter::new(0).to_unsigned("1.5").is_err());
        assert_eq!(Converter::new(0).to_unsigned("15").unwrap(), U256::from(15));
    }

    #[test]
    fn test_to_unsigned_rejects_missing_digits() {
        let usdc = Converter::new(6);
        assert!(matches!(usdc.to_unsigned("."), Err(AlkahestError::InvalidArgument(_))));
        assert!(usdc.to_unsigned(" . ").is_err());
        assert!(usdc.to_unsigned("1.2.3").is_err());
        assert!(usdc.to_unsigned("+1").is_err());
        assert!(usdc.to_unsigned("1e6").is_err());
    }

    #[test]
    fn test_from_unsigned() {
        let usdc = Converter::new(6);
        assert_eq!(usdc.from_unsigned(U256::from(1_500_000)).unwrap(), "1.5");
        assert_eq!(usdc.from_unsigned(U256::from(2_000_000)).unwrap(), "2");
        assert_eq!(usdc.from_unsigned(U256::from(1)).unwrap(), "0.000001");
        assert_eq!(Converter::new(0).from_unsigned(U256::from(7)).unwrap(), "7");
    }
}
