use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange-native identifier of a perpetual contract.
///
/// Treated as opaque by the engine. The only structure ever inspected is the
/// unified `BASE/QUOTE[:SETTLE]` form used when re-quoting unknown symbols.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(value: impl Into<String>) -> Self {
        Symbol(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base asset of a unified symbol (`BTC` for `BTC/USDT:USDT`), or the
    /// whole identifier when it carries no separator.
    pub fn base(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// Re-quote `BASE/QUOTE` as `BASE/ALT:ALT`.
    ///
    /// Returns `None` for identifiers not in the two-part unified form.
    pub fn with_alternate_quote(&self, alternate: &str) -> Option<Symbol> {
        let parts: Vec<&str> = self.0.split('/').collect();
        match parts.as_slice() {
            [base, _quote] if !base.is_empty() => {
                Some(Symbol(format!("{}/{}:{}", base, alternate, alternate)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_string())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_of_unified_and_native_symbols() {
        assert_eq!(Symbol::from("BTC/USDT:USDT").base(), "BTC");
        assert_eq!(Symbol::from("XBTUSDTM").base(), "XBTUSDTM");
    }

    #[test]
    fn alternate_quote_only_for_two_part_symbols() {
        assert_eq!(
            Symbol::from("ETH/USDT").with_alternate_quote("USDC"),
            Some(Symbol::from("ETH/USDC:USDC"))
        );
        assert_eq!(Symbol::from("ETHUSDTM").with_alternate_quote("USDC"), None);
        assert_eq!(Symbol::from("A/B/C").with_alternate_quote("USDC"), None);
    }
}
