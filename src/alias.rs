//! Operator alias resolution.
//!
//! Operator tokens arrive in three flavors: canonical Unicode glyphs
//! ("⊕"), ASCII fallbacks usable from shells that choke on Unicode
//! ("opO", any case), and legacy spellings from older rule sets ("+O",
//! "oplus"). Resolution checks the tiers in that order; a legacy hit
//! still resolves but carries a migration warning. Tokens matching no
//! tier pass through verbatim — the registry lookup decides whether an
//! unknown operator is an error.

use std::collections::HashMap;
use std::fmt;

/// Migration warning produced when a legacy spelling is used.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyWarning {
    /// The spelling that was used.
    pub token: String,
    /// The suggested replacement spelling.
    pub hint: String,
    /// The canonical symbol the token was mapped to.
    pub symbol: String,
}

impl fmt::Display for LegacyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "legacy alias '{}' — use '{}' instead; mapping to '{}'",
            self.token, self.hint, self.symbol
        )
    }
}

/// Outcome of resolving one operator token.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Canonical symbol, or the input token unchanged if nothing matched.
    pub symbol: String,
    /// Present only when the legacy tier matched.
    pub warning: Option<LegacyWarning>,
}

/// The three-tier alias table.
pub struct AliasTable {
    /// Tier (a): exact matches, including Unicode self-maps.
    exact: HashMap<&'static str, &'static str>,
    /// Tier (b): matched against the lowercased token.
    folded: HashMap<&'static str, &'static str>,
    /// Tier (c): legacy spellings, matched exactly, with a suggested
    /// replacement alongside the symbol.
    legacy: HashMap<&'static str, (&'static str, &'static str)>,
}

impl AliasTable {
    pub fn new() -> Self {
        let exact: HashMap<&str, &str> = [
            // Unicode self-maps
            ("⊕", "⊕"),
            ("⊗", "⊗"),
            ("◇", "◇"),
            ("τ", "τ"),
            ("♠", "♠"),
            ("○", "○"),
            ("⊂", "⊂"),
            ("Δ", "Δ"),
            ("χ", "χ"),
        ]
        .into_iter()
        .collect();

        // ASCII fallbacks, keyed lowercase; the recommended spellings are
        // opO/otO/maO/thO/buO and ovO/niO/diO/coO but any case resolves.
        let folded: HashMap<&str, &str> = [
            ("opo", "⊕"),
            ("oto", "⊗"),
            ("mao", "◇"),
            ("tho", "τ"),
            ("buo", "♠"),
            ("ovo", "○"),
            ("nio", "⊂"),
            ("dio", "Δ"),
            ("coo", "χ"),
        ]
        .into_iter()
        .collect();

        // Old spellings still found in circulating rule sets and prompts.
        let legacy: HashMap<&str, (&str, &str)> = [
            ("+O", ("⊕", "opO")),
            ("O+", ("⊕", "opO")),
            ("oplus", ("⊕", "opO")),
            ("OPLUS", ("⊕", "opO")),
            ("*O", ("⊗", "otO")),
            ("O*", ("⊗", "otO")),
            ("otimes", ("⊗", "otO")),
            ("OTIMES", ("⊗", "otO")),
            ("mO", ("◇", "maO")),
            ("tO", ("τ", "thO")),
            ("sO", ("♠", "buO")),
            ("oO", ("○", "ovO")),
            ("nO", ("⊂", "niO")),
            ("dO", ("Δ", "diO")),
            ("cO", ("χ", "coO")),
        ]
        .into_iter()
        .collect();

        Self { exact, folded, legacy }
    }

    /// Canonicalize one operator token. Never fails: an unmatched token is
    /// returned as-is and rejected (or not) by the caller's lookup.
    pub fn resolve(&self, token: &str) -> Resolution {
        let token = token.trim();

        if let Some(symbol) = self.exact.get(token) {
            return Resolution { symbol: symbol.to_string(), warning: None };
        }

        let lowered = token.to_lowercase();
        if let Some(symbol) = self.folded.get(lowered.as_str()) {
            return Resolution { symbol: symbol.to_string(), warning: None };
        }

        if let Some((symbol, hint)) = self.legacy.get(token) {
            return Resolution {
                symbol: symbol.to_string(),
                warning: Some(LegacyWarning {
                    token: token.to_string(),
                    hint: hint.to_string(),
                    symbol: symbol.to_string(),
                }),
            };
        }

        Resolution { symbol: token.to_string(), warning: None }
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new()
    }
}
