//! The OPLAW rule engine — directive application and expression evaluation.
//!
//! Directive text mutates a registry of operator specs; expressions of the
//! form `a OP b` are then evaluated against it:
//!
//! ```text
//! DEFINE  ⊕ WITH (a-1)*(a-2)/2 + 1
//! SELECT  ⊗ WITH { a+b ; a*b } USING ORIENTATION +
//! DISABLE ⊗
//! ```
//!
//! Each engine instance owns an independent registry; nothing is shared
//! and nothing persists between instances.

use std::collections::HashMap;

use crate::alias::{AliasTable, LegacyWarning};
use crate::errors::{OplawError, Result};
use crate::law::{Law, Value};

/// Which law a multi-law spec selects: `+` the first, `-` the last.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Orientation {
    Plus,
    Minus,
}

impl Orientation {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Self::Plus),
            "-" => Some(Self::Minus),
            _ => None,
        }
    }
}

/// Registered behavior of one operator. Exactly one shape holds at a
/// time; REPLACE on a multi-law spec collapses it back to a single law.
#[derive(Clone, Debug)]
pub enum OpSpec {
    Single {
        law: Law,
        enabled: bool,
    },
    Multi {
        laws: Vec<Law>,
        orientation: Orientation,
        enabled: bool,
    },
}

impl OpSpec {
    pub fn enabled(&self) -> bool {
        match self {
            Self::Single { enabled, .. } | Self::Multi { enabled, .. } => *enabled,
        }
    }

    fn set_enabled(&mut self, value: bool) {
        match self {
            Self::Single { enabled, .. } | Self::Multi { enabled, .. } => *enabled = value,
        }
    }
}

pub struct RuleEngine {
    ops: HashMap<String, OpSpec>,
    aliases: AliasTable,
    warnings: Vec<LegacyWarning>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            ops: HashMap::new(),
            aliases: AliasTable::new(),
            warnings: Vec::new(),
        }
    }

    /// Apply a block of directives, one per line. Blank lines and lines
    /// starting with `#` are dropped; lines whose first word is not a
    /// directive keyword are silently ignored.
    pub fn load_rules(&mut self, text: &str) -> Result<()> {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let keyword = line.split_whitespace().next().unwrap_or("");
            match keyword.to_uppercase().as_str() {
                "DEFINE" => self.directive_define(line)?,
                "REPLACE" => self.directive_replace(line)?,
                "DELETE" => self.directive_delete(line)?,
                "ENABLE" => self.directive_enable(line, true)?,
                "DISABLE" => self.directive_enable(line, false)?,
                "SELECT" => self.directive_select(line)?,
                _ => {} // tolerated, not an error
            }
        }
        Ok(())
    }

    /// Evaluate a single `a OP b` expression against the registry.
    pub fn evaluate(&mut self, expr: &str) -> Result<Value> {
        let tokens: Vec<&str> = expr.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(OplawError::MalformedExpression(format!(
                "expression must be 'a OP b' with spaces, e.g. '3 ⊕ 7': {expr}"
            )));
        }

        let a: f64 = tokens[0].parse().map_err(|_| {
            OplawError::NonNumericOperand(format!("left operand '{}' is not numeric", tokens[0]))
        })?;
        let b: f64 = tokens[2].parse().map_err(|_| {
            OplawError::NonNumericOperand(format!("right operand '{}' is not numeric", tokens[2]))
        })?;

        let op_token = tokens[1];
        let symbol = self.resolve(op_token);

        let spec = match self.ops.get(&symbol) {
            Some(spec) if spec.enabled() => spec,
            _ => {
                return Err(OplawError::UndefinedOrDisabledOperation(format!(
                    "operation '{op_token}' is not defined or disabled"
                )));
            }
        };

        match spec {
            OpSpec::Single { law, .. } => Ok(law.apply(a, b)),
            OpSpec::Multi { laws, orientation, .. } => {
                let law = match orientation {
                    Orientation::Plus => laws.first(),
                    Orientation::Minus => laws.last(),
                };
                match law {
                    Some(law) => Ok(law.apply(a, b)),
                    // Unreachable through directives; guards an engine bug.
                    None => Err(OplawError::MalformedOperationSpec(format!(
                        "multi-law spec for '{symbol}' holds no laws"
                    ))),
                }
            }
        }
    }

    /// Legacy-alias warnings accumulated since the last drain.
    pub fn take_warnings(&mut self) -> Vec<LegacyWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Registry view for reporting: (symbol, law count, enabled).
    pub fn operations(&self) -> Vec<(&str, usize, bool)> {
        let mut entries: Vec<(&str, usize, bool)> = self
            .ops
            .iter()
            .map(|(symbol, spec)| match spec {
                OpSpec::Single { enabled, .. } => (symbol.as_str(), 1, *enabled),
                OpSpec::Multi { laws, enabled, .. } => (symbol.as_str(), laws.len(), *enabled),
            })
            .collect();
        entries.sort_by_key(|(symbol, _, _)| symbol.to_string());
        entries
    }

    fn resolve(&mut self, token: &str) -> String {
        let resolution = self.aliases.resolve(token);
        if let Some(warning) = resolution.warning {
            self.warnings.push(warning);
        }
        resolution.symbol
    }

    // --- Directives ---

    fn directive_define(&mut self, line: &str) -> Result<()> {
        let (op_raw, law_src) = split_op_with(line)
            .ok_or_else(|| OplawError::BadDirective(format!("bad DEFINE: {line}")))?;
        let symbol = self.resolve(op_raw);
        let law = Law::compile(law_src)?;
        self.ops.insert(symbol, OpSpec::Single { law, enabled: true });
        Ok(())
    }

    fn directive_replace(&mut self, line: &str) -> Result<()> {
        let (op_raw, law_src) = split_op_with(line)
            .ok_or_else(|| OplawError::BadDirective(format!("bad REPLACE: {line}")))?;
        let symbol = self.resolve(op_raw);
        // REPLACE swaps the law only: a disabled operation stays disabled
        // until an explicit ENABLE.
        let enabled = match self.ops.get(&symbol) {
            Some(spec) => spec.enabled(),
            None => {
                return Err(OplawError::UnknownOperation(format!(
                    "REPLACE targets unknown operation '{op_raw}'"
                )));
            }
        };
        let law = Law::compile(law_src)?;
        // A multi-law spec collapses to a single law here.
        self.ops.insert(symbol, OpSpec::Single { law, enabled });
        Ok(())
    }

    fn directive_delete(&mut self, line: &str) -> Result<()> {
        let op_raw = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| OplawError::BadDirective(format!("bad DELETE: {line}")))?;
        let symbol = self.resolve(op_raw);
        self.ops.remove(&symbol); // absent is fine
        Ok(())
    }

    fn directive_enable(&mut self, line: &str, enable: bool) -> Result<()> {
        let op_raw = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| OplawError::BadDirective(format!("bad ENABLE/DISABLE: {line}")))?;
        let symbol = self.resolve(op_raw);
        match self.ops.get_mut(&symbol) {
            Some(spec) => {
                spec.set_enabled(enable);
                Ok(())
            }
            None => Err(OplawError::UnknownOperation(format!(
                "ENABLE/DISABLE targets unknown operation '{op_raw}'"
            ))),
        }
    }

    // SELECT <op> WITH { <law> ; <law> ... } USING ORIENTATION <+|->
    fn directive_select(&mut self, line: &str) -> Result<()> {
        let bad = || OplawError::BadDirective(format!("bad SELECT: {line}"));

        let (op_raw, rest) = split_op_with(line).ok_or_else(bad)?;
        let rest = rest.trim_start();
        let body = rest.strip_prefix('{').ok_or_else(bad)?;
        let (laws_blob, tail) = body.split_once('}').ok_or_else(bad)?;

        // Tail must read `USING ORIENTATION <+|->`, case-insensitively.
        let tail = tail.trim();
        let tail = strip_keyword(tail, "USING").ok_or_else(bad)?;
        let tail = strip_keyword(tail.trim_start(), "ORIENTATION").ok_or_else(bad)?;
        let orientation = Orientation::from_str(tail.trim()).ok_or_else(bad)?;

        let sources: Vec<&str> = laws_blob
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if sources.is_empty() {
            return Err(bad());
        }
        let laws = sources
            .into_iter()
            .map(Law::compile)
            .collect::<Result<Vec<Law>>>()?;

        let symbol = self.resolve(op_raw);
        self.ops.insert(symbol, OpSpec::Multi { laws, orientation, enabled: true });
        Ok(())
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `<KEYWORD> <op> WITH <rest>` around the first WITH (any case),
/// preserving the rest verbatim. A `{` glued to WITH stays in the rest,
/// so `SELECT ⊕ WITH{ ... }` parses. Returns (op, rest).
pub(crate) fn split_op_with(line: &str) -> Option<(&str, &str)> {
    let after_keyword = line.split_once(char::is_whitespace)?.1;
    let mut idx = 0;
    for word in after_keyword.split_whitespace() {
        let start = idx + after_keyword[idx..].find(word)?;
        let end = start + word.len();
        let with_len = if word.eq_ignore_ascii_case("WITH") {
            Some(word.len())
        } else if word.get(..4).map_or(false, |w| w.eq_ignore_ascii_case("WITH"))
            && word[4..].starts_with('{')
        {
            Some(4)
        } else {
            None
        };
        if let (Some(len), true) = (with_len, start > 0) {
            let op = after_keyword[..start].trim();
            let rest = after_keyword[start + len..].trim();
            if op.is_empty() || rest.is_empty() {
                return None;
            }
            return Some((op, rest));
        }
        idx = end;
    }
    None
}

/// Strip a leading keyword, case-insensitively. Returns the remainder.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    if text.len() >= keyword.len() && text[..keyword.len()].eq_ignore_ascii_case(keyword) {
        Some(&text[keyword.len()..])
    } else {
        None
    }
}
