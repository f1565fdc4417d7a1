//! Rule providers — external collaborators that turn a problem statement
//! into a `{dsl, evals, final}` bundle.
//!
//! The engine only needs the bundle shape; how it was produced (canned
//! rules, a local model, a remote API) is the provider's business.
//! Remote providers tend to hand back messy payloads — JSON wrapped in
//! code fences or prose, `dsl` as a list of rule objects, evals wrapped
//! in stray quotes — so `sanitize_payload` normalizes raw text into a
//! clean bundle before anything reaches the directive parser.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::engine::split_op_with;
use crate::errors::{OplawError, Result};

/// What a provider returns: directive text, expressions worth evaluating,
/// and a prose explanation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SolveBundle {
    #[serde(default)]
    pub dsl: String,
    #[serde(default)]
    pub evals: Vec<String>,
    /// `final` in the wire format; renamed because `final` is reserved.
    #[serde(default, rename = "final")]
    pub final_answer: String,
}

pub trait RuleProvider {
    fn solve(&self, problem: &str) -> Result<SolveBundle>;
}

// ---------------------------------------------------------------------------
// Payload sanitizing
// ---------------------------------------------------------------------------

/// Pull the JSON object out of raw provider text: already-clean JSON,
/// a ```json fenced block, or the outermost `{...}` span in prose.
fn extract_inner_json(text: &str) -> &str {
    if serde_json::from_str::<Json>(text).is_ok() {
        return text;
    }
    if let Some(fence) = text.find("```") {
        let after = &text[fence + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner;
            }
        }
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return &text[start..=end];
        }
    }
    text
}

/// Normalize a raw provider payload into a bundle with `dsl` as directive
/// text, `evals` as clean expression strings, and `final` as prose.
pub fn sanitize_payload(raw: &str) -> Result<SolveBundle> {
    let value: Json = serde_json::from_str(extract_inner_json(raw))
        .map_err(|e| OplawError::BadPayload(format!("payload is not JSON: {e}")))?;

    let mut dsl = value.get("dsl").cloned().unwrap_or(Json::String(String::new()));
    let mut evals = value.get("evals").cloned().unwrap_or(Json::Array(Vec::new()));
    let mut final_answer = string_of(value.get("final"));

    // A dsl string that itself carries a fenced JSON object: unwrap it and
    // let its fields win where present.
    if let Json::String(ref s) = dsl {
        if s.contains("```") {
            if let Ok(inner) = serde_json::from_str::<Json>(extract_inner_json(s)) {
                if let Some(inner_dsl) = inner.get("dsl") {
                    dsl = inner_dsl.clone();
                }
                if let Some(inner_evals) = inner.get("evals") {
                    if inner_evals.as_array().map_or(false, |a| !a.is_empty()) {
                        evals = inner_evals.clone();
                    }
                }
                let inner_final = string_of(inner.get("final"));
                if !inner_final.is_empty() {
                    final_answer = inner_final;
                }
            }
        }
    }

    // A list-shaped dsl becomes DEFINE lines.
    let dsl = match dsl {
        Json::String(s) => s,
        Json::Array(items) => {
            let mut lines = Vec::new();
            for item in &items {
                if let Some((symbol, law)) = rule_parts(item) {
                    lines.push(format!("DEFINE {} WITH {}", normalize_symbol(&symbol), law));
                }
            }
            lines.join("\n")
        }
        _ => String::new(),
    };

    let evals = match evals {
        Json::Array(items) => items
            .iter()
            .filter_map(Json::as_str)
            .map(unquote)
            .filter(|e| !e.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    Ok(SolveBundle { dsl, evals, final_answer })
}

fn string_of(value: Option<&Json>) -> String {
    value.and_then(Json::as_str).unwrap_or("").to_string()
}

/// One list item is either `{"symbol": "⊕", "law": "..."}` or
/// `{"rule": "DEFINE ⊕ WITH ..."}`.
fn rule_parts(item: &Json) -> Option<(String, String)> {
    let symbol = string_of(item.get("symbol")).trim().to_string();
    let law = string_of(item.get("law")).trim().to_string();
    if !symbol.is_empty() && !law.is_empty() {
        return Some((symbol, law));
    }

    let rule = string_of(item.get("rule"));
    let rule = rule.trim();
    if rule.to_uppercase().starts_with("DEFINE") {
        let (op, expr) = split_op_with(rule)?;
        return Some((op.to_string(), expr.to_string()));
    }
    None
}

/// Symbol spellings that providers commonly emit instead of the glyph.
fn normalize_symbol(symbol: &str) -> &str {
    match symbol {
        "+" | "+O" | "O+" | "oplus" | "OPLUS" => "⊕",
        "*O" | "O*" | "otimes" | "OTIMES" => "⊗",
        other => other,
    }
}

fn unquote(expr: &str) -> String {
    let expr = expr.trim();
    if expr.len() >= 2 && expr.starts_with('\'') && expr.ends_with('\'') {
        expr[1..expr.len() - 1].to_string()
    } else {
        expr.to_string()
    }
}

// ---------------------------------------------------------------------------
// Mock provider
// ---------------------------------------------------------------------------

/// Canned bundles selected by problem keywords. No I/O, deterministic,
/// used by the CLI default and by the end-to-end tests.
pub struct MockProvider;

impl RuleProvider for MockProvider {
    fn solve(&self, problem: &str) -> Result<SolveBundle> {
        let p = problem.to_lowercase();

        // Part A: Harnack count, admissibility, margin, threshold, budget.
        if p.contains("harnack") || p.contains("admissib") || p.contains("part a") {
            return Ok(SolveBundle {
                dsl: [
                    "DEFINE ⊕ WITH ((a-1)*(a-2))/2 + 1",
                    "DEFINE ⊗ WITH 1 if b<=a else 0",
                    "DEFINE ◇ WITH a-b",
                    "DEFINE τ WITH 1 if (a-b) >= 2 else 0",
                    "DEFINE ♠ WITH math.floor((a+1)/3)",
                ]
                .join("\n"),
                evals: [
                    "6 ⊕ 6", "8 ⊕ 8", "11 ⊗ 10", "11 ⊗ 12",
                    "11 maO 10", "11 maO 12", "22 thO 20", "22 buO 0",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                final_answer:
                    "Part A: H(n), admissibility, margin, threshold >= 2, budget ~ floor((H+1)/3)."
                        .to_string(),
            });
        }

        // Part B: oval, nest, distribution, complexity.
        if p.contains("part b") || p.contains("oval") || p.contains("distribution") {
            return Ok(SolveBundle {
                dsl: [
                    "DEFINE ○ WITH 1",
                    "DEFINE ⊂ WITH a+b",
                    "DEFINE Δ WITH 'nested' if a<b else 'separated'",
                    "DEFINE χ WITH a+b",
                ]
                .join("\n"),
                evals: ["1 ovO 0", "2 niO 3", "2 diO 3", "3 coO 5"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                final_answer:
                    "Part B: structure operators (oval, nest, distribution, complexity)."
                        .to_string(),
            });
        }

        Ok(SolveBundle {
            dsl: "DEFINE ⊕ WITH (a+b)/2\nDEFINE ⊗ WITH a*b".to_string(),
            evals: vec!["3 ⊕ 7".to_string()],
            final_answer: "Default rules.".to_string(),
        })
    }
}
