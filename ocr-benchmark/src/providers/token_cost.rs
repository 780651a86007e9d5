//! Per-model token pricing and usage assembly

use crate::dataset::Usage;

/// Which side of a call the tokens belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Input,
    Output,
}

/// $ per 1M tokens, (model, input, output). Prices move; unknown models cost
/// `None` rather than failing the run.
const TOKEN_COST: &[(&str, f64, f64)] = &[
    ("chatgpt-4o-latest", 2.5, 10.0),
    ("gemini-1.5-flash", 0.075, 0.3),
    ("gemini-1.5-pro", 1.25, 5.0),
    ("gemini-2.0-flash", 0.1, 0.4),
    ("gemini-2.0-flash-001", 0.1, 0.4),
    ("gemini-2.5-flash", 0.3, 2.5),
    ("gemini-2.5-pro", 1.25, 10.0),
    ("gpt-4.1", 2.0, 8.0),
    ("gpt-4.1-mini", 0.4, 1.6),
    ("gpt-4.1-nano", 0.1, 0.4),
    ("gpt-4o", 2.5, 10.0),
    ("gpt-4o-2024-11-20", 2.5, 10.0),
    ("gpt-4o-mini", 0.15, 0.6),
    ("gpt-5", 1.25, 10.0),
    ("o1", 15.0, 60.0),
    ("o1-mini", 1.1, 4.4),
    ("o3-mini", 1.1, 4.4),
    ("o4-mini", 1.1, 4.4),
];

/// Dollar cost for `tokens` tokens of `kind` on `model`, or `None` when the
/// model is not in the price table.
pub fn token_cost(model: &str, kind: TokenKind, tokens: u64) -> Option<f64> {
    let (_, input, output) = TOKEN_COST.iter().find(|(name, _, _)| *name == model)?;
    let per_million = match kind {
        TokenKind::Input => *input,
        TokenKind::Output => *output,
    };
    Some(per_million * tokens as f64 / 1_000_000.0)
}

/// Assemble the usage record for one provider call, pricing both sides when
/// the model is known.
pub fn build_usage(model: &str, duration: f64, input_tokens: u64, output_tokens: u64) -> Usage {
    let input_cost = token_cost(model, TokenKind::Input, input_tokens);
    let output_cost = token_cost(model, TokenKind::Output, output_tokens);
    let total_cost = match (input_cost, output_cost) {
        (Some(i), Some(o)) => Some(i + o),
        _ => None,
    };

    Usage {
        duration,
        input_tokens,
        output_tokens,
        total_tokens: input_tokens + output_tokens,
        input_cost,
        output_cost,
        total_cost,
    }
}
