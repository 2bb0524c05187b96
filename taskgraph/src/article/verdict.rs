//! Review verdicts.
//!
//! Review prompts ask for a closing `VERDICT: APPROVE` or `VERDICT: REVISE` line. When a
//! reply has no such line, a keyword scan decides instead.

use serde::{Deserialize, Serialize};

/// Outcome of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approve,
    Revise,
}

/// Phrases that mark an unstructured review as asking for changes.
pub const REVISION_KEYWORDS: &[&str] = &[
    "needs revision",
    "needs improvement",
    "not sufficient",
    "insufficient",
    "需要修改",
    "需要改进",
    "不够",
];

/// Parsed verdict and whether it came from a `VERDICT:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedVerdict {
    pub verdict: Verdict,
    pub structured: bool,
}

fn structured_line(line: &str) -> Option<Verdict> {
    let line = line
        .trim()
        .trim_start_matches(|c: char| matches!(c, '*' | '#' | '>' | '-' | '_'))
        .trim()
        .to_lowercase();
    let rest = line.strip_prefix("verdict")?;
    let rest = rest
        .trim_start_matches(|c: char| matches!(c, '*' | '_'))
        .trim_start();
    let rest = rest.strip_prefix(':').or_else(|| rest.strip_prefix('：'))?;
    if rest.contains("revise") {
        Some(Verdict::Revise)
    } else if rest.contains("approve") {
        Some(Verdict::Approve)
    } else {
        None
    }
}

/// Reads the verdict of a review reply. The last `VERDICT:` line wins.
pub fn parse_verdict(text: &str) -> ParsedVerdict {
    if let Some(verdict) = text.lines().rev().find_map(structured_line) {
        return ParsedVerdict {
            verdict,
            structured: true,
        };
    }
    let lower = text.to_lowercase();
    let verdict = if REVISION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Verdict::Revise
    } else {
        Verdict::Approve
    };
    ParsedVerdict {
        verdict,
        structured: false,
    }
}

/// Review text with `VERDICT:` lines removed, for handing to the writer.
pub fn strip_verdict(text: &str) -> String {
    text.lines()
        .filter(|l| structured_line(l).is_none())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
