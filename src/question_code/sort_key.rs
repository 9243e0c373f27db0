use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Higher,
    Standard,
}

/// Field order is the comparison order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParsedKey {
    pub level: Level,
    pub paper: String,
    pub session: String,
    pub question: String,
}

/// `Rejected` sorts before every parsed key, `Unparsed` after.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// Strict parsing only: the code does not follow the exam grammar.
    Rejected,
    Parsed(ParsedKey),
    /// Lenient parsing only: fewer than three segments.
    Unparsed,
}

pub struct SortKeyParser {
    strict_pattern: Option<Regex>,
}

impl SortKeyParser {
    pub fn new(strict: bool) -> Result<Self> {
        let strict_pattern = if strict {
            Some(
                Regex::new(r"^(\d+M)\.(\d+)\.(HL|SL)\.TZ\d+\.([a-z0-9]+)")
                    .context("failed to compile strict question code regex")?,
            )
        } else {
            None
        };

        Ok(Self { strict_pattern })
    }

    pub fn sort_key(&self, code: &str) -> SortKey {
        match &self.strict_pattern {
            Some(pattern) => strict_sort_key(code, pattern),
            None => lenient_sort_key(code),
        }
    }
}

fn lenient_sort_key(code: &str) -> SortKey {
    let segments = code.split('.').collect::<Vec<&str>>();
    if segments.len() < 3 {
        return SortKey::Unparsed;
    }

    let level = if code.contains("HL") {
        Level::Higher
    } else {
        Level::Standard
    };

    SortKey::Parsed(ParsedKey {
        level,
        paper: segments[1].to_string(),
        session: segments[0].to_string(),
        question: pad_digit_runs(segments[segments.len() - 1]),
    })
}

// The grammar guarantees numeric paper and session years, so they are padded
// to compare by value.
fn strict_sort_key(code: &str, pattern: &Regex) -> SortKey {
    let Some(captures) = pattern.captures(code) else {
        return SortKey::Rejected;
    };

    let group = |index: usize| captures.get(index).map(|value| value.as_str()).unwrap_or("");
    let level = if group(3) == "HL" {
        Level::Higher
    } else {
        Level::Standard
    };

    SortKey::Parsed(ParsedKey {
        level,
        paper: pad_digit_runs(group(2)),
        session: pad_digit_runs(group(1)),
        question: pad_digit_runs(group(4)),
    })
}

/// Left-pads every maximal ASCII digit run to width 3 so that `2` < `11` < `100`
/// as strings. Longer runs are kept as they are.
pub fn pad_digit_runs(question: &str) -> String {
    let mut out = String::with_capacity(question.len() + 4);
    let mut digits = String::new();

    for character in question.chars() {
        if character.is_ascii_digit() {
            digits.push(character);
            continue;
        }
        flush_digit_run(&mut out, &mut digits);
        out.push(character);
    }
    flush_digit_run(&mut out, &mut digits);

    out
}

fn flush_digit_run(out: &mut String, digits: &mut String) {
    if digits.is_empty() {
        return;
    }
    out.push_str(&format!("{digits:0>3}"));
    digits.clear();
}
