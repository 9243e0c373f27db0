use super::GroupingMode;

pub fn last_segment(code: &str) -> &str {
    code.rsplit('.').next().unwrap_or(code)
}

/// Equivalence-class key used to collapse sub-parts of one question.
pub fn base_of(code: &str, mode: GroupingMode) -> String {
    match mode {
        GroupingMode::TrailingLetter => strip_trailing_letter(code).to_string(),
        GroupingMode::LeadingDigit => strip_to_leading_number(code),
        GroupingMode::AuthoritativeRoot => root_of(code).unwrap_or_else(|| code.to_string()),
    }
}

// Only a letter that directly follows a digit counts as a sub-part, which
// keeps the strip idempotent and leaves `i`/`ii` segments alone.
fn strip_trailing_letter(code: &str) -> &str {
    let mut tail = last_segment(code).chars().rev();
    match (tail.next(), tail.next()) {
        (Some(last), Some(previous)) if last.is_ascii_alphabetic() && previous.is_ascii_digit() => {
            &code[..code.len() - 1]
        }
        _ => code,
    }
}

fn strip_to_leading_number(code: &str) -> String {
    let segments = code.split('.').collect::<Vec<&str>>();
    if segments.len() < 5 {
        return code.to_string();
    }

    let question = segments[4];
    let base_question = match question.split_once('_') {
        Some((prefix, suffix)) => {
            let number = leading_digits(suffix);
            (!number.is_empty()).then(|| format!("{prefix}_{number}"))
        }
        None => {
            let number = leading_digits(question);
            (!number.is_empty()).then(|| number.to_string())
        }
    };

    match base_question {
        Some(base_question) => {
            let mut parts = segments[..4].to_vec();
            parts.push(&base_question);
            parts.join(".")
        }
        None => code.to_string(),
    }
}

/// Replaces the last segment with all of its digits; `None` when it has none.
pub(super) fn root_of(code: &str) -> Option<String> {
    let last = last_segment(code);
    let number = last
        .chars()
        .filter(|character| character.is_ascii_digit())
        .collect::<String>();
    if number.is_empty() {
        return None;
    }

    let head = &code[..code.len() - last.len()];
    Some(format!("{head}{number}"))
}

pub(super) fn leading_digits(value: &str) -> &str {
    let end = value
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(value.len());
    &value[..end]
}
