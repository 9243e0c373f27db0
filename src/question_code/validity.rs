use super::ValidityRule;
use super::base::{last_segment, leading_digits};

pub fn is_valid(code: &str, rule: ValidityRule) -> bool {
    match rule {
        ValidityRule::QuestionNumber => has_question_number(code),
        ValidityRule::FirstSubpart => is_first_subpart(code),
    }
}

fn has_question_number(code: &str) -> bool {
    let segments = code.split('.').collect::<Vec<&str>>();
    if segments.len() < 5 {
        return false;
    }

    let question = segments[4];
    let number = question
        .split_once('_')
        .map(|(_, rest)| rest)
        .unwrap_or(question);

    number
        .chars()
        .next()
        .map(|character| character.is_ascii_digit())
        .unwrap_or(false)
}

fn is_first_subpart(code: &str) -> bool {
    if !code.contains('.') {
        return false;
    }

    let last = last_segment(code).to_ascii_lowercase();
    if !last.is_empty() && last.chars().all(|character| character.is_ascii_digit()) {
        return true;
    }

    let mut characters = last.chars();
    if let (Some(only), None) = (characters.next(), characters.next()) {
        return only.is_alphabetic();
    }

    let number = leading_digits(&last);
    !number.is_empty() && &last[number.len()..] == "a"
}
