use crate::types::ExtractedField;
use serde_json::Value;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Multi-line editor only for text that already spans lines.
pub fn should_use_textarea(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('\n'),
        _ => false,
    }
}

/// Value as shown in the editor; null becomes an empty box.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Label suffix next to a field name: "(Confidence 0.93)", or plain
/// "Confidence" when the backend gave none (or zero).
pub fn confidence_label(field: &ExtractedField) -> String {
    match field.confidence {
        Some(c) if c != 0.0 => format!("(Confidence {:.2})", c),
        _ => "Confidence".to_string(),
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
}

/// Numeric-aware, case-insensitive ordering: "field2" < "field10".
/// Falls back to byte order so distinct keys never compare equal.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    let mut zero_padding = Ordering::Equal;

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                match cmp_digit_runs(&l_run, &r_run) {
                    Ordering::Equal => {
                        if zero_padding == Ordering::Equal {
                            zero_padding = l_run.len().cmp(&r_run.len());
                        }
                    }
                    other => return other,
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }

    zero_padding.then_with(|| a.cmp(b))
}
