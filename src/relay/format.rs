//! Text shaping for relayed form fields: multi-value collapsing and
//! member-id mention formatting.

use std::collections::HashMap;

/// Collapse fields sharing a label into one entry whose value joins the
/// trimmed, non-empty values in first-seen order. A single value is left
/// unjoined; multi-selects arrive as repeated (label, value) pairs.
pub fn collapse_fields(fields: &[(String, String)]) -> Vec<(String, String)> {
    let mut order: Vec<String> = Vec::new();
    let mut values: HashMap<String, Vec<String>> = HashMap::new();

    for (label, value) in fields {
        if !values.contains_key(label) {
            order.push(label.clone());
        }
        values.entry(label.clone()).or_default().push(value.clone());
    }

    order
        .into_iter()
        .map(|label| {
            let kept: Vec<String> = values
                .remove(&label)
                .unwrap_or_default()
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
            let joined = kept.join(", ");
            (label, joined)
        })
        .collect()
}

/// Whether a field label is identifier-bearing, i.e. its values may carry
/// member ids worth resolving to display names.
pub fn is_discord_id_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    lower.contains("discord") && lower.contains("id")
}

/// All 15-20 digit numeric tokens in a value, deduplicated, in first-seen
/// order. Tokens are maximal digit runs; longer runs are not ids.
pub fn extract_snowflakes(value: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let bytes = value.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let run = &value[start..i];
            if (15..=20).contains(&run.len()) && !found.iter().any(|f| f == run) {
                found.push(run.to_string());
            }
        } else {
            i += 1;
        }
    }

    found
}

/// Replace every occurrence of `id` in `value` with `replacement`: both the
/// bare token (with no adjacent word character) and any pre-existing
/// `<@id>` / `<@!id>` mention wrapper. Single pass; replacements are never
/// re-scanned even though they embed the id themselves.
pub fn replace_id(value: &str, id: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev: Option<char> = None;
    let mut rest = value;

    while !rest.is_empty() {
        if let Some(after) = strip_mention(rest, id) {
            out.push_str(replacement);
            prev = Some('>');
            rest = after;
            continue;
        }

        if rest.starts_with(id)
            && !prev.map_or(false, is_word_char)
            && !rest[id.len()..].chars().next().map_or(false, is_word_char)
        {
            out.push_str(replacement);
            prev = rest[..id.len()].chars().last();
            rest = &rest[id.len()..];
            continue;
        }

        let ch = rest.chars().next().expect("rest is non-empty");
        out.push(ch);
        prev = Some(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

fn strip_mention<'a>(input: &'a str, id: &str) -> Option<&'a str> {
    for prefix in ["<@!", "<@"] {
        if let Some(after) = input
            .strip_prefix(prefix)
            .and_then(|r| r.strip_prefix(id))
            .and_then(|r| r.strip_prefix('>'))
        {
            return Some(after);
        }
    }
    None
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Bracket a display name for log rendering. Names that already start with
/// a callsign bracket, e.g. "[T-411] Quinoa", are kept as-is.
pub fn wrap_display_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('[') {
        trimmed.to_string()
    } else {
        format!("[{}]", trimmed)
    }
}
