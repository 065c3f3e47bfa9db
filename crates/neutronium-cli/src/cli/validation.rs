use std::ops::RangeInclusive;

/// Accepted debounce window, in milliseconds.
pub const DEBOUNCE_RANGE: RangeInclusive<u64> = 10..=5000;

/// Parse and range-check a debounce window.
pub fn parse_debounce(s: &str) -> Result<u64, String> {
    let ms: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Debounce must be a number of milliseconds: '{}'", s))?;

    if !DEBOUNCE_RANGE.contains(&ms) {
        return Err(format!(
            "Debounce must be between {} and {} ms, got {}",
            DEBOUNCE_RANGE.start(),
            DEBOUNCE_RANGE.end(),
            ms
        ));
    }

    Ok(ms)
}

/// Validate a JSX pragma of the form `<namespace>.<member>`.
///
/// Both parts must be plain JavaScript identifiers; the namespace becomes
/// the `import * as <namespace>` binding in compiled output.
pub fn parse_pragma(s: &str) -> Result<String, String> {
    let Some((namespace, member)) = s.split_once('.') else {
        return Err(format!(
            "Pragma must look like 'namespace.member' (e.g. _neutronium.h): '{}'",
            s
        ));
    };

    for part in [namespace, member] {
        if !is_identifier(part) {
            return Err(format!(
                "Pragma parts must be JavaScript identifiers: '{}'",
                s
            ));
        }
    }

    Ok(s.to_string())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
