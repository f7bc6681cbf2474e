//! Helpers for the text inside `/.../` pattern literals.

/// Remove the surrounding `/` delimiters of a pattern lexeme.
pub fn strip_delimiters(lexeme: &str) -> &str {
    let inner = lexeme.strip_prefix('/').unwrap_or(lexeme);
    inner.strip_suffix('/').unwrap_or(inner)
}

/// Turn `\/` into `/`, leaving every other escape for the regex engine.
pub fn resolve_delimiter_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('/') => out.push('/'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Escape every bare `/` as `\/` so `text` fits between pattern delimiters.
pub fn escape_delimiters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '/' => out.push_str("\\/"),
            _ => out.push(c),
        }
    }
    out
}

/// Drop every escaping backslash, yielding the literal text a pattern spells.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}
