/// Translate a LIKE pattern into wildcard-query syntax.
///
/// `%` becomes `*` and `_` becomes `?`. Characters that are special to the
/// wildcard syntax are backslash-escaped. With an escape character, the
/// character following it is taken literally; a trailing escape character is
/// kept as-is.
pub fn like_to_wildcard(pattern: &str, escape: Option<char>) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        if Some(c) == escape {
            match chars.next() {
                Some(next) => push_literal(&mut out, next),
                None => push_literal(&mut out, c),
            }
            continue;
        }
        match c {
            '%' => out.push('*'),
            '_' => out.push('?'),
            other => push_literal(&mut out, other),
        }
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if matches!(c, '*' | '?' | '\\') {
        out.push('\\');
    }
    out.push(c);
}
