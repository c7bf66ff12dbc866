//! Lexical request-path cleaning.

/// Returns the canonical form of `p`, eliminating `.` and `..` elements and
/// repeated slashes.
///
/// The rules, applied purely lexically:
///  1. Replace multiple slashes with a single slash.
///  2. Eliminate each `.` path name element (the current directory).
///  3. Eliminate each inner `..` path name element (the parent directory)
///     along with the non-`..` element that precedes it.
///  4. Eliminate `..` elements that begin a rooted path, that is, replace
///     `/..` by `/` at the beginning of a path.
///
/// The result always begins with `/`, and ends with `/` only if the input
/// did (or ended in a `.` element). Since no `..` survives, a cleaned path
/// joined onto a directory can never name anything outside of it.
///
/// ```rust
/// use staticrouter::path::clean;
///
/// assert_eq!(clean("/js/../css//site.css"), "/css/site.css");
/// assert_eq!(clean("../../etc/passwd"), "/etc/passwd");
/// assert_eq!(clean(""), "/");
/// ```
pub fn clean(p: &str) -> String {
    if p.is_empty() {
        return "/".to_owned();
    }

    let trailing = (p.len() > 1 && p.ends_with('/')) || p.ends_with("/.");
    let mut elements: Vec<&str> = Vec::new();

    for element in p.split('/') {
        match element {
            "" | "." => {}
            ".." => {
                elements.pop();
            }
            name => elements.push(name),
        }
    }

    if elements.is_empty() {
        return "/".to_owned();
    }

    let mut out = String::with_capacity(p.len() + 2);
    for element in &elements {
        out.push('/');
        out.push_str(element);
    }
    if trailing {
        out.push('/');
    }
    out
}
