//! The fingerprint-sanitization rule used to derive per-opening video-file names.

/// Sanitize a position fingerprint (FEN) into a filesystem-safe, stable filename stem:
/// `/` becomes `_`, any whitespace run becomes `-`, and the result is lower-cased.
///
/// This is a pure function: sanitizing the same input twice always yields the same
/// output, and it never touches the filesystem.
#[must_use]
pub fn sanitize_fingerprint(fen: &str) -> String {
    let mut out = String::with_capacity(fen.len());
    let mut last_was_space = false;
    for ch in fen.chars() {
        if ch == '/' {
            out.push('_');
            last_was_space = false;
        } else if ch.is_whitespace() {
            if !last_was_space {
                out.push('-');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_slashes_and_spaces() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let sanitized = sanitize_fingerprint(fen);
        assert!(!sanitized.contains('/'));
        assert!(!sanitized.contains(' '));
        assert_eq!(sanitized, sanitized.to_lowercase());
    }

    #[test]
    fn is_pure() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(sanitize_fingerprint(fen), sanitize_fingerprint(fen));
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(sanitize_fingerprint("a  b"), "a-b");
    }
}
