// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command line reconstruction from the raw argument vector
//!
//! Arguments are joined with single spaces. An argument containing
//! whitespace or a single quote is wrapped in single quotes. An argument
//! containing a single quote additionally has every `\` and `'` escaped
//! with a backslash and carries a leading `@`, so a replay can tell it
//! apart from one that was quoted for whitespace alone.

/// Whitespace as classified by C `isspace` in the "C" locale
fn is_c_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

fn quote_argument(arg: &[u8], out: &mut Vec<u8>) {
    let has_white = arg.iter().copied().any(is_c_space);
    let has_quote = arg.contains(&b'\'');

    if has_quote {
        out.extend_from_slice(b"@'");
        for &byte in arg {
            if byte == b'\'' || byte == b'\\' {
                out.push(b'\\');
            }
            out.push(byte);
        }
        out.push(b'\'');
    } else if has_white {
        out.push(b'\'');
        out.extend_from_slice(arg);
        out.push(b'\'');
    } else {
        out.extend_from_slice(arg);
    }
}

/// Rebuild one command line string from raw arguments
///
/// Total over arbitrary bytes: the quoted byte string is decoded lossily,
/// so invalid UTF-8 becomes U+FFFD instead of an error.
pub fn reconstruct<A: AsRef<[u8]>>(args: &[A]) -> String {
    let mut out = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(b' ');
        }
        quote_argument(arg.as_ref(), &mut out);
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_arguments() {
        assert_eq!(reconstruct(&["prog"]), "prog");
        assert_eq!(reconstruct(&["prog", "-v", "--out=x"]), "prog -v --out=x");
        assert_eq!(reconstruct::<&str>(&[]), "");
    }

    #[test]
    fn test_whitespace_is_quoted() {
        assert_eq!(reconstruct(&["a", "b c"]), "a 'b c'");
        assert_eq!(reconstruct(&["tab\there"]), "'tab\there'");
        // no quote character, so backslashes stay as they are
        assert_eq!(reconstruct(&["a\\ b"]), "'a\\ b'");
    }

    #[test]
    fn test_single_quote_is_escaped_and_marked() {
        assert_eq!(reconstruct(&["it's"]), "@'it\\'s'");
        assert_eq!(reconstruct(&["don't stop"]), "@'don\\'t stop'");
        assert_eq!(reconstruct(&["a\\'b"]), "@'a\\\\\\'b'");
    }

    #[test]
    fn test_arbitrary_bytes_do_not_fail() {
        let args: Vec<Vec<u8>> = vec![b"prog".to_vec(), vec![0xff, b' ', 0xfe]];
        let line = reconstruct(&args);
        assert!(line.starts_with("prog '"));
        assert!(line.ends_with('\''));
        assert_eq!(reconstruct(&args), line);
    }

    #[test]
    fn test_empty_argument_keeps_its_slot() {
        assert_eq!(reconstruct(&["prog", "", "x"]), "prog  x");
    }
}
