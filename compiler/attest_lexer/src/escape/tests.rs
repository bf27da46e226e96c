use super::*;

#[test]
fn test_simple_escapes() {
    assert_eq!(unescape_string(r"a\nb\tc"), "a\nb\tc");
    assert_eq!(unescape_string(r#"say \"hi\""#), "say \"hi\"");
    assert_eq!(unescape_string(r"it\'s"), "it's");
    assert_eq!(unescape_string(r"back\\slash"), "back\\slash");
}

#[test]
fn test_hex_and_unicode_escapes() {
    assert_eq!(unescape_string(r"\x41"), "A");
    assert_eq!(unescape_string(r"\u00e9"), "é");
}

#[test]
fn test_unknown_escape_is_preserved() {
    assert_eq!(unescape_string(r"\q"), "\\q");
    assert_eq!(unescape_string(r"\xZZ"), "\\xZZ");
}

#[test]
fn test_backslash_newline_is_removed() {
    assert_eq!(unescape_string("one \\\ntwo"), "one two");
}

#[test]
fn test_trailing_backslash() {
    assert_eq!(unescape_string("end\\"), "end\\");
}
