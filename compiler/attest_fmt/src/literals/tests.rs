use super::*;

#[test]
fn test_quote_plain() {
    assert_eq!(quote_str("2"), "'2'");
    assert_eq!(quote_str(""), "''");
}

#[test]
fn test_quote_prefers_double_for_single_quotes() {
    assert_eq!(quote_str("it's"), "\"it's\"");
    assert_eq!(quote_str("both ' and \""), "'both \\' and \"'");
}

#[test]
fn test_quote_escapes() {
    assert_eq!(quote_str("a\nb\\c\td"), "'a\\nb\\\\c\\td'");
    assert_eq!(quote_str("\u{1}"), "'\\x01'");
    assert_eq!(quote_str("é"), "'é'");
}

#[test]
fn test_float_positional() {
    assert_eq!(format_float(1.0), "1.0");
    assert_eq!(format_float(2.5), "2.5");
    assert_eq!(format_float(-0.25), "-0.25");
    assert_eq!(format_float(0.1), "0.1");
    assert_eq!(format_float(123_456.0), "123456.0");
    assert_eq!(format_float(0.0001), "0.0001");
    assert_eq!(format_float(1.0 / 3.0), "0.3333333333333333");
}

#[test]
fn test_float_scientific() {
    assert_eq!(format_float(1e16), "1e+16");
    assert_eq!(format_float(1.5e-5), "1.5e-05");
    assert_eq!(format_float(-2e20), "-2e+20");
}

#[test]
fn test_float_specials() {
    assert_eq!(format_float(0.0), "0.0");
    assert_eq!(format_float(-0.0), "-0.0");
    assert_eq!(format_float(f64::INFINITY), "inf");
    assert_eq!(format_float(f64::NAN), "nan");
}
