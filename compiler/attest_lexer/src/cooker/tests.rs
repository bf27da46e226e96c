use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    match Cooker::new(source).run() {
        Ok(tokens) => tokens.into_iter().map(|t| t.kind).collect(),
        Err(err) => panic!("lex failed: {err}"),
    }
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Ident(name.to_string())
}

#[test]
fn test_simple_statement() {
    assert_eq!(
        kinds("value = 2\n"),
        vec![
            ident("value"),
            TokenKind::Eq,
            TokenKind::Int(2),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_missing_trailing_newline_is_added() {
    assert_eq!(
        kinds("pass"),
        vec![TokenKind::Pass, TokenKind::Newline, TokenKind::Eof]
    );
}

#[test]
fn test_indent_and_dedent() {
    let source = "if x:\n    y\n    z\nw\n";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::If,
            ident("x"),
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            ident("y"),
            TokenKind::Newline,
            ident("z"),
            TokenKind::Newline,
            TokenKind::Dedent,
            ident("w"),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_dedents_closed_at_eof() {
    let source = "def f():\n    if x:\n        pass";
    let tokens = kinds(source);
    let tail = &tokens[tokens.len() - 4..];
    assert_eq!(
        tail,
        &[
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Dedent,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_blank_and_comment_lines_are_ignored() {
    let source = "a\n\n   # note\n\nb  # trailing\n";
    assert_eq!(
        kinds(source),
        vec![
            ident("a"),
            TokenKind::Newline,
            ident("b"),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_no_newline_inside_brackets() {
    let source = "f(1,\n      2)\n";
    assert_eq!(
        kinds(source),
        vec![
            ident("f"),
            TokenKind::LParen,
            TokenKind::Int(1),
            TokenKind::Comma,
            TokenKind::Int(2),
            TokenKind::RParen,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_line_continuation() {
    assert_eq!(
        kinds("x = 1 + \\\n    2\n"),
        vec![
            ident("x"),
            TokenKind::Eq,
            TokenKind::Int(1),
            TokenKind::Plus,
            TokenKind::Int(2),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_strings() {
    assert_eq!(
        kinds(r#"'a\tb' "c" r'\d' """x"y""""#)[..4],
        [
            TokenKind::Str("a\tb".into()),
            TokenKind::Str("c".into()),
            TokenKind::Str("\\d".into()),
            TokenKind::Str("x\"y".into()),
        ]
    );
}

#[test]
fn test_triple_quoted_spans_lines() {
    let tokens = kinds("doc = '''one\ntwo'''\n");
    assert_eq!(tokens[2], TokenKind::Str("one\ntwo".into()));
    assert_eq!(tokens[3], TokenKind::Newline);
}

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("1_000 0x1F 2.5 .5 1e3")[..5],
        [
            TokenKind::Int(1000),
            TokenKind::Int(31),
            TokenKind::Float(2.5f64.to_bits()),
            TokenKind::Float(0.5f64.to_bits()),
            TokenKind::Float(1000.0f64.to_bits()),
        ]
    );
}

#[test]
fn test_operators_prefer_longest_match() {
    assert_eq!(
        kinds("a //= b ** c != d")[..7],
        [
            ident("a"),
            TokenKind::SlashSlashEq,
            ident("b"),
            TokenKind::StarStar,
            ident("c"),
            TokenKind::NotEq,
            ident("d"),
        ]
    );
}

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("assert x is not None")[..5],
        [
            TokenKind::Assert,
            ident("x"),
            TokenKind::Is,
            TokenKind::Not,
            TokenKind::None,
        ]
    );
}

#[test]
fn test_spans_carry_line_and_column() {
    let tokens = Cooker::new("a = 1\n  \nbb = 2\n").run().unwrap_or_default();
    let bb = tokens
        .iter()
        .find(|t| t.kind == ident("bb"))
        .map(|t| t.span)
        .unwrap_or_default();
    assert_eq!((bb.line, bb.col), (3, 0));
    assert_eq!(bb.len(), 2);
}

#[test]
fn test_inconsistent_dedent() {
    let err = Cooker::new("if x:\n    y\n  z\n").run().err();
    assert_eq!(err.map(|e| e.kind), Some(LexErrorKind::InconsistentDedent));
}

#[test]
fn test_unterminated_string() {
    let err = Cooker::new("x = 'abc\n").run().err();
    assert_eq!(err.map(|e| e.kind), Some(LexErrorKind::UnterminatedString));
}

#[test]
fn test_unbalanced_bracket() {
    let err = Cooker::new("x = 1)\n").run().err();
    assert_eq!(err.map(|e| e.kind), Some(LexErrorKind::UnbalancedBracket(')')));
}
