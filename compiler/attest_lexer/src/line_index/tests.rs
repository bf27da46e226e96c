use super::*;

#[test]
fn test_single_line() {
    let index = LineIndex::new("value = 2");
    assert_eq!(index.line(0), 1);
    assert_eq!(index.line(8), 1);
    assert_eq!(index.line_start(5), 0);
}

#[test]
fn test_multiple_lines() {
    let source = "a = 1\nbb = 2\n\nccc";
    let index = LineIndex::new(source);
    assert_eq!(index.line(6), 2);
    assert_eq!(index.line_start(8), 6);
    assert_eq!(index.line(13), 3);
    assert_eq!(index.line_col(source, 14), (4, 0));
    assert_eq!(index.line_col(source, 16), (4, 2));
}

#[test]
fn test_column_counts_characters() {
    let source = "s = 'é' + x";
    let index = LineIndex::new(source);
    let offset = u32::try_from(source.find('x').unwrap_or(0)).unwrap_or(0);
    assert_eq!(index.line_col(source, offset), (1, 10));
}
