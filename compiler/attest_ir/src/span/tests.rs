use super::*;

#[test]
fn test_span_basic() {
    let span = Span::new(10, 20, 2, 4);
    assert_eq!(span.len(), 10);
    assert!(!span.is_empty());
    assert!(!span.is_dummy());
    assert_eq!(span.to_range(), 10..20);
}

#[test]
fn test_dummy_span() {
    assert!(Span::DUMMY.is_dummy());
    assert!(Span::DUMMY.is_empty());
    assert_eq!(Span::default(), Span::DUMMY);
}

#[test]
fn test_merge_keeps_first_position() {
    let a = Span::new(15, 30, 3, 5);
    let b = Span::new(10, 20, 2, 0);
    let merged = a.merge(b);
    assert_eq!(merged.start, 10);
    assert_eq!(merged.end, 30);
    assert_eq!((merged.line, merged.col), (2, 0));
}

#[test]
fn test_merge_with_dummy() {
    let a = Span::new(4, 8, 1, 4);
    assert_eq!(a.merge(Span::DUMMY), a);
    assert_eq!(Span::DUMMY.merge(a), a);
}

#[test]
fn test_display_is_one_based_column() {
    assert_eq!(Span::new(0, 1, 7, 0).to_string(), "7:1");
}
