use super::*;
use crate::environment::new_namespace;
use crate::print_handler::PrintHandler;
use pretty_assertions::assert_eq;

fn eval(source: &str) -> String {
    let mut interp = Interpreter::builder()
        .print_handler(PrintHandler::silent())
        .build();
    let scope = new_namespace(None);
    match interp.eval_source_in(source, &scope, &scope) {
        Ok(value) => value.repr(),
        Err(err) => format!("error: {err}"),
    }
}

#[test]
fn test_str_methods() {
    assert_eq!(eval("'Hello'.upper()"), "'HELLO'");
    assert_eq!(eval("'  pad  '.strip()"), "'pad'");
    assert_eq!(eval("'xxpadxx'.lstrip('x')"), "'padxx'");
    assert_eq!(eval("'a,b,,c'.split(',')"), "['a', 'b', '', 'c']");
    assert_eq!(eval("' a  b '.split()"), "['a', 'b']");
    assert_eq!(eval("'-'.join(['x', 'y', 'z'])"), "'x-y-z'");
    assert_eq!(eval("'test_one'.startswith(('spec', 'test'))"), "True");
    assert_eq!(eval("'hello'.find('l')"), "2");
    assert_eq!(eval("'hello'.find('z')"), "-1");
    assert_eq!(eval("'banana'.count('an')"), "2");
    assert_eq!(eval("'123'.isdigit()"), "True");
    assert_eq!(eval("''.isdigit()"), "False");
}

#[test]
fn test_str_format() {
    assert_eq!(eval("'{} + {} = {}'.format(1, 2, 3)"), "'1 + 2 = 3'");
    assert_eq!(eval("'{1}{0}'.format('a', 'b')"), "'ba'");
    assert_eq!(eval("'{name}!'.format(name='x')"), "'x!'");
    assert_eq!(eval("'{{literal}}'.format()"), "'{literal}'");
}

#[test]
fn test_str_method_errors() {
    assert_eq!(eval("'a'.split('')"), "error: ValueError: empty separator");
    assert_eq!(
        eval("'-'.join([1])"),
        "error: TypeError: sequence item 0: expected str instance, int found"
    );
    assert_eq!(
        eval("'a'.nope"),
        "error: AttributeError: 'str' object has no attribute 'nope'"
    );
}

#[test]
fn test_list_methods_mutate_in_place() {
    assert_eq!(eval("[3, 1, 2].sort()"), "None");
    assert_eq!(eval("[1, 2, 3].index(2)"), "1");
    assert_eq!(eval("[1, 2, 1].count(1)"), "2");
    assert_eq!(eval("[1, 2].copy()"), "[1, 2]");
    assert_eq!(eval("[].pop()"), "error: IndexError: pop from empty list");
    assert_eq!(eval("[1].remove(5)"), "error: ValueError: list.remove(x): x not in list");
}

#[test]
fn test_bound_method_keeps_receiver() {
    let list = Value::list(vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
    let mut interp = Interpreter::builder()
        .print_handler(PrintHandler::silent())
        .build();

    let append = bound_method(&list, "append");
    assert!(append.is_some());
    if let Some(append) = append {
        interp
            .call(&append, CallArgs::new(vec![Value::Int(0)]))
            .ok();
    }
    if let Some(sort) = bound_method(&list, "sort") {
        interp
            .call(&sort, CallArgs::new(Vec::new()).with_keyword("reverse", Value::Bool(true)))
            .ok();
    }
    assert_eq!(list.repr(), "[3, 2, 1, 0]");
    assert!(bound_method(&list, "upper").is_none());
    assert!(bound_method(&Value::Int(1), "append").is_none());
}

#[test]
fn test_sort_with_key_is_stable() {
    assert_eq!(
        eval("sorted(['bb', 'a', 'cc', 'd'], key=len)"),
        "['a', 'd', 'bb', 'cc']"
    );
    assert!(eval("sorted([1, 'a'])").starts_with("error: TypeError: '<' not supported"));
}

#[test]
fn test_dict_methods() {
    assert_eq!(eval("{'a': 1}.get('a')"), "1");
    assert_eq!(eval("{'a': 1}.get('b', 0)"), "0");
    assert_eq!(eval("{'a': 1, 'b': 2}.keys()"), "['a', 'b']");
    assert_eq!(eval("{'a': 1}.items()"), "[('a', 1)]");
    assert_eq!(eval("{'a': 1}.pop('a')"), "1");
    assert_eq!(eval("{}.pop('a')"), "error: KeyError: 'a'");
    assert_eq!(eval("{}.setdefault('k', [])"), "[]");
}

#[test]
fn test_tuple_methods() {
    assert_eq!(eval("(1, 2, 2).count(2)"), "2");
    assert_eq!(eval("(1, 2).index(3)"), "error: ValueError: tuple.index(x): x not in tuple");
}
