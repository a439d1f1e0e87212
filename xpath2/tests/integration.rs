//! End-to-end parse + evaluate tests against the bundled `simple` tree.

use xpath2::context::{DynamicContext, ParserOptions, StaticContext};
use xpath2::error::Error;
use xpath2::parser::Parser;
use xpath2::sequence::{Item, Sequence};
use xpath2::tree::simple::{into_shared, SimpleNode, Tree};
use xpath2::tree::XPathNode;
use xpath2_name::Name;

fn eval(source: &str) -> Sequence<SimpleNode> {
    let static_context = StaticContext::default();
    let ctx = DynamicContext::<SimpleNode>::new(&static_context);
    let expr = Parser::parse(&static_context, source).expect("parse");
    xpath2::eval::evaluate(&expr, &ctx).expect("eval")
}

fn eval_with(source: &str, node: SimpleNode) -> Sequence<SimpleNode> {
    let static_context = StaticContext::default();
    let ctx = DynamicContext::new(&static_context).with_context_item(Item::Node(node));
    let expr = Parser::parse(&static_context, source).expect("parse");
    xpath2::eval::evaluate(&expr, &ctx).expect("eval")
}

fn eval_err(source: &str) -> Error {
    let static_context = StaticContext::default();
    let ctx = DynamicContext::<SimpleNode>::new(&static_context);
    let expr = Parser::parse(&static_context, source).expect("parse");
    xpath2::eval::evaluate(&expr, &ctx).unwrap_err().error
}

fn only_string(seq: &Sequence<SimpleNode>) -> String {
    seq.exactly_one().unwrap().string_value()
}

fn catalog_tree() -> SimpleNode {
    let mut tree = Tree::new();
    let catalog = tree.element(0, Name::unprefixed("catalog"), vec![]);
    let book1 = tree.element(
        catalog,
        Name::unprefixed("book"),
        vec![(Name::unprefixed("id"), "bk101".into())],
    );
    let title1 = tree.element(book1, Name::unprefixed("title"), vec![]);
    tree.text(title1, "XML Developer's Guide");
    let price1 = tree.element(book1, Name::unprefixed("price"), vec![]);
    tree.text(price1, "44.95");

    let book2 = tree.element(
        catalog,
        Name::unprefixed("book"),
        vec![(Name::unprefixed("id"), "bk102".into())],
    );
    let title2 = tree.element(book2, Name::unprefixed("title"), vec![]);
    tree.text(title2, "Midnight Rain");
    let price2 = tree.element(book2, Name::unprefixed("price"), vec![]);
    tree.text(price2, "5.95");

    into_shared(tree)
}

#[test]
fn test_arithmetic_and_comparison() {
    assert_eq!(only_string(&eval("2 + 3 * 4")), "14");
    assert_eq!(only_string(&eval("(2 + 3) * 4")), "20");
    assert_eq!(only_string(&eval("10 idiv 3")), "3");
    assert_eq!(only_string(&eval("10 mod 3")), "1");
    assert_eq!(only_string(&eval("if (1 < 2) then 'yes' else 'no'")), "yes");
}

#[test]
fn test_range_produces_a_sequence() {
    let seq = eval("1 to 5");
    let values: Vec<String> = seq.iter().map(|item| item.string_value()).collect();
    assert_eq!(values, vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn test_empty_sequence_propagation() {
    assert!(eval("() + 1").is_empty());
    assert!(eval("-()").is_empty());
    assert!(eval("() to 5").is_empty());
    assert!(eval("() eq 1").is_empty());
}

#[test]
fn test_string_functions() {
    assert_eq!(only_string(&eval("concat('foo', '-', 'bar')")), "foo-bar");
    assert_eq!(only_string(&eval("upper-case('abc')")), "ABC");
    assert_eq!(only_string(&eval("substring('hello world', 1, 5)")), "hello");
    assert_eq!(
        only_string(&eval("substring-after('hello world', 'hello ')")),
        "world"
    );
    assert_eq!(
        only_string(&eval("string-join(('a', 'b', 'c'), '-')")),
        "a-b-c"
    );
    assert!(eval("contains('hello', 'ell')").effective_boolean_value().unwrap());
    assert!(!eval("starts-with('hello', 'ell')").effective_boolean_value().unwrap());
}

#[test]
fn test_sequence_functions() {
    assert_eq!(only_string(&eval("count((1, 2, 3))")), "3");
    assert_eq!(only_string(&eval("sum((1, 2, 3))")), "6");
    assert_eq!(only_string(&eval("max((3, 1, 4, 1, 5))")), "5");
    assert_eq!(only_string(&eval("min((3, 1, 4, 1, 5))")), "1");
    let reversed = eval("reverse((1, 2, 3))");
    let values: Vec<String> = reversed.iter().map(|item| item.string_value()).collect();
    assert_eq!(values, vec!["3", "2", "1"]);
}

#[test]
fn test_quantifiers_and_for() {
    assert!(eval("some $x in (1, 2, 3) satisfies $x = 2")
        .effective_boolean_value()
        .unwrap());
    assert!(!eval("every $x in (1, 2, 3) satisfies $x = 2")
        .effective_boolean_value()
        .unwrap());
    let doubled = eval("for $x in (1, 2, 3) return $x * 2");
    let values: Vec<String> = doubled.iter().map(|item| item.string_value()).collect();
    assert_eq!(values, vec!["2", "4", "6"]);
}

#[test]
fn test_numeric_functions() {
    assert_eq!(only_string(&eval("abs(-5)")), "5");
    assert_eq!(only_string(&eval("ceiling(4.1)")), "5");
    assert_eq!(only_string(&eval("floor(4.9)")), "4");
    assert_eq!(only_string(&eval("round(4.5)")), "5");
    assert_eq!(only_string(&eval("round-half-to-even(0.5)")), "0");
    assert_eq!(only_string(&eval("round-half-to-even(1.5)")), "2");
}

#[test]
fn test_casting_and_castable() {
    assert_eq!(only_string(&eval("xs:integer('42')")), "42");
    assert!(eval("'abc' castable as xs:integer")
        .effective_boolean_value()
        .is_ok_and(|b| !b));
    assert!(eval("'42' castable as xs:integer")
        .effective_boolean_value()
        .unwrap());
    assert!(matches!(eval_err("'abc' cast as xs:integer"), Error::FORG0001));
}

#[test]
fn test_node_navigation_over_tree() {
    let root = catalog_tree();
    let titles = eval_with("/catalog/book/title", root.clone());
    let values: Vec<String> = titles.iter().map(|item| item.string_value()).collect();
    assert_eq!(values, vec!["XML Developer's Guide", "Midnight Rain"]);

    let first_title = eval_with("/catalog/book[1]/title", root.clone());
    assert_eq!(only_string(&first_title), "XML Developer's Guide");

    let second_price = eval_with("/catalog/book[2]/price", root.clone());
    assert_eq!(only_string(&second_price), "5.95");

    let all_books = eval_with("//book", root.clone());
    assert_eq!(all_books.len(), 2);
}

#[test]
fn test_predicate_position_is_relative_to_each_context_node() {
    // every `book` has exactly one `title`, so `title[1]` must match both,
    // not just the first book's title.
    let root = catalog_tree();
    let titles = eval_with("/catalog/book/title[1]", root);
    assert_eq!(titles.len(), 2);
}

#[test]
fn test_node_accessor_functions() {
    let root = catalog_tree();
    let catalog = root.iter_children_or_self().next().unwrap();
    let book1 = catalog.iter_children_or_self().next().unwrap();

    assert_eq!(only_string(&eval_with("name(.)", book1.clone())), "book");
    assert_eq!(only_string(&eval_with("local-name(.)", book1.clone())), "book");
    assert_eq!(only_string(&eval_with("node-name(.)", book1.clone())), "book");
    assert!(!eval_with("nilled(.)", book1).effective_boolean_value().unwrap());
}

#[test]
fn test_namespace_aware_parsing() {
    let options = ParserOptions {
        namespaces: vec![("x".to_string(), "http://example.com/x".to_string())],
        ..Default::default()
    };
    let static_context = StaticContext::new(options);
    let ctx = DynamicContext::<SimpleNode>::new(&static_context);
    let expr = Parser::parse(&static_context, "x:QName('http://example.com/x', 'x:foo')");
    assert!(expr.is_ok());
    let result = xpath2::eval::evaluate(&expr.unwrap(), &ctx);
    // `x:QName` is not a real function in the `x` namespace — dispatch
    // must reject it rather than silently resolving it to `fn:QName`.
    assert!(result.is_err());
}

#[test]
fn test_undefined_function_is_a_static_error() {
    assert!(matches!(eval_err("no-such-function(1)"), Error::XPST0017));
}
