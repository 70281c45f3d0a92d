use std::fmt::Write as _;

use expect_test::expect;
use introspect_core::plugins::{BlacklistPlugin, JsonPlugin, TablePlugin};
use introspect_core::{
    AccessPath, BaseNode, ConfigError, DescriptionNode, MapKey, Parser, ParserConfig,
    PluginRegistry, Record, TraversalState, TypeClass, Value, Visibility, clean_child_access,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn parser(config: ParserConfig) -> Parser {
    Parser::new(config, PluginRegistry::new()).unwrap()
}

fn path_of(node: &DescriptionNode) -> Option<&str> {
    node.access_path().map(AccessPath::as_str)
}

fn outline(node: &DescriptionNode) -> String {
    let mut out = String::new();
    write_outline(node, 0, &mut out);
    out
}

fn write_outline(node: &DescriptionNode, indent: usize, out: &mut String) {
    let path = path_of(node).unwrap_or("-");
    let _ = write!(
        out,
        "{:width$}{}: {} @ {}",
        "",
        node.name(),
        node.type_name(),
        path,
        width = indent * 2
    );
    if node.state() != TraversalState::Complete {
        let _ = write!(out, " [{:?}]", node.state());
    }
    out.push('\n');
    for child in node.children() {
        write_outline(child, indent + 1, out);
    }
}

fn self_containing_seq() -> Value {
    let value = Value::seq(Vec::<Value>::new());
    if let Some(items) = value.as_seq() {
        items.borrow_mut().push(value.clone());
    }
    value
}

#[test]
fn plain_integer_yields_single_scalar_node() {
    let node = Parser::default().parse(&Value::Int(1234), BaseNode::root("n"));

    assert_eq!(node.type_class(), TypeClass::Integer);
    assert!(node.children().is_empty());
    assert!(!node.is_recursion_limited());
    assert!(!node.is_depth_limited());
    assert_eq!(
        serde_json::to_value(&node).unwrap(),
        json!({
            "name": "n",
            "depth": 0,
            "access_path": "n",
            "type_class": "integer",
            "type_name": "int",
            "state": "complete",
            "representations": [
                {"label": "contents", "contents": {"kind": "text", "value": "1234"}}
            ]
        })
    );
}

#[test]
fn container_holding_itself_is_cut_at_first_back_edge() {
    let value = self_containing_seq();
    let node = Parser::default().parse(&value, BaseNode::root("a"));

    assert_eq!(node.depth(), 0);
    assert_eq!(node.children().len(), 1);
    let back = &node.children()[0];
    assert_eq!(back.depth(), 1);
    assert!(back.is_recursion_limited());
    assert!(back.children().is_empty());
    assert!(back.contents().is_none());
}

#[test]
fn two_element_cycle_terminates() {
    let a = Value::seq(Vec::<Value>::new());
    let b = Value::seq([a.clone()]);
    if let Some(items) = a.as_seq() {
        items.borrow_mut().push(b.clone());
    }

    let node = Parser::default().parse(&a, BaseNode::root("a"));
    let b_node = &node.children()[0];
    let back = &b_node.children()[0];

    assert_eq!(b_node.state(), TraversalState::Complete);
    assert!(back.is_recursion_limited());
    assert_eq!(path_of(back), Some("a[0][0]"));
}

#[test]
fn shared_child_reached_twice_is_described_twice() {
    let shared = Value::map([("x", 1)]);
    let root = Value::seq([shared.clone(), shared]);
    let node = Parser::default().parse(&root, BaseNode::root("d"));

    for child in node.children() {
        assert_eq!(child.state(), TraversalState::Complete);
        assert_eq!(child.children().len(), 1);
    }
    assert_eq!(path_of(&node.children()[1].children()[0]), Some("d[1]['x']"));
}

#[test]
fn nested_record_stops_at_depth_limit() {
    let inner = Value::record(Record::new("Node").with_public("name", "y"));
    let outer = Value::record(
        Record::new("Node")
            .with_public("name", "x")
            .with_public("child", inner),
    );
    let node = parser(ParserConfig::builder().depth_limit(1).build())
        .parse(&outer, BaseNode::root("r"));

    assert_eq!(node.depth(), 0);
    assert_eq!(node.child("name").unwrap().display_value(), Some("x"));
    let child = node.child("child").unwrap();
    assert_eq!(child.depth(), 1);
    assert!(child.is_depth_limited());
    assert!(child.children().is_empty());
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(5)]
fn no_node_deeper_than_limit(#[case] limit: usize) {
    let mut value = Value::seq(["leaf"]);
    for _ in 0..8 {
        value = Value::seq([value, Value::Int(0)]);
    }
    let config = ParserConfig::builder().depth_limit(limit as i64).build();
    let node = parser(config).parse(&value, BaseNode::root("v"));

    let mut deepest = 0;
    node.walk(&mut |visited| {
        deepest = deepest.max(visited.depth());
        if visited.depth() == limit && visited.type_class().is_composite() {
            assert!(visited.is_depth_limited(), "{}", visited.name());
            assert!(visited.children().is_empty());
        }
    });
    assert_eq!(deepest, limit);
}

#[test]
fn zero_depth_limit_is_unlimited() {
    let mut value = Value::Null;
    for _ in 0..20 {
        value = Value::seq([value]);
    }
    let node = parser(ParserConfig::unlimited()).parse(&value, BaseNode::root("v"));

    let mut deepest = 0;
    node.walk(&mut |visited| deepest = deepest.max(visited.depth()));
    assert_eq!(deepest, 20);
}

#[test]
fn nested_field_under_string_key_gets_composed_path() {
    let record = Value::record(Record::new("Item").with_public("f", 1));
    let value = Value::map([("k", record)]);
    let node = Parser::default().parse(&value, BaseNode::root("root"));

    let k = node.child("k").unwrap();
    assert_eq!(path_of(k), Some("root['k']"));
    assert_eq!(path_of(k.child("f").unwrap()), Some("root['k'].f"));
}

#[test]
fn base_without_path_gives_children_no_path() {
    let value = Value::seq([Value::seq([1])]);
    let node = Parser::default().parse(&value, BaseNode::new("anonymous"));

    node.walk(&mut |visited| assert_eq!(visited.access_path(), None));
}

#[test]
fn caller_visibility_decides_field_paths() {
    let value = Value::record(
        Record::new("Account")
            .with_parent("Entity")
            .with_field("owner", Visibility::Public, "ada")
            .with_field("balance", Visibility::Protected, 10)
            .with_field("pin", Visibility::Private, 1234)
            .with_field("label", Visibility::Virtual, "main"),
    );
    let paths = |caller: Option<&str>| {
        let config = ParserConfig {
            caller_class: caller.map(str::to_string),
            ..ParserConfig::default()
        };
        let node = parser(config).parse(&value, BaseNode::root("acct"));
        node.children()
            .iter()
            .map(|child| path_of(child).map(str::to_string))
            .collect::<Vec<_>>()
    };
    let some = |path: &str| Some(path.to_string());

    assert_eq!(
        paths(None),
        vec![some("acct.owner"), None, None, some("acct.label")]
    );
    assert_eq!(
        paths(Some("Entity")),
        vec![some("acct.owner"), some("acct.balance"), None, some("acct.label")]
    );
    assert_eq!(
        paths(Some("Account")),
        vec![
            some("acct.owner"),
            some("acct.balance"),
            some("acct.pin"),
            some("acct.label")
        ]
    );
}

#[test]
fn outline_of_mixed_value() {
    let value = Value::record(
        Record::new("User")
            .with_public("name", "ada")
            .with_field("secret", Visibility::Private, "s")
            .with_field("roles", Visibility::Protected, Value::seq(["a"]))
            .with_public(
                "meta",
                Value::map([
                    (MapKey::from("k'"), Value::Int(1)),
                    (MapKey::Int(2), Value::Bool(true)),
                ]),
            )
            .with_public("nothing", Value::Null)
            .with_public("log", Value::resource("file", 3)),
    );
    let node = Parser::default().parse(&value, BaseNode::root("u"));

    expect![[r#"
        u: User @ u
          name: string @ u.name
          secret: string @ -
          roles: sequence @ -
            0: string @ -
          meta: map @ u.meta
            k': int @ u.meta['k\'']
            2: bool @ u.meta[2]
          nothing: null @ u.nothing
          log: resource @ u.log
    "#]]
    .assert_eq(&outline(&node));
    assert_eq!(
        node.child("log").unwrap().display_value(),
        Some("file resource #3")
    );
    assert_eq!(node.child("secret").unwrap().visibility(), Some(Visibility::Private));
}

#[test]
fn parsing_leaves_values_untouched() {
    let cyclic = self_containing_seq();
    let value = Value::record(
        Record::new("Holder")
            .with_public("loop", cyclic.clone())
            .with_public("rows", Value::seq([Value::map([("a", 1)]), Value::map([("a", 2)])]))
            .with_public("json", r#"{"nested": [1, 2, 3]}"#),
    );
    let before = value.deep_copy();

    let registry = PluginRegistry::new()
        .with(BlacklistPlugin::new(["Secret"]))
        .with(TablePlugin)
        .with(JsonPlugin);
    let parser = Parser::new(ParserConfig::default(), registry).unwrap();
    let first = parser.parse(&value, BaseNode::root("h"));
    let second = parser.parse(&value, BaseNode::root("h"));

    assert_eq!(value, before);
    assert_eq!(first, second);
    if let Some(items) = cyclic.as_seq() {
        assert_eq!(items.borrow().len(), 1);
    }
}

#[test]
fn clean_copy_is_independent_of_original() {
    let nested = Value::seq([1]);
    let original = Value::map([("a", Value::Int(1)), ("b", nested.clone())]);
    let copy = clean_child_access(&original);

    assert_eq!(copy, original);
    assert_ne!(copy.identity(), original.identity());

    if let Some(entries) = copy.as_map() {
        entries.borrow_mut().insert(MapKey::from("c"), Value::Int(3));
    }
    assert_eq!(original.size(), Some(2));
    assert_eq!(copy.size(), Some(3));
    // nested composites stay shared
    let shared = copy.as_map().unwrap().borrow()[&MapKey::from("b")].identity();
    assert_eq!(shared, nested.identity());
}

#[rstest]
#[case(-1)]
#[case(i64::MIN)]
fn negative_depth_limit_is_rejected(#[case] limit: i64) {
    let config = ParserConfig::builder().depth_limit(limit).build();
    assert_eq!(
        Parser::new(config, PluginRegistry::new()).unwrap_err(),
        ConfigError::NegativeDepthLimit(limit)
    );
}

#[test]
fn config_deserializes_with_defaults() {
    let config: ParserConfig = serde_json::from_value(json!({"depth_limit": 2})).unwrap();
    let parser = Parser::new(config, PluginRegistry::new()).unwrap();
    assert_eq!(parser.config().max_depth(), Some(2));
    assert_eq!(parser.config().caller_class, None);
}
