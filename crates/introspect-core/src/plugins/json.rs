use crate::error::PluginError;
use crate::node::{BaseNode, NodeMut};
use crate::parser::Traversal;
use crate::plugin::Plugin;
use crate::representation::Representation;
use crate::to_value::ToValue;
use crate::trigger::{Trigger, Triggers};
use crate::type_class::TypeClasses;
use crate::value::Value;

pub const JSON: &str = "json";

const DECODE_FN: &str = "json_decode";

/// Decodes strings holding a JSON object or array and attaches the decoded
/// tree.
///
/// The decoded value is parsed through the same traversal, so it is subject
/// to the depth limit and to the other registered plugins.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPlugin;

impl JsonPlugin {
    fn decode(text: &str) -> Option<serde_json::Value> {
        let trimmed = text.trim();
        if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }
}

impl Plugin for JsonPlugin {
    fn name(&self) -> &str {
        "json"
    }

    fn type_classes(&self) -> TypeClasses {
        TypeClasses::STRING
    }

    fn triggers(&self) -> Triggers {
        Triggers::SUCCESS
    }

    fn on_trigger(
        &self,
        value: &Value,
        node: &mut NodeMut<'_>,
        _trigger: Trigger,
        cx: &mut Traversal<'_>,
    ) -> Result<(), PluginError> {
        let Some(decoded) = value.as_str().and_then(Self::decode) else {
            return Ok(());
        };
        let decoded = decoded.to_value();

        let mut base = BaseNode::new(DECODE_FN).at_depth(node.depth());
        base.access_path = node.access_path().map(|path| path.wrap(DECODE_FN));

        let tree = cx.parse(&decoded, base);
        node.add_representation(Representation::node(JSON, tree))?;
        node.add_hint(JSON);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DescriptionNode;
    use crate::parser::Parser;
    use crate::path::AccessPath;
    use crate::registry::PluginRegistry;
    use crate::ParserConfig;
    use rstest::rstest;

    fn parse(value: &Value, config: ParserConfig) -> DescriptionNode {
        let registry = PluginRegistry::new().with(JsonPlugin);
        Parser::new(config, registry)
            .unwrap()
            .parse(value, BaseNode::root("payload"))
    }

    #[test]
    fn object_strings_get_a_decoded_tree() {
        let node = parse(&Value::from(r#" {"a": [1, 2]} "#), ParserConfig::default());

        assert!(node.has_hint(JSON));
        let decoded = node.representation(JSON).unwrap().contents().as_node().unwrap();
        assert_eq!(decoded.depth(), 0);
        let second = &decoded.child("a").unwrap().children()[1];
        assert_eq!(
            second.access_path().map(AccessPath::as_str),
            Some("json_decode(payload)['a'][1]")
        );
        assert_eq!(second.display_value(), Some("2"));
        // the string itself still shows its raw text
        assert_eq!(node.display_value(), Some(r#" {"a": [1, 2]} "#));
    }

    #[rstest]
    #[case("plain text")]
    #[case("42")]
    #[case("{not json")]
    #[case("")]
    fn other_strings_are_left_alone(#[case] text: &str) {
        let node = parse(&Value::from(text), ParserConfig::default());
        assert!(!node.has_hint(JSON));
        assert!(node.representation(JSON).is_none());
    }

    #[test]
    fn decoded_tree_respects_the_depth_limit() {
        let list = Value::seq([Value::from("[[1]]")]);
        let registry = PluginRegistry::new().with(JsonPlugin);
        let config = ParserConfig::builder().depth_limit(2).build();
        let node = Parser::new(config, registry)
            .unwrap()
            .parse(&list, BaseNode::root("l"));

        let decoded = node.children()[0]
            .representation(JSON)
            .unwrap()
            .contents()
            .as_node()
            .unwrap();
        assert_eq!(decoded.depth(), 1);
        assert!(decoded.children()[0].is_depth_limited());
    }
}
