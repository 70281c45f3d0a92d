use crate::error::PluginError;
use crate::node::{DescriptionNode, NodeMut, TraversalState};
use crate::parser::Traversal;
use crate::plugin::Plugin;
use crate::representation::Representation;
use crate::trigger::{Trigger, Triggers};
use crate::type_class::{TypeClass, TypeClasses};
use crate::value::Value;

pub const TABLE: &str = "table";

/// Marks lists of uniform mappings as tabular.
///
/// Every child has to be a fully traversed mapping, and all of them have to
/// carry the same keys in the same order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TablePlugin;

impl TablePlugin {
    fn is_table(rows: &[DescriptionNode]) -> bool {
        let Some((first, rest)) = rows.split_first() else {
            return false;
        };
        if !is_row(first) {
            return false;
        }
        let columns = column_names(first);
        rest.iter()
            .all(|row| is_row(row) && column_names(row) == columns)
    }
}

fn is_row(node: &DescriptionNode) -> bool {
    node.type_class() == TypeClass::Mapping && node.state() == TraversalState::Complete
}

fn column_names(row: &DescriptionNode) -> Vec<&str> {
    row.children().iter().map(DescriptionNode::name).collect()
}

impl Plugin for TablePlugin {
    fn name(&self) -> &str {
        "table"
    }

    fn type_classes(&self) -> TypeClasses {
        TypeClasses::SEQUENCE | TypeClasses::MAPPING
    }

    fn triggers(&self) -> Triggers {
        Triggers::SUCCESS
    }

    fn on_trigger(
        &self,
        _value: &Value,
        node: &mut NodeMut<'_>,
        _trigger: Trigger,
        _cx: &mut Traversal<'_>,
    ) -> Result<(), PluginError> {
        if !Self::is_table(node.children()) {
            return Ok(());
        }
        let rows = node.children().to_vec();
        node.add_representation(Representation::nodes(TABLE, rows))?;
        node.add_hint(TABLE);
        Ok(())
    }
}
