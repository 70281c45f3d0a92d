use indexmap::IndexSet;

use crate::error::PluginError;
use crate::node::NodeMut;
use crate::parser::Traversal;
use crate::plugin::Plugin;
use crate::representation::Representation;
use crate::trigger::{Trigger, Triggers};
use crate::type_class::TypeClasses;
use crate::value::Value;

pub const BLACKLIST: &str = "blacklist";

/// Refuses to descend into records of the listed classes (or their
/// subclasses), leaving only the class name behind.
#[derive(Debug, Clone, Default)]
pub struct BlacklistPlugin {
    classes: IndexSet<String>,
}

impl BlacklistPlugin {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_blacklisted(&self, value: &Value) -> bool {
        value.as_record().is_some_and(|record| {
            let record = record.borrow();
            self.classes.iter().any(|class| record.is_a(class))
        })
    }
}

impl Plugin for BlacklistPlugin {
    fn name(&self) -> &str {
        "blacklist"
    }

    fn type_classes(&self) -> TypeClasses {
        TypeClasses::RECORD
    }

    fn triggers(&self) -> Triggers {
        Triggers::BEGIN
    }

    fn on_trigger(
        &self,
        value: &Value,
        node: &mut NodeMut<'_>,
        _trigger: Trigger,
        cx: &mut Traversal<'_>,
    ) -> Result<(), PluginError> {
        if !self.is_blacklisted(value) {
            return Ok(());
        }
        let class = node.type_name().to_string();
        node.add_representation(Representation::text(BLACKLIST, class))?;
        node.add_hint(BLACKLIST);
        cx.halt();
        Ok(())
    }
}
