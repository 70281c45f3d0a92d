use std::fmt;
use std::rc::Rc;

use crate::plugin::Plugin;
use crate::trigger::Trigger;
use crate::type_class::TypeClass;

/// Ordered plugin collection handed to a [`Parser`](crate::Parser).
///
/// Registration order is dispatch order. The same plugin may be registered
/// more than once and then runs once per registration.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Rc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: impl Plugin + 'static) -> &mut Self {
        self.register_shared(Rc::new(plugin))
    }

    /// Registers an already shared plugin, e.g. one the caller keeps a handle
    /// to for inspecting its own state afterwards.
    pub fn register_shared(&mut self, plugin: Rc<dyn Plugin>) -> &mut Self {
        tracing::debug!(
            plugin = plugin.name(),
            position = self.plugins.len(),
            "plugin registered"
        );
        self.plugins.push(plugin);
        self
    }

    pub fn with(mut self, plugin: impl Plugin + 'static) -> Self {
        self.register(plugin);
        self
    }

    /// Plugins that apply to `class` and fire on `trigger`, in registration
    /// order.
    pub fn plugins_for(
        &self,
        class: TypeClass,
        trigger: Trigger,
    ) -> impl Iterator<Item = &Rc<dyn Plugin>> + '_ {
        self.plugins.iter().filter(move |plugin| {
            plugin.type_classes().includes(class) && plugin.triggers().fires_on(trigger)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<dyn Plugin>> + '_ {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|plugin| plugin.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::node::NodeMut;
    use crate::parser::Traversal;
    use crate::trigger::Triggers;
    use crate::type_class::TypeClasses;
    use crate::value::Value;

    struct Probe {
        name: &'static str,
        classes: TypeClasses,
        triggers: Triggers,
    }

    impl Plugin for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn type_classes(&self) -> TypeClasses {
            self.classes
        }

        fn triggers(&self) -> Triggers {
            self.triggers
        }

        fn on_trigger(
            &self,
            _value: &Value,
            _node: &mut NodeMut<'_>,
            _trigger: Trigger,
            _cx: &mut Traversal<'_>,
        ) -> Result<(), PluginError> {
            Ok(())
        }
    }

    fn probe(name: &'static str, classes: TypeClasses, triggers: Triggers) -> Probe {
        Probe {
            name,
            classes,
            triggers,
        }
    }

    fn names<'a>(plugins: impl Iterator<Item = &'a Rc<dyn Plugin>>) -> Vec<String> {
        plugins.map(|plugin| plugin.name().to_string()).collect()
    }

    #[test]
    fn filters_by_class_and_trigger_in_registration_order() {
        let registry = PluginRegistry::new()
            .with(probe("strings", TypeClasses::STRING, Triggers::SUCCESS))
            .with(probe("any-begin", TypeClasses::all(), Triggers::BEGIN))
            .with(probe("records", TypeClasses::RECORD, Triggers::COMPLETE))
            .with(probe("any-success", TypeClasses::all(), Triggers::SUCCESS));

        assert_eq!(
            names(registry.plugins_for(TypeClass::String, Trigger::Success)),
            vec!["strings", "any-success"]
        );
        assert_eq!(
            names(registry.plugins_for(TypeClass::Record, Trigger::DepthLimit)),
            vec!["records"]
        );
        assert_eq!(
            names(registry.plugins_for(TypeClass::Integer, Trigger::Begin)),
            vec!["any-begin"]
        );
        assert!(
            registry
                .plugins_for(TypeClass::Mapping, Trigger::RecursionLimit)
                .next()
                .is_none()
        );
    }

    #[test]
    fn duplicate_registrations_are_kept() {
        let shared: Rc<dyn Plugin> =
            Rc::new(probe("twice", TypeClasses::all(), Triggers::BEGIN));
        let mut registry = PluginRegistry::new();
        registry
            .register_shared(Rc::clone(&shared))
            .register_shared(shared);

        assert_eq!(registry.len(), 2);
        assert_eq!(
            names(registry.plugins_for(TypeClass::Null, Trigger::Begin)),
            vec!["twice", "twice"]
        );
    }
}
