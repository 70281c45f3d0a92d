//! The contract third-party plugins implement.

use crate::error::PluginError;
use crate::node::NodeMut;
use crate::parser::Traversal;
use crate::trigger::{Trigger, Triggers};
use crate::type_class::TypeClasses;
use crate::value::Value;

/// Hook into traversal at the points named by [`Plugin::triggers`] for the
/// classes named by [`Plugin::type_classes`].
///
/// Handlers receive the inspected value by shared reference and must not
/// mutate it, even though composites are interior-mutable. They may append
/// to the node, call [`Traversal::halt`], and call [`Traversal::parse`] for
/// sub-values they want described themselves. A handler that returns an
/// error or panics is isolated: its appends are rolled back and traversal
/// continues with the next plugin.
///
/// A panic inside a handler is reported as a [`crate::PluginDiagnostic`] and
/// is not printed by the panic hook. The first dispatch wraps the hook that is
/// installed at that point, so a custom hook should be set before parsing.
///
/// # Example
///
/// ```
/// use introspect_core::{
///     NodeMut, Plugin, PluginError, Representation, Traversal, Trigger, Triggers,
///     TypeClasses, Value,
/// };
///
/// struct Shout;
///
/// impl Plugin for Shout {
///     fn type_classes(&self) -> TypeClasses {
///         TypeClasses::STRING
///     }
///
///     fn triggers(&self) -> Triggers {
///         Triggers::SUCCESS
///     }
///
///     fn on_trigger(
///         &self,
///         value: &Value,
///         node: &mut NodeMut<'_>,
///         _trigger: Trigger,
///         _cx: &mut Traversal<'_>,
///     ) -> Result<(), PluginError> {
///         if let Some(text) = value.as_str() {
///             node.add_representation(Representation::text("shout", text.to_uppercase()))?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin {
    /// Name used in diagnostics and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn type_classes(&self) -> TypeClasses;

    fn triggers(&self) -> Triggers;

    fn on_trigger(
        &self,
        value: &Value,
        node: &mut NodeMut<'_>,
        trigger: Trigger,
        cx: &mut Traversal<'_>,
    ) -> Result<(), PluginError>;
}
