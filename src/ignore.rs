//! Inert handlers for directives and roles that should not be checked.

use std::sync::Arc;

use tracing::debug;

use crate::rst::{Directive, DirectiveCall, Node, Registry, Role, RoleCall, State, SystemMessage};

/// Stub for directives whose markup is valid but not inspected.
///
/// Declares no arguments and no options, so everything after the marker is
/// swallowed as content.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoredDirective;

impl Directive for IgnoredDirective {
    fn has_content(&self) -> bool {
        true
    }

    fn run(&self, _call: &DirectiveCall<'_>, _state: &mut State<'_>) -> Vec<Node> {
        vec![]
    }
}

/// Stub for roles whose text is not inspected.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoredRole;

impl Role for IgnoredRole {
    fn run(&self, _call: &RoleCall<'_>) -> (Vec<Node>, Vec<SystemMessage>) {
        (vec![], vec![])
    }
}

/// Register every name in `directives` and `roles` as ignored.
///
/// Existing handlers for those names are replaced. Undo with
/// [`Registry::reset`].
pub fn ignore_directives_and_roles<D, R>(registry: &mut Registry, directives: D, roles: R)
where
    D: IntoIterator,
    D::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let directive: Arc<dyn Directive> = Arc::new(IgnoredDirective);
    let role: Arc<dyn Role> = Arc::new(IgnoredRole);

    let mut counts = (0, 0);
    for name in directives {
        registry.register_directive(name.as_ref(), directive.clone());
        counts.0 += 1;
    }
    for name in roles {
        registry.register_role(name.as_ref(), role.clone());
        counts.1 += 1;
    }
    debug!(directives = counts.0, roles = counts.1, "Registered ignored directives and roles");
}
