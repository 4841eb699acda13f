use crate::mapping::EntityFamily;
use crate::model::Direction;

/// Target types used when an unmapped entity is recognized by its type name.
/// Node-graph type first.
const FAMILY_TARGETS: &[(EntityFamily, &str, &str)] = &[
    (EntityFamily::Branching, "switch", "builtin:BasicRouter"),
    (EntityFamily::Webhook, "webhook", "gateway:CustomWebHook"),
    (EntityFamily::Code, "code", "code:ExecuteCode"),
    (EntityFamily::Note, "sticky-note", "builtin:Note"),
];

/// Recognizes an unmapped type by its name and picks a target type for it.
///
/// Returns `None` when the type belongs to no known family; the caller then
/// falls back to a placeholder.
pub fn recognize(entity_type: &str, direction: Direction) -> Option<(EntityFamily, &'static str)> {
    let family = EntityFamily::of_known_type(entity_type)
        .filter(|f| target_for(*f, direction).is_some())
        .or_else(|| EntityFamily::guess(entity_type))?;
    target_for(family, direction).map(|t| (family, t))
}

/// The type a synthesized entity of `family` gets on the target platform.
pub fn target_for(family: EntityFamily, direction: Direction) -> Option<&'static str> {
    FAMILY_TARGETS
        .iter()
        .find(|(f, _, _)| *f == family)
        .map(|(_, node, module)| match direction {
            Direction::Forward => *module,
            Direction::Reverse => *node,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_known_and_guessed_types() {
        assert_eq!(
            recognize("if", Direction::Forward),
            Some((EntityFamily::Branching, "builtin:BasicRouter"))
        );
        assert_eq!(
            recognize("gateway:CustomMailHook", Direction::Reverse),
            Some((EntityFamily::Webhook, "webhook"))
        );
        assert_eq!(
            recognize("acme:PythonScript", Direction::Forward),
            Some((EntityFamily::Code, "code:ExecuteCode"))
        );
        assert_eq!(recognize("httpRequest", Direction::Forward), None);
        assert_eq!(recognize("custom:Weirdo", Direction::Forward), None);
    }
}
