use operation::{DirectiveRecord, Occurrence, SelectionNodeRecord, Variables};

/// `@skip` and `@include` evaluated left to right, the first one excluding the field wins.
pub(crate) fn is_included(directives: &[DirectiveRecord], variables: &Variables) -> bool {
    for directive in directives {
        let condition = directive.bool_argument("if", variables);
        match directive.name.as_str() {
            "skip" if condition == Some(true) => return false,
            "include" if condition == Some(false) => return false,
            _ => {}
        }
    }
    true
}

/// A field is present if any of the places it appears in includes it.
pub(crate) fn is_node_included(node: &SelectionNodeRecord, variables: &Variables) -> bool {
    node.occurrences
        .iter()
        .any(|occurrence| is_included(&occurrence.directives, variables))
}

/// A field is only deferred if every place including it defers it, otherwise the
/// non-deferred occurrence requires it in the initial response.
pub(crate) fn should_defer(node: &SelectionNodeRecord, variables: &Variables) -> bool {
    let mut included = included_occurrences(node, variables).peekable();
    included.peek().is_some() && included.all(|occurrence| has_active(occurrence, "defer", variables))
}

pub(crate) fn should_stream(node: &SelectionNodeRecord, variables: &Variables) -> bool {
    included_occurrences(node, variables).any(|occurrence| has_active(occurrence, "stream", variables))
}

fn included_occurrences<'a>(
    node: &'a SelectionNodeRecord,
    variables: &'a Variables,
) -> impl Iterator<Item = &'a Occurrence> + 'a {
    node.occurrences
        .iter()
        .filter(move |occurrence| is_included(&occurrence.directives, variables))
}

/// `@defer` and `@stream` apply unless their `if` argument is false.
fn has_active(occurrence: &Occurrence, name: &str, variables: &Variables) -> bool {
    occurrence
        .directives
        .iter()
        .any(|directive| directive.name == name && directive.bool_argument("if", variables) != Some(false))
}
