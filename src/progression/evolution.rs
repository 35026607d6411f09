use schema::EvolutionChainNode;

/// Find the stage that follows `current_species` in `chain_root`.
///
/// Pre-order depth-first search: the first node named `current_species` that
/// has children yields its first child. Children are visited in source order.
/// Returns `None` when the species is absent or already at its final stage.
///
/// The tree is owned, so it cannot contain cycles; the explicit stack only
/// keeps deep chains off the call stack.
pub fn find_next_evolution(chain_root: &EvolutionChainNode, current_species: &str) -> Option<String> {
    let mut stack = vec![chain_root];

    while let Some(node) = stack.pop() {
        if node.species_name == current_species {
            if let Some(next) = node.children.first() {
                return Some(next.species_name.clone());
            }
        }
        // Reverse so the first child is popped first
        stack.extend(node.children.iter().rev());
    }

    None
}
