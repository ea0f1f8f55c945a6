/// Element factory for creating reference elements from mesh element types
///
/// Force fields work against `dyn Element`, so the concrete element is picked once
/// per mesh and shared by every cell of that type.
use super::{C3D4, C3D8, C3D10, C3D20, Element};
use crate::mesh::ElementType;

/// Create the native reference element for `element_type`
pub fn native_element(element_type: ElementType) -> Box<dyn Element> {
    match element_type {
        ElementType::C3D4 => Box::new(C3D4),
        ElementType::C3D10 => Box::new(C3D10),
        ElementType::C3D8 => Box::new(C3D8),
        ElementType::C3D20 => Box::new(C3D20),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_matches_mesh_node_counts() {
        for t in [
            ElementType::C3D4,
            ElementType::C3D10,
            ElementType::C3D8,
            ElementType::C3D20,
        ] {
            let elem = native_element(t);
            assert_eq!(elem.num_nodes(), t.num_nodes());
            assert_eq!(elem.name(), format!("{:?}", t));
            assert_eq!(elem.global_dof_indices(&vec![0; t.num_nodes()]).len(), 3 * t.num_nodes());
        }
    }
}
