//! Mesh data structures for the beam studies.
//!
//! Nodes are stored densely: the position of a node in `Mesh::nodes` is its
//! index in element connectivity and its DOF block (`3 * index + component`).
//! Element connectivity follows VTK local node order.

use std::collections::HashMap;

use beam_io::CellKind;
use nalgebra::Vector3;

use crate::error::SolverError;

/// Displacement components per node
pub const DOFS_PER_NODE: usize = 3;

/// A node in the finite element mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node index (0-based, equals position in the node list)
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Node {
    pub fn new(id: usize, x: f64, y: f64, z: f64) -> Self {
        Self { id, x, y, z }
    }

    /// Get coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Boundary face shapes of the supported volume elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKind {
    /// 3-node triangle
    Tri3,
    /// 6-node triangle: corners, then edges (0,1), (1,2), (2,0)
    Tri6,
    /// 4-node quadrilateral, corners in cyclic order
    Quad4,
    /// 8-node quadrilateral: corners, then edges (0,1), (1,2), (2,3), (3,0)
    Quad8,
}

impl FaceKind {
    pub fn num_nodes(&self) -> usize {
        match self {
            FaceKind::Tri3 => 3,
            FaceKind::Tri6 => 6,
            FaceKind::Quad4 => 4,
            FaceKind::Quad8 => 8,
        }
    }

    pub fn num_corners(&self) -> usize {
        match self {
            FaceKind::Tri3 | FaceKind::Tri6 => 3,
            FaceKind::Quad4 | FaceKind::Quad8 => 4,
        }
    }
}

const TET4_FACES: [&[usize]; 4] = [&[0, 2, 1], &[0, 1, 3], &[1, 2, 3], &[0, 3, 2]];

const TET10_FACES: [&[usize]; 4] = [
    &[0, 2, 1, 6, 5, 4],
    &[0, 1, 3, 4, 8, 7],
    &[1, 2, 3, 5, 9, 8],
    &[0, 3, 2, 7, 9, 6],
];

const HEX8_FACES: [&[usize]; 6] = [
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 0, 4, 7],
];

const HEX20_FACES: [&[usize]; 6] = [
    &[0, 3, 2, 1, 11, 10, 9, 8],
    &[4, 5, 6, 7, 12, 13, 14, 15],
    &[0, 1, 5, 4, 8, 17, 12, 16],
    &[1, 2, 6, 5, 9, 18, 13, 17],
    &[2, 3, 7, 6, 10, 19, 14, 18],
    &[3, 0, 4, 7, 11, 16, 15, 19],
];

/// Element type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 4-node tetrahedral element (C3D4)
    C3D4,
    /// 10-node tetrahedral element (C3D10)
    C3D10,
    /// 8-node brick element (C3D8)
    C3D8,
    /// 20-node brick element (C3D20)
    C3D20,
}

impl ElementType {
    /// Get the number of nodes for this element type
    pub fn num_nodes(&self) -> usize {
        match self {
            ElementType::C3D4 => 4,
            ElementType::C3D10 => 10,
            ElementType::C3D8 => 8,
            ElementType::C3D20 => 20,
        }
    }

    /// Get the number of degrees of freedom per node for this element type
    pub fn dofs_per_node(&self) -> usize {
        DOFS_PER_NODE
    }

    pub fn from_cell_kind(kind: CellKind) -> Self {
        match kind {
            CellKind::Tetra => ElementType::C3D4,
            CellKind::Tetra10 => ElementType::C3D10,
            CellKind::Hexahedron => ElementType::C3D8,
            CellKind::Hexahedron20 => ElementType::C3D20,
        }
    }

    pub fn cell_kind(&self) -> CellKind {
        match self {
            ElementType::C3D4 => CellKind::Tetra,
            ElementType::C3D10 => CellKind::Tetra10,
            ElementType::C3D8 => CellKind::Hexahedron,
            ElementType::C3D20 => CellKind::Hexahedron20,
        }
    }

    /// Boundary faces as local node lists (corners first, then edge nodes).
    pub fn faces(&self) -> (FaceKind, &'static [&'static [usize]]) {
        match self {
            ElementType::C3D4 => (FaceKind::Tri3, &TET4_FACES),
            ElementType::C3D10 => (FaceKind::Tri6, &TET10_FACES),
            ElementType::C3D8 => (FaceKind::Quad4, &HEX8_FACES),
            ElementType::C3D20 => (FaceKind::Quad8, &HEX20_FACES),
        }
    }
}

/// An element in the finite element mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element index (0-based)
    pub id: usize,
    pub element_type: ElementType,
    /// Node connectivity (node indices, VTK order)
    pub nodes: Vec<usize>,
}

impl Element {
    pub fn new(id: usize, element_type: ElementType, nodes: Vec<usize>) -> Self {
        Self {
            id,
            element_type,
            nodes,
        }
    }

    /// Validate that the element has the correct number of nodes
    pub fn validate(&self) -> Result<(), SolverError> {
        let expected = self.element_type.num_nodes();
        let actual = self.nodes.len();
        if actual != expected {
            return Err(SolverError::Mesh(format!(
                "element {} of type {:?} has {} nodes but expected {}",
                self.id, self.element_type, actual, expected
            )));
        }
        Ok(())
    }
}

/// Complete finite element mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    /// Total number of degrees of freedom
    pub num_dofs: usize,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node; its index becomes `nodes.len()` before the push.
    pub fn add_node(&mut self, x: f64, y: f64, z: f64) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, x, y, z));
        id
    }

    /// Append an element after checking its node count.
    pub fn add_element(
        &mut self,
        element_type: ElementType,
        nodes: Vec<usize>,
    ) -> Result<usize, SolverError> {
        let id = self.elements.len();
        let element = Element::new(id, element_type, nodes);
        element.validate()?;
        self.elements.push(element);
        Ok(id)
    }

    pub fn get_node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Calculate total degrees of freedom (3 per node)
    pub fn calculate_dofs(&mut self) {
        self.num_dofs = self.nodes.len() * DOFS_PER_NODE;
    }

    /// Check that all element nodes exist and every node count is right.
    pub fn validate(&self) -> Result<(), SolverError> {
        for element in &self.elements {
            element.validate()?;
            if let Some(&missing) = element.nodes.iter().find(|&&n| n >= self.nodes.len()) {
                return Err(SolverError::Mesh(format!(
                    "element {} references non-existent node {}",
                    element.id, missing
                )));
            }
        }
        Ok(())
    }

    /// Node positions in index order
    pub fn positions(&self) -> Vec<Vector3<f64>> {
        self.nodes.iter().map(Node::position).collect()
    }

    /// Connectivity of every element, in element order
    pub fn connectivity(&self) -> Vec<Vec<usize>> {
        self.elements.iter().map(|e| e.nodes.clone()).collect()
    }

    /// The single element type of the mesh, if it is homogeneous.
    pub fn uniform_element_type(&self) -> Option<ElementType> {
        let first = self.elements.first()?.element_type;
        self.elements
            .iter()
            .all(|e| e.element_type == first)
            .then_some(first)
    }

    pub fn statistics(&self) -> MeshStatistics {
        let mut element_type_counts = HashMap::new();
        for element in &self.elements {
            *element_type_counts.entry(element.element_type).or_insert(0) += 1;
        }

        MeshStatistics {
            num_nodes: self.nodes.len(),
            num_elements: self.elements.len(),
            num_dofs: self.num_dofs,
            element_type_counts,
        }
    }
}

/// Mesh statistics for reporting
#[derive(Debug, Clone)]
pub struct MeshStatistics {
    pub num_nodes: usize,
    pub num_elements: usize,
    pub num_dofs: usize,
    pub element_type_counts: HashMap<ElementType, usize>,
}

impl MeshStatistics {
    /// Format as a human-readable string
    pub fn format(&self) -> String {
        let mut lines = vec![
            format!("Nodes: {}", self.num_nodes),
            format!("Elements: {}", self.num_elements),
            format!("DOFs: {}", self.num_dofs),
        ];

        if !self.element_type_counts.is_empty() {
            lines.push("Element types:".to_string());
            let mut types: Vec<_> = self.element_type_counts.iter().collect();
            types.sort_by_key(|(k, _)| format!("{:?}", k));
            for (elem_type, count) in types {
                lines.push(format!("  {:?}: {}", elem_type, count));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_num_nodes() {
        assert_eq!(ElementType::C3D8.num_nodes(), 8);
        assert_eq!(ElementType::C3D20.num_nodes(), 20);
        assert_eq!(ElementType::C3D4.num_nodes(), 4);
        assert_eq!(ElementType::C3D10.num_nodes(), 10);
    }

    #[test]
    fn face_tables_match_face_kinds() {
        for t in [
            ElementType::C3D4,
            ElementType::C3D10,
            ElementType::C3D8,
            ElementType::C3D20,
        ] {
            let (kind, faces) = t.faces();
            for face in faces {
                assert_eq!(face.len(), kind.num_nodes());
                assert!(face.iter().all(|&n| n < t.num_nodes()));
            }
            assert_eq!(ElementType::from_cell_kind(t.cell_kind()), t);
        }
    }

    #[test]
    fn every_hex20_edge_node_lies_on_two_faces() {
        let (_, faces) = ElementType::C3D20.faces();
        for node in 8..20 {
            let count = faces.iter().filter(|f| f.contains(&node)).count();
            assert_eq!(count, 2, "edge node {}", node);
        }
    }

    #[test]
    fn element_validation() {
        let elem = Element::new(0, ElementType::C3D8, (0..8).collect());
        assert!(elem.validate().is_ok());

        let bad_elem = Element::new(1, ElementType::C3D8, vec![0, 1, 2]);
        assert!(bad_elem.validate().is_err());
    }

    #[test]
    fn mesh_validates_element_nodes() {
        let mut mesh = Mesh::new();
        for i in 0..3 {
            mesh.add_node(i as f64, 0.0, 0.0);
        }
        mesh.add_element(ElementType::C3D4, vec![0, 1, 2, 3]).unwrap();

        let err = mesh.validate().unwrap_err();
        assert!(err.to_string().contains("non-existent node 3"));
    }

    #[test]
    fn mesh_statistics() {
        let mut mesh = Mesh::new();
        for i in 0..8 {
            mesh.add_node(i as f64, 0.0, 0.0);
        }
        mesh.add_element(ElementType::C3D8, (0..8).collect()).unwrap();
        mesh.calculate_dofs();

        let stats = mesh.statistics();
        assert_eq!(stats.num_nodes, 8);
        assert_eq!(stats.num_elements, 1);
        assert_eq!(stats.num_dofs, 24);
        assert_eq!(stats.element_type_counts.get(&ElementType::C3D8), Some(&1));
        assert_eq!(mesh.uniform_element_type(), Some(ElementType::C3D8));
    }
}
