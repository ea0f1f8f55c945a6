use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::basis::{self, NodalBasis};
use crate::elements::Element;
use crate::error::ElementError;
use crate::quadrature::{self, CubeDomain, QuadraturePoint};

/// Edges of the reference tetrahedron, opposite-vertex order
pub const TET_EDGES: [(usize, usize); 6] = [(2, 3), (1, 3), (1, 2), (0, 3), (0, 2), (0, 1)];

/// Edges of the reference hexahedron, lexicographic in vertex pairs
pub const HEX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (0, 2),
    (0, 4),
    (1, 3),
    (1, 5),
    (2, 3),
    (2, 6),
    (3, 7),
    (4, 5),
    (4, 6),
    (5, 7),
    (6, 7),
];

/// Variational element families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariationalElementKind {
    /// Linear Lagrange tetrahedron
    P1Tetrahedron,
    /// Quadratic Lagrange tetrahedron
    P2Tetrahedron,
    /// Trilinear Lagrange hexahedron
    Q1Hexahedron,
    /// Quadratic serendipity hexahedron
    S2Hexahedron,
}

impl VariationalElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::P1Tetrahedron => "P1-tetrahedron",
            Self::P2Tetrahedron => "P2-tetrahedron",
            Self::Q1Hexahedron => "Q1-hexahedron",
            Self::S2Hexahedron => "S2-hexahedron",
        }
    }

    pub fn num_nodes(&self) -> usize {
        match self {
            Self::P1Tetrahedron => 4,
            Self::P2Tetrahedron => 10,
            Self::Q1Hexahedron => 8,
            Self::S2Hexahedron => 20,
        }
    }

    pub fn is_simplex(&self) -> bool {
        matches!(self, Self::P1Tetrahedron | Self::P2Tetrahedron)
    }

    /// Quadrature degree integrating the stiffness of the matching native element
    /// with the same points.
    pub fn default_quadrature_degree(&self) -> usize {
        match self {
            Self::P1Tetrahedron => 1,
            Self::P2Tetrahedron | Self::Q1Hexahedron => 2,
            Self::S2Hexahedron => 4,
        }
    }

    /// Node coordinates on the reference cell: vertices, then edge midpoints.
    ///
    /// Tetrahedra live on the unit simplex, hexahedra on `[0, 1]³` with vertex
    /// `v = x + 2y + 4z`.
    pub fn reference_nodes(&self) -> Vec<Vector3<f64>> {
        let (vertices, edges): (Vec<Vector3<f64>>, &[(usize, usize)]) = if self.is_simplex() {
            let v = vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ];
            (v, &TET_EDGES)
        } else {
            let v = (0..8)
                .map(|i| Vector3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
                .collect();
            (v, &HEX_EDGES)
        };

        let mut nodes = vertices.clone();
        if matches!(self, Self::P2Tetrahedron | Self::S2Hexahedron) {
            nodes.extend(edges.iter().map(|&(a, b)| (vertices[a] + vertices[b]) * 0.5));
        }
        nodes
    }

    fn exponents(&self) -> Vec<basis::Exponents> {
        match self {
            Self::P1Tetrahedron => basis::total_degree(1),
            Self::P2Tetrahedron => basis::total_degree(2),
            Self::Q1Hexahedron => basis::tensor_degree(1),
            Self::S2Hexahedron => basis::serendipity_quadratic(),
        }
    }
}

/// Reference element of the variational backend
#[derive(Debug, Clone)]
pub struct VariationalElement {
    kind: VariationalElementKind,
    nodes: Vec<Vector3<f64>>,
    basis: NodalBasis,
    quadrature_degree: usize,
}

impl VariationalElement {
    pub fn new(kind: VariationalElementKind) -> Result<Self, ElementError> {
        let nodes = kind.reference_nodes();
        let basis = NodalBasis::new(kind.name(), &nodes, kind.exponents())?;
        Ok(Self {
            kind,
            nodes,
            basis,
            quadrature_degree: kind.default_quadrature_degree(),
        })
    }

    /// Override the quadrature degree
    pub fn with_quadrature_degree(mut self, degree: usize) -> Self {
        self.quadrature_degree = degree;
        self
    }

    pub fn kind(&self) -> VariationalElementKind {
        self.kind
    }

    pub fn quadrature_degree(&self) -> usize {
        self.quadrature_degree
    }
}

impl Element for VariationalElement {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn reference_nodes(&self) -> Vec<Vector3<f64>> {
        self.nodes.clone()
    }

    fn shape_functions(&self, xi: &Vector3<f64>) -> Vec<f64> {
        self.basis.values(xi)
    }

    fn shape_derivatives(&self, xi: &Vector3<f64>) -> Vec<Vector3<f64>> {
        self.basis.gradients(xi)
    }

    fn quadrature(&self) -> Vec<QuadraturePoint> {
        if self.kind.is_simplex() {
            quadrature::tetrahedron(self.quadrature_degree)
        } else {
            let n = quadrature::gauss_points_for_degree(self.quadrature_degree);
            quadrature::hexahedron(n, CubeDomain::Unit)
        }
    }
}
