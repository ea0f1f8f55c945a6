//! Surface tractions and conversion to equivalent nodal forces.
//!
//! A constant traction `t` (force per unit reference area) on a set of boundary
//! facets is turned into nodal forces `f_a = ∫ N_a t dA` by integrating the face
//! shape functions over each facet in the rest configuration. The loads are dead
//! loads: they do not follow the deformation.

use nalgebra::{DVector, Vector2, Vector3};

use crate::error::{Result, SolverError};
use crate::mesh::{DOFS_PER_NODE, FaceKind, Mesh};
use crate::quadrature::{self, FacePoint};
use crate::sets::Facet;

const QUAD_CORNERS: [[f64; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

const QUAD_EDGES: [[f64; 2]; 4] = [[0.0, -1.0], [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]];

const TRI_EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];

/// Face shape functions and their `(s, t)` derivatives
pub fn face_shape(kind: FaceKind, st: &Vector2<f64>) -> (Vec<f64>, Vec<Vector2<f64>>) {
    let (s, t) = (st.x, st.y);
    match kind {
        FaceKind::Tri3 => (
            vec![1.0 - s - t, s, t],
            vec![Vector2::new(-1.0, -1.0), Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0)],
        ),
        FaceKind::Tri6 => {
            let l = [1.0 - s - t, s, t];
            let dl = [Vector2::new(-1.0, -1.0), Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0)];
            let mut n: Vec<f64> = l.iter().map(|&li| li * (2.0 * li - 1.0)).collect();
            let mut dn: Vec<Vector2<f64>> = (0..3).map(|i| dl[i] * (4.0 * l[i] - 1.0)).collect();
            for &(a, b) in &TRI_EDGES {
                n.push(4.0 * l[a] * l[b]);
                dn.push((dl[a] * l[b] + dl[b] * l[a]) * 4.0);
            }
            (n, dn)
        }
        FaceKind::Quad4 => QUAD_CORNERS
            .iter()
            .map(|c| {
                let (a, b) = (1.0 + s * c[0], 1.0 + t * c[1]);
                (0.25 * a * b, Vector2::new(c[0] * b, a * c[1]) * 0.25)
            })
            .unzip(),
        FaceKind::Quad8 => {
            let corners = QUAD_CORNERS.iter().map(|c| {
                let (a, b) = (1.0 + s * c[0], 1.0 + t * c[1]);
                let m = s * c[0] + t * c[1] - 1.0;
                (
                    0.25 * a * b * m,
                    Vector2::new(c[0] * b * (m + a), c[1] * a * (m + b)) * 0.25,
                )
            });
            let edges = QUAD_EDGES.iter().map(|e| {
                if e[0] == 0.0 {
                    let b = 1.0 + t * e[1];
                    (0.5 * (1.0 - s * s) * b, Vector2::new(-s * b, 0.5 * (1.0 - s * s) * e[1]))
                } else {
                    let a = 1.0 + s * e[0];
                    (0.5 * a * (1.0 - t * t), Vector2::new(0.5 * e[0] * (1.0 - t * t), -t * a))
                }
            });
            corners.chain(edges).unzip()
        }
    }
}

fn face_rule(kind: FaceKind, degree: usize) -> Vec<FacePoint> {
    match kind {
        FaceKind::Tri3 | FaceKind::Tri6 => quadrature::triangle(degree),
        FaceKind::Quad4 | FaceKind::Quad8 => quadrature::quadrilateral(degree),
    }
}

/// Converter for transforming surface tractions into equivalent nodal forces
pub struct DistributedLoadConverter<'a> {
    mesh: &'a Mesh,
    quadrature_degree: usize,
}

impl<'a> DistributedLoadConverter<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            quadrature_degree: 2,
        }
    }

    pub fn with_quadrature_degree(mut self, degree: usize) -> Self {
        self.quadrature_degree = degree;
        self
    }

    /// Nodal forces of one facet, in facet node order
    pub fn facet_forces(&self, facet: &Facet, traction: &Vector3<f64>) -> Result<Vec<Vector3<f64>>> {
        let coords = facet
            .nodes
            .iter()
            .map(|&n| {
                self.mesh
                    .get_node(n)
                    .map(|node| node.position())
                    .ok_or_else(|| SolverError::Mesh(format!("facet references missing node {}", n)))
            })
            .collect::<Result<Vec<_>>>()?;
        if coords.len() != facet.kind.num_nodes() {
            return Err(SolverError::Mesh(format!(
                "{:?} facet with {} nodes",
                facet.kind,
                coords.len()
            )));
        }

        let mut forces = vec![Vector3::zeros(); coords.len()];
        for qp in face_rule(facet.kind, self.quadrature_degree) {
            let (n, dn) = face_shape(facet.kind, &qp.st);
            let mut xs = Vector3::zeros();
            let mut xt = Vector3::zeros();
            for (x, d) in coords.iter().zip(&dn) {
                xs += x * d.x;
                xt += x * d.y;
            }
            let da = xs.cross(&xt).norm() * qp.weight;
            for (f, &na) in forces.iter_mut().zip(&n) {
                *f += traction * (na * da);
            }
        }
        Ok(forces)
    }

    /// Global nodal force vector of a traction applied on `facets`
    pub fn traction_forces<'f, I>(&self, facets: I, traction: &Vector3<f64>) -> Result<DVector<f64>>
    where
        I: IntoIterator<Item = &'f Facet>,
    {
        let mut force = DVector::zeros(self.mesh.nodes.len() * DOFS_PER_NODE);
        for facet in facets {
            let nodal = self.facet_forces(facet, traction)?;
            for (&node, f) in facet.nodes.iter().zip(&nodal) {
                for c in 0..DOFS_PER_NODE {
                    force[DOFS_PER_NODE * node + c] += f[c];
                }
            }
        }
        Ok(force)
    }
}
