//! Builder for boundary conditions from node sets and tagged facets.

use nalgebra::Vector3;

use crate::boundary_conditions::{BoundaryConditions, ConcentratedLoad, DisplacementBC};
use crate::distributed_loads::DistributedLoadConverter;
use crate::error::{Result, SolverError};
use crate::mesh::Mesh;
use crate::sets::{FacetTags, NodeSet};

/// Builds boundary conditions on one mesh, collecting problems until [`BCBuilder::build`].
pub struct BCBuilder<'a> {
    mesh: &'a Mesh,
    bcs: BoundaryConditions,
    errors: Vec<String>,
}

impl<'a> BCBuilder<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            bcs: BoundaryConditions::new(),
            errors: Vec::new(),
        }
    }

    fn check_nodes(&mut self, what: &str, nodes: &[usize]) -> bool {
        if nodes.is_empty() {
            self.errors.push(format!("{}: empty node set", what));
            return false;
        }
        let num_nodes = self.mesh.nodes.len();
        if let Some(&bad) = nodes.iter().find(|&&n| n >= num_nodes) {
            self.errors.push(format!(
                "{}: node {} out of range (mesh has {} nodes)",
                what, bad, num_nodes
            ));
            return false;
        }
        true
    }

    /// Clamp every component of the nodes in `set`
    pub fn fix_set(mut self, set: &NodeSet) -> Self {
        if self.check_nodes(&set.name, &set.nodes) {
            for &node in &set.nodes {
                self.bcs.add_displacement_bc(DisplacementBC::fixed(node));
            }
        }
        self
    }

    /// Clamp every node on the facets carrying `tag`
    pub fn fix_tagged(self, tags: &FacetTags, tag: i32) -> Self {
        let set = NodeSet::new(format!("facet tag {}", tag), tags.nodes(tag));
        self.fix_set(&set)
    }

    /// Apply `force` at every node in `set`
    pub fn load_nodes(mut self, set: &NodeSet, force: Vector3<f64>) -> Self {
        if self.check_nodes(&set.name, &set.nodes) {
            for &node in &set.nodes {
                self.bcs.add_concentrated_load(ConcentratedLoad::new(node, force));
            }
        }
        self
    }

    /// Dead-load traction on the facets carrying `tag`
    pub fn traction(mut self, tags: &FacetTags, tag: i32, traction: Vector3<f64>, degree: usize) -> Self {
        let facets = tags.find(tag);
        if facets.is_empty() {
            self.errors.push(format!("traction: no facets tagged {}", tag));
            return self;
        }
        match DistributedLoadConverter::new(self.mesh)
            .with_quadrature_degree(degree)
            .traction_forces(facets, &traction)
        {
            Ok(forces) => self.bcs.add_surface_load(forces),
            Err(e) => self.errors.push(format!("traction on tag {}: {}", tag, e)),
        }
        self
    }

    /// Get reference to the boundary conditions built so far
    pub fn bcs(&self) -> &BoundaryConditions {
        &self.bcs
    }

    /// Finish, failing if any step reported a problem
    pub fn build(self) -> Result<BoundaryConditions> {
        if !self.errors.is_empty() {
            return Err(SolverError::Mesh(format!(
                "BC building encountered {} errors:\n{}",
                self.errors.len(),
                self.errors.join("\n")
            )));
        }
        Ok(self.bcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ElementType;
    use crate::sets::{boundary_facets, locate_boundary_facets};
    use approx::assert_relative_eq;

    fn brick() -> Mesh {
        let mut mesh = Mesh::new();
        for z in [0.0, 2.0] {
            for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                mesh.add_node(x, y, z);
            }
        }
        mesh.add_element(ElementType::C3D8, (0..8).collect()).unwrap();
        mesh.calculate_dofs();
        mesh
    }

    #[test]
    fn fixed_set_and_nodal_force() {
        let mesh = brick();
        let bcs = BCBuilder::new(&mesh)
            .fix_set(&NodeSet::new("bottom", vec![0, 1, 2, 3]))
            .load_nodes(&NodeSet::new("top", vec![4, 5, 6, 7]), Vector3::new(0.0, -2.0, 0.0))
            .build()
            .unwrap();
        assert_eq!(bcs.constrained_dofs(24), (0..12).collect::<Vec<_>>());
        let f = bcs.load_vector(24);
        assert_relative_eq!(f[13], -2.0);
        assert_relative_eq!(f.sum(), -8.0);
    }

    #[test]
    fn tagged_faces() {
        let mesh = brick();
        let boundary = boundary_facets(&mesh);
        let bottom = locate_boundary_facets(&mesh, &boundary, |x| x.z.abs() < 1e-12);
        let top = locate_boundary_facets(&mesh, &boundary, |x| (x.z - 2.0).abs() < 1e-12);
        let tags = FacetTags::new(boundary, &[(bottom.as_slice(), 1), (top.as_slice(), 2)]);

        let bcs = BCBuilder::new(&mesh)
            .fix_tagged(&tags, 1)
            .traction(&tags, 2, Vector3::new(0.0, -10.0, 0.0), 2)
            .build()
            .unwrap();
        assert_eq!(bcs.displacement_bcs.len(), 4);
        assert_relative_eq!(bcs.load_vector(24).sum(), -10.0, epsilon = 1e-12);
    }

    #[test]
    fn errors_are_collected() {
        let mesh = brick();
        let err = BCBuilder::new(&mesh)
            .fix_set(&NodeSet::new("far", vec![99]))
            .load_nodes(&NodeSet::new("none", vec![]), Vector3::zeros())
            .build()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2 errors"), "{}", msg);
        assert!(msg.contains("node 99"), "{}", msg);
    }
}
