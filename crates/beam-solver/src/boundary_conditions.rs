//! Boundary conditions and loading for the static solves.
//!
//! This module handles:
//! - Displacement boundary conditions (fixed or prescribed DOFs)
//! - Concentrated nodal loads
//! - External load vectors from surface tractions

use nalgebra::{DVector, Vector3};

use crate::assembly::constrained_mask;
use crate::mesh::DOFS_PER_NODE;

/// Degree of freedom index (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DofId {
    pub node: usize,
    /// DOF index (0 = X, 1 = Y, 2 = Z)
    pub dof: usize,
}

impl DofId {
    pub fn new(node: usize, dof: usize) -> Self {
        Self { node, dof }
    }

    /// Position in the global system
    pub fn global(&self) -> usize {
        DOFS_PER_NODE * self.node + self.dof
    }
}

/// A displacement boundary condition on a range of components of one node
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementBC {
    pub node: usize,
    /// First constrained component (0-based)
    pub first_dof: usize,
    /// Last constrained component (0-based, inclusive)
    pub last_dof: usize,
    /// Prescribed displacement value (0.0 for fixed)
    pub value: f64,
}

impl DisplacementBC {
    pub fn new(node: usize, first_dof: usize, last_dof: usize, value: f64) -> Self {
        Self {
            node,
            first_dof,
            last_dof,
            value,
        }
    }

    /// Clamp every component of `node`
    pub fn fixed(node: usize) -> Self {
        Self::new(node, 0, DOFS_PER_NODE - 1, 0.0)
    }

    /// Get all DOF IDs affected by this boundary condition
    pub fn affected_dofs(&self) -> Vec<DofId> {
        (self.first_dof..=self.last_dof)
            .map(|dof| DofId::new(self.node, dof))
            .collect()
    }
}

/// A concentrated load on a node
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentratedLoad {
    pub node: usize,
    pub force: Vector3<f64>,
}

impl ConcentratedLoad {
    pub fn new(node: usize, force: Vector3<f64>) -> Self {
        Self { node, force }
    }
}

/// Displacement constraints plus external loads of one static problem
#[derive(Debug, Clone, Default)]
pub struct BoundaryConditions {
    pub displacement_bcs: Vec<DisplacementBC>,
    pub concentrated_loads: Vec<ConcentratedLoad>,
    /// Assembled surface tractions, if any
    pub surface_loads: Option<DVector<f64>>,
}

impl BoundaryConditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_displacement_bc(&mut self, bc: DisplacementBC) {
        self.displacement_bcs.push(bc);
    }

    pub fn add_concentrated_load(&mut self, load: ConcentratedLoad) {
        self.concentrated_loads.push(load);
    }

    /// Add an assembled nodal force vector to the external loads.
    pub fn add_surface_load(&mut self, forces: DVector<f64>) {
        self.surface_loads = Some(match self.surface_loads.take() {
            Some(existing) => existing + forces,
            None => forces,
        });
    }

    /// Constrained flag for every DOF of a system of `num_dofs`
    pub fn constrained_mask(&self, num_dofs: usize) -> Vec<bool> {
        let dofs: Vec<usize> = self
            .displacement_bcs
            .iter()
            .flat_map(|bc| bc.affected_dofs())
            .map(|dof| dof.global())
            .collect();
        constrained_mask(num_dofs, &dofs)
    }

    /// Sorted list of constrained DOFs
    pub fn constrained_dofs(&self, num_dofs: usize) -> Vec<usize> {
        self.constrained_mask(num_dofs)
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| c.then_some(i))
            .collect()
    }

    /// Write prescribed values into `u`
    pub fn impose(&self, u: &mut DVector<f64>) {
        for bc in &self.displacement_bcs {
            for dof in bc.affected_dofs() {
                if let Some(v) = u.get_mut(dof.global()) {
                    *v = bc.value;
                }
            }
        }
    }

    /// External force vector
    pub fn load_vector(&self, num_dofs: usize) -> DVector<f64> {
        let mut f = match &self.surface_loads {
            Some(s) if s.len() == num_dofs => s.clone(),
            _ => DVector::zeros(num_dofs),
        };
        for load in &self.concentrated_loads {
            for c in 0..DOFS_PER_NODE {
                let dof = DofId::new(load.node, c).global();
                if dof < num_dofs {
                    f[dof] += load.force[c];
                }
            }
        }
        f
    }

    /// Get statistics about boundary conditions
    pub fn statistics(&self) -> BCStatistics {
        BCStatistics {
            num_displacement_bcs: self.displacement_bcs.len(),
            num_concentrated_loads: self.concentrated_loads.len(),
            has_surface_loads: self.surface_loads.is_some(),
        }
    }
}

/// Statistics about boundary conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BCStatistics {
    pub num_displacement_bcs: usize,
    pub num_concentrated_loads: usize,
    pub has_surface_loads: bool,
}
