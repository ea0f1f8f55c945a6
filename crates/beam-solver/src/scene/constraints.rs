use nalgebra::Vector3;

use super::roi::BoxRoi;
use crate::sets::NodeSet;

/// Clamps every component of its points
#[derive(Debug, Clone, PartialEq)]
pub struct FixedConstraint {
    pub indices: Vec<usize>,
}

impl FixedConstraint {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn from_roi(roi: &BoxRoi, points: &[Vector3<f64>]) -> Self {
        Self::new(roi.indices(points))
    }

    pub fn node_set(&self) -> NodeSet {
        NodeSet::new("fixed_roi", self.indices.clone())
    }
}

/// Dead load whose total is shared evenly by its points
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantForceField {
    pub indices: Vec<usize>,
    pub total_force: Vector3<f64>,
}

impl ConstantForceField {
    pub fn new(indices: Vec<usize>, total_force: Vector3<f64>) -> Self {
        Self { indices, total_force }
    }

    pub fn from_roi(roi: &BoxRoi, points: &[Vector3<f64>], total_force: Vector3<f64>) -> Self {
        Self::new(roi.indices(points), total_force)
    }

    /// Force carried by each point, `None` when the region caught no point
    pub fn nodal_force(&self) -> Option<Vector3<f64>> {
        (!self.indices.is_empty()).then(|| self.total_force / self.indices.len() as f64)
    }

    pub fn node_set(&self) -> NodeSet {
        NodeSet::new("load_roi", self.indices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_force_is_split_evenly() {
        let load = ConstantForceField::new(vec![3, 4, 5, 6], Vector3::new(0.0, -2000.0, 0.0));
        assert_eq!(load.nodal_force(), Some(Vector3::new(0.0, -500.0, 0.0)));
        assert_eq!(load.node_set().nodes, vec![3, 4, 5, 6]);
        assert_eq!(ConstantForceField::new(vec![], Vector3::new(1.0, 0.0, 0.0)).nodal_force(), None);
    }
}
