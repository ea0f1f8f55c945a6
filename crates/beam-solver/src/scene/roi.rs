use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Axis-aligned region of interest, bounds included
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRoi {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoxRoi {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: &Vector3<f64>) -> bool {
        (0..3).all(|a| p[a] >= self.min[a] && p[a] <= self.max[a])
    }

    /// Indices of the points inside the box, ascending
    pub fn indices(&self, points: &[Vector3<f64>]) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.contains(p))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let roi = BoxRoi::new([-1.0, -1.0, -0.9], [1.0, 1.0, 0.1]);
        let points = [
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(0.0, 0.0, 0.1),
            Vector3::new(0.0, 0.0, 0.2),
            Vector3::new(1.5, 0.0, 0.0),
        ];
        assert_eq!(roi.indices(&points), vec![0, 1]);
    }
}
