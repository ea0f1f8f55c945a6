//! Node sets and tagged boundary facets.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::mesh::{DOFS_PER_NODE, FaceKind, Mesh};

/// A named set of nodes
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSet {
    /// Set name
    pub name: String,
    /// Node indices in the set, ascending
    pub nodes: Vec<usize>,
}

impl NodeSet {
    pub fn new(name: impl Into<String>, mut nodes: Vec<usize>) -> Self {
        nodes.sort_unstable();
        nodes.dedup();
        Self {
            name: name.into(),
            nodes,
        }
    }

    /// DOFs of every node in the set, all components
    pub fn dofs(&self) -> Vec<usize> {
        nodes_to_dofs(&self.nodes)
    }
}

fn nodes_to_dofs(nodes: &[usize]) -> Vec<usize> {
    nodes
        .iter()
        .flat_map(|&n| (0..DOFS_PER_NODE).map(move |c| DOFS_PER_NODE * n + c))
        .collect()
}

/// A boundary face of a volume element
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    pub kind: FaceKind,
    /// Global node indices, corners first
    pub nodes: Vec<usize>,
    /// Owning element
    pub element: usize,
    /// Face number within the owning element
    pub local_face: usize,
}

/// Faces that belong to exactly one element, in element then face order.
pub fn boundary_facets(mesh: &Mesh) -> Vec<Facet> {
    let mut count: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut facets = Vec::new();
    for element in &mesh.elements {
        let (kind, faces) = element.element_type.faces();
        for (f, local) in faces.iter().enumerate() {
            let nodes: Vec<usize> = local.iter().map(|&i| element.nodes[i]).collect();
            let mut key = nodes[..kind.num_corners()].to_vec();
            key.sort_unstable();
            *count.entry(key).or_insert(0) += 1;
            facets.push(Facet {
                kind,
                nodes,
                element: element.id,
                local_face: f,
            });
        }
    }
    facets.retain(|facet| {
        let mut key = facet.nodes[..facet.kind.num_corners()].to_vec();
        key.sort_unstable();
        count.get(&key) == Some(&1)
    });
    facets
}

/// Indices into [`boundary_facets`] of the facets whose nodes all satisfy `marker`.
pub fn locate_boundary_facets<F>(mesh: &Mesh, boundary: &[Facet], marker: F) -> Vec<usize>
where
    F: Fn(&Vector3<f64>) -> bool,
{
    boundary
        .iter()
        .enumerate()
        .filter(|(_, facet)| {
            facet
                .nodes
                .iter()
                .all(|&n| mesh.nodes.get(n).is_some_and(|node| marker(&node.position())))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Integer tags attached to boundary facets
#[derive(Debug, Clone, Default)]
pub struct FacetTags {
    pub facets: Vec<Facet>,
    /// Facet indices into `facets`, ascending
    pub indices: Vec<usize>,
    pub values: Vec<i32>,
}

impl FacetTags {
    /// Combine marked groups; entries are sorted by facet index.
    pub fn new(facets: Vec<Facet>, groups: &[(&[usize], i32)]) -> Self {
        let mut marked: Vec<(usize, i32)> = groups
            .iter()
            .flat_map(|(indices, tag)| indices.iter().map(move |&i| (i, *tag)))
            .collect();
        marked.sort_by_key(|&(i, _)| i);
        let (indices, values) = marked.into_iter().unzip();
        Self {
            facets,
            indices,
            values,
        }
    }

    /// Facets carrying `tag`
    pub fn find(&self, tag: i32) -> Vec<&Facet> {
        self.indices
            .iter()
            .zip(&self.values)
            .filter(|&(_, &v)| v == tag)
            .filter_map(|(&i, _)| self.facets.get(i))
            .collect()
    }

    /// Nodes on the facets carrying `tag`, ascending
    pub fn nodes(&self, tag: i32) -> Vec<usize> {
        let mut nodes: Vec<usize> = self
            .find(tag)
            .iter()
            .flat_map(|f| f.nodes.iter().copied())
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// DOFs of the nodes on the facets carrying `tag`
    pub fn dofs(&self, tag: i32) -> Vec<usize> {
        nodes_to_dofs(&self.nodes(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ElementType;

    /// Two bricks stacked along z
    fn column() -> Mesh {
        let mut mesh = Mesh::new();
        for k in 0..3 {
            for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                mesh.add_node(x, y, k as f64);
            }
        }
        for k in 0..2 {
            let b = 4 * k;
            let nodes = vec![b, b + 1, b + 2, b + 3, b + 4, b + 5, b + 6, b + 7];
            mesh.add_element(ElementType::C3D8, nodes).unwrap();
        }
        mesh.calculate_dofs();
        mesh
    }

    #[test]
    fn shared_face_is_interior() {
        let mesh = column();
        let boundary = boundary_facets(&mesh);
        assert_eq!(boundary.len(), 10);
        assert!(!boundary.iter().any(|f| {
            let mut n = f.nodes.clone();
            n.sort_unstable();
            n == vec![4, 5, 6, 7]
        }));
    }

    #[test]
    fn tags_select_end_faces() {
        let mesh = column();
        let boundary = boundary_facets(&mesh);
        let bottom = locate_boundary_facets(&mesh, &boundary, |x| x.z.abs() < 1e-12);
        let top = locate_boundary_facets(&mesh, &boundary, |x| (x.z - 2.0).abs() < 1e-12);
        assert_eq!(bottom.len(), 1);
        assert_eq!(top.len(), 1);

        let tags = FacetTags::new(boundary, &[(top.as_slice(), 2), (bottom.as_slice(), 1)]);
        assert!(tags.indices.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tags.nodes(1), vec![0, 1, 2, 3]);
        assert_eq!(tags.nodes(2), vec![8, 9, 10, 11]);
        assert_eq!(tags.dofs(1), (0..12).collect::<Vec<_>>());
        assert!(tags.find(3).is_empty());
    }

    #[test]
    fn node_set_is_sorted_and_unique() {
        let set = NodeSet::new("fixed", vec![3, 1, 3]);
        assert_eq!(set.nodes, vec![1, 3]);
        assert_eq!(set.dofs(), vec![3, 4, 5, 9, 10, 11]);
    }
}
