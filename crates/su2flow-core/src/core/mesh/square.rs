use super::{Element, Marker, Mesh, MeshError, VTK_LINE, VTK_QUADRILATERAL};
use nalgebra::Point2;
use rayon::prelude::*;
use tracing::debug;

/// Structured rectangular grid parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareGridSpec {
    /// Nodes along x.
    pub n_node: usize,
    /// Nodes along y.
    pub m_node: usize,
    pub x_length: f64,
    pub y_length: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for SquareGridSpec {
    fn default() -> Self {
        Self {
            n_node: 5,
            m_node: 5,
            x_length: 1.0,
            y_length: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl SquareGridSpec {
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.n_node < 2 || self.m_node < 2 {
            return Err(MeshError::TooFewNodes {
                n_node: self.n_node,
                m_node: self.m_node,
            });
        }
        for length in [self.x_length, self.y_length] {
            if !length.is_finite() || length <= 0.0 {
                return Err(MeshError::InvalidLength(length));
            }
        }
        for offset in [self.offset_x, self.offset_y] {
            if !offset.is_finite() {
                return Err(MeshError::InvalidOffset(offset));
            }
        }
        Ok(())
    }

    pub fn n_points(&self) -> usize {
        self.n_node * self.m_node
    }

    pub fn n_elements(&self) -> usize {
        (self.n_node - 1) * (self.m_node - 1)
    }
}

pub fn generate(spec: &SquareGridSpec) -> Result<Mesh, MeshError> {
    spec.validate()?;
    let n = spec.n_node;
    let m = spec.m_node;
    debug!("Generating {}x{} structured grid", n, m);

    let mut elements = Vec::with_capacity(spec.n_elements());
    for j in 0..m - 1 {
        for i in 0..n - 1 {
            let lower_left = j * n + i;
            let lower_right = lower_left + 1;
            let upper_left = (j + 1) * n + i;
            let upper_right = upper_left + 1;
            elements.push(Element {
                kind: VTK_QUADRILATERAL,
                nodes: vec![lower_left, lower_right, upper_right, upper_left],
            });
        }
    }

    // Row-major, x fastest: point index = j * n + i.
    let points: Vec<Point2<f64>> = (0..spec.n_points())
        .into_par_iter()
        .map(|idx| {
            let (i, j) = (idx % n, idx / n);
            let x = spec.x_length * i as f64 / (n - 1) as f64;
            let y = spec.y_length * j as f64 / (m - 1) as f64;
            Point2::new(x - spec.offset_x, y - spec.offset_y)
        })
        .collect();

    let line = |a: usize, b: usize| Element {
        kind: VTK_LINE,
        nodes: vec![a, b],
    };
    let last = n * m - 1;
    let markers = vec![
        Marker {
            tag: "lower".to_string(),
            elements: (0..n - 1).map(|i| line(i, i + 1)).collect(),
        },
        Marker {
            tag: "outlet".to_string(),
            elements: (0..m - 1)
                .map(|j| line(j * n + (n - 1), (j + 1) * n + (n - 1)))
                .collect(),
        },
        Marker {
            tag: "upper".to_string(),
            elements: (0..n - 1).map(|i| line(last - i, last - (i + 1))).collect(),
        },
        Marker {
            tag: "inlet".to_string(),
            elements: (0..m - 1).rev().map(|j| line((j + 1) * n, j * n)).collect(),
        },
    ];

    Ok(Mesh {
        dimension: 2,
        elements,
        points,
        markers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_builds_expected_counts() {
        let mesh = generate(&SquareGridSpec::default()).unwrap();
        assert_eq!(mesh.dimension, 2);
        assert_eq!(mesh.points.len(), 25);
        assert_eq!(mesh.elements.len(), 16);
        assert_eq!(mesh.markers.len(), 4);
        for marker in &mesh.markers {
            assert_eq!(marker.elements.len(), 4);
        }
    }

    #[test]
    fn points_are_row_major_and_offset() {
        let spec = SquareGridSpec {
            n_node: 3,
            m_node: 2,
            x_length: 2.0,
            y_length: 0.5,
            offset_x: 1.0,
            offset_y: 0.25,
        };
        let mesh = generate(&spec).unwrap();
        assert_eq!(mesh.points[0], Point2::new(-1.0, -0.25));
        assert_eq!(mesh.points[2], Point2::new(1.0, -0.25));
        assert_eq!(mesh.points[4], Point2::new(0.0, 0.25));
    }

    #[test]
    fn elements_are_counter_clockwise_quads() {
        let spec = SquareGridSpec {
            n_node: 3,
            m_node: 3,
            ..Default::default()
        };
        let mesh = generate(&spec).unwrap();
        assert_eq!(mesh.elements[0].kind, VTK_QUADRILATERAL);
        assert_eq!(mesh.elements[0].nodes, vec![0, 1, 4, 3]);
        assert_eq!(mesh.elements[3].nodes, vec![4, 5, 8, 7]);
    }

    #[test]
    fn boundary_markers_walk_around_the_domain() {
        let spec = SquareGridSpec {
            n_node: 3,
            m_node: 3,
            ..Default::default()
        };
        let mesh = generate(&spec).unwrap();
        let nodes = |tag: &str| -> Vec<Vec<usize>> {
            mesh.marker(tag)
                .unwrap()
                .elements
                .iter()
                .map(|e| e.nodes.clone())
                .collect()
        };
        assert_eq!(nodes("lower"), vec![vec![0, 1], vec![1, 2]]);
        assert_eq!(nodes("outlet"), vec![vec![2, 5], vec![5, 8]]);
        assert_eq!(nodes("upper"), vec![vec![8, 7], vec![7, 6]]);
        assert_eq!(nodes("inlet"), vec![vec![6, 3], vec![3, 0]]);
    }

    #[test]
    fn rejects_degenerate_grids() {
        let spec = SquareGridSpec {
            n_node: 1,
            ..Default::default()
        };
        assert_eq!(
            generate(&spec),
            Err(MeshError::TooFewNodes {
                n_node: 1,
                m_node: 5
            })
        );

        let spec = SquareGridSpec {
            y_length: 0.0,
            ..Default::default()
        };
        assert_eq!(generate(&spec), Err(MeshError::InvalidLength(0.0)));

        let spec = SquareGridSpec {
            offset_x: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(generate(&spec), Err(MeshError::InvalidOffset(_))));
    }
}
