//! Edge collapse cost heuristic
//!
//! Costs follow the curvature/border/seam scheme of Melax-style progressive
//! meshes: an interior collapse is charged for the change in curvature it
//! causes, a border collapse for how much it bends the border, and a seam
//! collapse for the texture discontinuity it would tear. The result is then
//! scaled by the squared distance the vertex travels.

use crate::topology::{Topology, NEVER_COLLAPSE_COST, UNINITIALIZED_COLLAPSE_COST};
use progmesh_core::normalize_or_zero;

impl Topology {
    /// Cost of collapsing `src` along its edge number `edge`.
    pub(crate) fn edge_collapse_cost(&self, src: usize, edge: usize) -> f32 {
        let source = &self.vertices[src];
        let collapse_edge = &source.edges[edge];
        let dst = collapse_edge.destination;
        let dest = &self.vertices[dst];

        // Collapsing would destroy the last triangle either side owns.
        if source.triangles.len() == 1 && dest.triangles.len() == 1 {
            return NEVER_COLLAPSE_COST;
        }

        // A surviving neighbor must not turn over (normal change > 90 degrees).
        for &t in &source.triangles {
            let triangle = &self.triangles[t];
            if triangle.has_vertex(dst) {
                continue;
            }
            let moved = triangle.vertex.map(|v| if v == src { dst } else { v });
            if self.face_normal(&moved).dot(&triangle.normal) < 0.0 {
                return NEVER_COLLAPSE_COST;
            }
        }

        let mut cost: f32;
        if self.is_border_vertex(src) {
            if collapse_edge.ref_count > 1 {
                // border vertex pulled inwards
                cost = 1.0;
            } else {
                // Sliding along the border: the straighter the border stays,
                // the cheaper. Opposite edges give a dot product near -1.
                cost = 0.0;
                let direction = normalize_or_zero(source.position - dest.position);
                for other in &source.edges {
                    if other.destination == dst || other.ref_count != 1 {
                        continue;
                    }
                    let neighbor = &self.vertices[other.destination];
                    let other_border = normalize_or_zero(source.position - neighbor.position);
                    let kinkiness = (other_border.dot(&direction) + 1.002) * 0.5;
                    cost = cost.max(kinkiness);
                }
            }
        } else {
            cost = 0.001;
            for &t in &source.triangles {
                let normal = self.triangles[t].normal;
                let mut min_curvature: f32 = 1.0;
                for &side in &source.triangles {
                    let side = &self.triangles[side];
                    if side.has_vertex(dst) {
                        let dot = normal.dot(&side.normal);
                        min_curvature = min_curvature.min((1.002 - dot) * 0.5);
                    }
                }
                cost = cost.max(min_curvature);
            }
        }

        if source.is_seam {
            if dest.is_seam {
                cost += self.bounding_radius * 0.5;
            } else {
                cost += self.bounding_radius;
            }
        }

        cost * (source.position - dest.position).norm_squared()
    }

    /// Evaluate every outgoing edge of `v`, caching each edge's cost, and
    /// return the cheapest cost with its destination. The first edge wins
    /// ties. A vertex without edges yields `(UNINITIALIZED_COLLAPSE_COST, None)`.
    pub(crate) fn vertex_collapse_cost(&mut self, v: usize) -> (f32, Option<usize>) {
        let mut best = (UNINITIALIZED_COLLAPSE_COST, None);
        for e in 0..self.vertices[v].edges.len() {
            let cost = self.edge_collapse_cost(v, e);
            let edge = &mut self.vertices[v].edges[e];
            edge.collapse_cost = cost;
            if cost < best.0 {
                best = (cost, Some(edge.destination));
            }
        }
        best
    }
}
