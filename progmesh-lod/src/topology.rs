//! Topology graph built from raw position and index buffers
//!
//! Vertices and triangles live in flat arenas addressed by `usize` handles.
//! Edges are stored on their source vertex and addressed by destination.
//! Nothing is ever deallocated while a generator is alive: triangles are
//! flagged `removed` and collapsed vertices flagged `collapsed`, so every
//! handle stays valid for the whole reduction.

use log::{debug, warn};
use progmesh_core::{
    normalize_or_zero, BoundingSphere, Error, IndexBuffer, Point3f, PositionKey, Result, Vector3f,
};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

/// Cost marking an edge collapse that must never be chosen
pub const NEVER_COLLAPSE_COST: f32 = f32::MAX;

/// Cost of a vertex or edge that has not been evaluated
pub const UNINITIALIZED_COLLAPSE_COST: f32 = f32::INFINITY;

/// Directed adjacency from the owning vertex to `destination`
#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub destination: usize,
    pub collapse_cost: f32,
    /// Number of live triangles containing both endpoints
    pub ref_count: u32,
}

impl Edge {
    fn new(destination: usize) -> Self {
        Self {
            destination,
            collapse_cost: UNINITIALIZED_COLLAPSE_COST,
            ref_count: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub position: Point3f,
    pub collapse_cost: f32,
    pub collapse_to: Option<usize>,
    pub edges: Vec<Edge>,
    pub triangles: BTreeSet<usize>,
    pub is_seam: bool,
    pub collapsed: bool,
    /// First buffer index that resolved to this vertex, for diagnostics
    pub index: u32,
}

impl Vertex {
    fn new(position: Point3f, index: u32) -> Self {
        Self {
            position,
            collapse_cost: UNINITIALIZED_COLLAPSE_COST,
            collapse_to: None,
            edges: Vec::new(),
            triangles: BTreeSet::new(),
            is_seam: false,
            collapsed: false,
            index,
        }
    }

    pub fn edge_to(&self, destination: usize) -> Option<usize> {
        self.edges.iter().position(|e| e.destination == destination)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Triangle {
    pub vertex: [usize; 3],
    /// Index buffer values of the three corners
    pub vertex_id: [u32; 3],
    pub normal: Vector3f,
    pub removed: bool,
}

impl Triangle {
    pub fn has_vertex(&self, v: usize) -> bool {
        self.vertex.contains(&v)
    }

    pub fn slot_of(&self, v: usize) -> Option<usize> {
        self.vertex.iter().position(|&corner| corner == v)
    }

    pub fn vertex_id_of(&self, v: usize) -> Option<u32> {
        self.slot_of(v).map(|slot| self.vertex_id[slot])
    }

    pub fn is_malformed(&self) -> bool {
        self.vertex[0] == self.vertex[1]
            || self.vertex[0] == self.vertex[2]
            || self.vertex[1] == self.vertex[2]
    }

    fn same_vertices(&self, other: &Triangle) -> bool {
        let mut a = self.vertex;
        let mut b = other.vertex;
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }
}

/// Counts describing an ingested (and possibly reduced) topology graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologyStats {
    /// Unique positions after welding
    pub vertices: usize,
    /// Directed edges currently linked
    pub edges: usize,
    /// Triangles read from the index buffer
    pub triangles: usize,
    pub live_triangles: usize,
    /// Malformed or duplicate triangles dropped at ingestion
    pub excluded_triangles: usize,
    pub seam_vertices: usize,
    /// Vertices without any edge
    pub isolated_vertices: usize,
}

pub(crate) struct Topology {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    /// Buffer index -> welded vertex handle
    lookup: Vec<usize>,
    pub bounding_radius: f32,
    pub live_triangles: usize,
    pub excluded_triangles: usize,
}

impl Topology {
    /// Weld `positions`, then read every triangle of `indices`.
    ///
    /// Fails on an index count that is not a multiple of three or on an
    /// index that does not address a position.
    pub fn build(positions: &[Point3f], indices: &IndexBuffer) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }

        let mut topology = Topology {
            vertices: Vec::new(),
            triangles: Vec::with_capacity(indices.triangle_count()),
            lookup: Vec::with_capacity(positions.len()),
            bounding_radius: BoundingSphere::from_points(positions).radius,
            live_triangles: 0,
            excluded_triangles: 0,
        };
        topology.gather_vertices(positions)?;
        topology.gather_triangles(indices)?;
        Ok(topology)
    }

    fn gather_vertices(&mut self, positions: &[Point3f]) -> Result<()> {
        let mut welded: HashMap<PositionKey, usize> = HashMap::with_capacity(positions.len());
        for (i, position) in positions.iter().enumerate() {
            let index = u32::try_from(i).map_err(|_| {
                Error::InvalidData(format!(
                    "{} positions exceed the 32-bit index range",
                    positions.len()
                ))
            })?;
            match welded.entry(PositionKey::new(position)) {
                Entry::Occupied(entry) => {
                    let existing = *entry.get();
                    self.vertices[existing].is_seam = true;
                    self.lookup.push(existing);
                }
                Entry::Vacant(entry) => {
                    entry.insert(self.vertices.len());
                    self.lookup.push(self.vertices.len());
                    self.vertices.push(Vertex::new(*position, index));
                }
            }
        }
        Ok(())
    }

    fn gather_triangles(&mut self, indices: &IndexBuffer) -> Result<()> {
        for ids in indices.triangles() {
            let mut vertex = [0usize; 3];
            for (corner, &id) in vertex.iter_mut().zip(ids.iter()) {
                *corner = self.resolve(id as usize).ok_or_else(|| {
                    Error::InvalidData(format!(
                        "index {} out of range for {} positions",
                        id,
                        self.lookup.len()
                    ))
                })?;
            }
            self.add_triangle(Triangle {
                vertex,
                vertex_id: ids,
                normal: Vector3f::zeros(),
                removed: false,
            });
        }
        Ok(())
    }

    fn add_triangle(&mut self, mut triangle: Triangle) {
        let id = self.triangles.len();
        if triangle.is_malformed() {
            debug!(
                "malformed triangle {} {:?} excluded from LOD computation",
                id, triangle.vertex_id
            );
            triangle.removed = true;
            self.excluded_triangles += 1;
            self.triangles.push(triangle);
            return;
        }
        if let Some(duplicate) = self.find_duplicate(&triangle) {
            debug!(
                "triangle {} {:?} duplicates triangle {} and is excluded from LOD computation",
                id, triangle.vertex_id, duplicate
            );
            triangle.removed = true;
            self.excluded_triangles += 1;
            self.triangles.push(triangle);
            return;
        }

        triangle.normal = self.face_normal(&triangle.vertex);
        let corners = triangle.vertex;
        self.triangles.push(triangle);
        for &v in &corners {
            self.vertices[v].triangles.insert(id);
        }
        for (i, &from) in corners.iter().enumerate() {
            for (n, &to) in corners.iter().enumerate() {
                if i != n {
                    self.add_edge(from, to);
                }
            }
        }
        self.live_triangles += 1;
    }

    fn find_duplicate(&self, triangle: &Triangle) -> Option<usize> {
        self.vertices[triangle.vertex[0]]
            .triangles
            .iter()
            .copied()
            .find(|&t| self.triangles[t].same_vertices(triangle))
    }

    /// Welded vertex handle for a buffer index
    pub fn resolve(&self, index: usize) -> Option<usize> {
        self.lookup.get(index).copied()
    }

    /// Number of positions the graph was built from
    pub fn position_count(&self) -> usize {
        self.lookup.len()
    }

    pub fn face_normal(&self, corners: &[usize; 3]) -> Vector3f {
        let p0 = self.vertices[corners[0]].position;
        let p1 = self.vertices[corners[1]].position;
        let p2 = self.vertices[corners[2]].position;
        normalize_or_zero((p1 - p0).cross(&(p2 - p1)))
    }

    pub fn add_edge(&mut self, from: usize, to: usize) {
        let vertex = &mut self.vertices[from];
        match vertex.edge_to(to) {
            Some(e) => vertex.edges[e].ref_count += 1,
            None => vertex.edges.push(Edge::new(to)),
        }
    }

    /// Drop one reference from `from -> to`, unlinking the edge at zero.
    /// Returns false when the edge was not linked.
    pub fn remove_edge(&mut self, from: usize, to: usize) -> bool {
        let Some(e) = self.vertices[from].edge_to(to) else {
            warn!(
                "edge {} -> {} missing while unlinking a triangle",
                self.vertices[from].index, self.vertices[to].index
            );
            return false;
        };
        let vertex = &mut self.vertices[from];
        if vertex.edges[e].ref_count <= 1 {
            vertex.edges.remove(e);
        } else {
            vertex.edges[e].ref_count -= 1;
        }
        true
    }

    /// Flag triangle `t` removed and unlink it from every corner except `skip`
    /// (whose triangle set the caller is iterating) and from all its edges.
    pub fn remove_triangle(&mut self, t: usize, skip: usize) {
        let corners = self.triangles[t].vertex;
        self.triangles[t].removed = true;
        self.live_triangles -= 1;
        for &v in &corners {
            if v != skip {
                self.vertices[v].triangles.remove(&t);
            }
        }
        for (i, &from) in corners.iter().enumerate() {
            for (n, &to) in corners.iter().enumerate() {
                if i != n {
                    self.remove_edge(from, to);
                }
            }
        }
    }

    pub fn is_border_vertex(&self, v: usize) -> bool {
        self.vertices[v].edges.iter().any(|e| e.ref_count == 1)
    }

    pub fn neighbors(&self, v: usize) -> Vec<usize> {
        self.vertices[v].edges.iter().map(|e| e.destination).collect()
    }

    pub fn stats(&self) -> TopologyStats {
        TopologyStats {
            vertices: self.vertices.len(),
            edges: self.vertices.iter().map(|v| v.edges.len()).sum(),
            triangles: self.triangles.len(),
            live_triangles: self.live_triangles,
            excluded_triangles: self.excluded_triangles,
            seam_vertices: self.vertices.iter().filter(|v| v.is_seam).count(),
            isolated_vertices: self
                .vertices
                .iter()
                .filter(|v| !v.collapsed && v.edges.is_empty())
                .count(),
        }
    }

    /// Check the graph invariants: live triangles reference three distinct,
    /// uncollapsed vertices that list them, and every edge's reference count
    /// equals the number of live triangles spanning it.
    pub fn validate(&self) -> Result<()> {
        let mut expected: HashMap<(usize, usize), u32> = HashMap::new();
        let mut live = 0usize;

        for (t, triangle) in self.triangles.iter().enumerate() {
            if triangle.removed {
                continue;
            }
            live += 1;
            if triangle.is_malformed() {
                return Err(Error::Algorithm(format!(
                    "live triangle {} references a vertex twice",
                    t
                )));
            }
            for (i, &from) in triangle.vertex.iter().enumerate() {
                let vertex = &self.vertices[from];
                if vertex.collapsed {
                    return Err(Error::Algorithm(format!(
                        "live triangle {} references collapsed vertex {}",
                        t, vertex.index
                    )));
                }
                if !vertex.triangles.contains(&t) {
                    return Err(Error::Algorithm(format!(
                        "vertex {} does not list live triangle {}",
                        vertex.index, t
                    )));
                }
                for (n, &to) in triangle.vertex.iter().enumerate() {
                    if i != n {
                        *expected.entry((from, to)).or_insert(0) += 1;
                    }
                }
            }
        }

        if live != self.live_triangles {
            return Err(Error::Algorithm(format!(
                "live triangle counter is {} but {} triangles are live",
                self.live_triangles, live
            )));
        }

        let mut linked = 0usize;
        for (v, vertex) in self.vertices.iter().enumerate() {
            for &t in &vertex.triangles {
                let triangle = &self.triangles[t];
                if triangle.removed || !triangle.has_vertex(v) {
                    return Err(Error::Algorithm(format!(
                        "vertex {} lists stale triangle {}",
                        vertex.index, t
                    )));
                }
            }
            for edge in &vertex.edges {
                linked += 1;
                let spanning = expected.get(&(v, edge.destination)).copied().unwrap_or(0);
                if edge.ref_count != spanning {
                    return Err(Error::Algorithm(format!(
                        "edge {} -> {} has reference count {} but {} live triangles span it",
                        vertex.index,
                        self.vertices[edge.destination].index,
                        edge.ref_count,
                        spanning
                    )));
                }
            }
        }

        if linked != expected.len() {
            return Err(Error::Algorithm(format!(
                "{} edges linked but live triangles span {}",
                linked,
                expected.len()
            )));
        }
        Ok(())
    }
}
