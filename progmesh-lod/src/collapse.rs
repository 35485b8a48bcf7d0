//! Collapse engine
//!
//! Keeps every collapsible vertex in an indexed priority queue keyed by its
//! collapse cost, collapses the cheapest one into its target, repairs the
//! topology around it and re-evaluates the costs the collapse invalidated.

use crate::config::{LodConfig, ReevaluationStrategy};
use crate::topology::{Topology, UNINITIALIZED_COLLAPSE_COST};
use log::debug;
use priority_queue::PriorityQueue;
use progmesh_core::{Error, Result};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy)]
struct CollapsePriority {
    cost: f32,
    /// Insertion order; among equal costs the earliest inserted pops first
    sequence: u64,
}

impl PartialEq for CollapsePriority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for CollapsePriority {}

impl PartialOrd for CollapsePriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CollapsePriority {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first, then oldest entry
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Working set of vertices ordered by ascending collapse cost
pub(crate) struct CollapseCostSet {
    queue: PriorityQueue<usize, CollapsePriority>,
    next_sequence: u64,
}

impl CollapseCostSet {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            next_sequence: 0,
        }
    }

    /// Insert `v`, or move it behind every other entry of the same cost if
    /// it is already present.
    pub fn insert(&mut self, v: usize, cost: f32) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(v, CollapsePriority { cost, sequence });
    }

    pub fn remove(&mut self, v: usize) -> bool {
        self.queue.remove(&v).is_some()
    }

    /// Cheapest vertex and its cost
    pub fn peek(&self) -> Option<(usize, f32)> {
        self.queue.peek().map(|(&v, priority)| (v, priority.cost))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue.iter().map(|(&v, _)| v)
    }
}

impl Topology {
    /// Collapse `src` into its collapse target.
    ///
    /// Triangles containing both vertices are removed. The remaining
    /// triangles of `src` are rewritten to use the target, following the
    /// index-buffer value the removed triangles paired with `src`; a triangle
    /// whose `src` value was never paired is removed instead. Returns false,
    /// leaving the graph untouched, when `src` has no edges or no target.
    pub(crate) fn collapse(&mut self, src: usize) -> bool {
        let Some(dst) = self.vertices[src].collapse_to else {
            return false;
        };
        if self.vertices[src].edges.is_empty() {
            return false;
        }

        // (src value, dst value) per distinct src value of a removed triangle
        let mut collapsed_edges: Vec<(u32, u32)> = Vec::new();
        let src_triangles: Vec<usize> = self.vertices[src].triangles.iter().copied().collect();

        for &t in &src_triangles {
            let triangle = &self.triangles[t];
            let (Some(src_id), Some(dst_id)) =
                (triangle.vertex_id_of(src), triangle.vertex_id_of(dst))
            else {
                continue;
            };
            if !collapsed_edges.iter().any(|&(s, _)| s == src_id) {
                collapsed_edges.push((src_id, dst_id));
            }
            self.remove_triangle(t, src);
        }

        for &t in &src_triangles {
            if self.triangles[t].removed {
                continue;
            }
            let Some(src_id) = self.triangles[t].vertex_id_of(src) else {
                continue;
            };
            match collapsed_edges.iter().find(|&&(s, _)| s == src_id) {
                Some(&(_, dst_id)) => {
                    self.replace_vertex(t, src, dst, dst_id);
                    let normal = self.face_normal(&self.triangles[t].vertex);
                    self.triangles[t].normal = normal;
                }
                None => {
                    debug!(
                        "no collapsed edge for index {} in triangle {}, removing it",
                        src_id, t
                    );
                    self.remove_triangle(t, src);
                }
            }
        }

        let source = &mut self.vertices[src];
        source.edges.clear();
        source.triangles.clear();
        source.collapsed = true;
        true
    }

    /// Move corner `src` of triangle `t` onto `dst`, relinking its edges.
    fn replace_vertex(&mut self, t: usize, src: usize, dst: usize, dst_id: u32) {
        let Some(slot) = self.triangles[t].slot_of(src) else {
            return;
        };
        self.vertices[dst].triangles.insert(t);
        let corners = self.triangles[t].vertex;
        for (n, &other) in corners.iter().enumerate() {
            if n == slot {
                continue;
            }
            self.remove_edge(other, src);
            self.add_edge(other, dst);
            self.add_edge(dst, other);
        }
        let triangle = &mut self.triangles[t];
        triangle.vertex[slot] = dst;
        triangle.vertex_id[slot] = dst_id;
    }
}

/// Greedy reduction driver over a topology graph and its working set
pub(crate) struct CollapseEngine {
    pub topology: Topology,
    cost_set: CollapseCostSet,
    strategy: ReevaluationStrategy,
    validate: bool,
}

impl CollapseEngine {
    pub fn new(topology: Topology, config: &LodConfig) -> Self {
        let mut engine = Self {
            topology,
            cost_set: CollapseCostSet::new(),
            strategy: config.strategy,
            validate: config.validate,
        };
        engine.compute_costs();
        engine
    }

    fn compute_costs(&mut self) {
        for v in 0..self.topology.vertices.len() {
            if self.topology.vertices[v].edges.is_empty() {
                debug!(
                    "isolated vertex {} excluded from LOD computation",
                    self.topology.vertices[v].index
                );
                continue;
            }
            let (cost, target) = self.topology.vertex_collapse_cost(v);
            let vertex = &mut self.topology.vertices[v];
            vertex.collapse_cost = cost;
            vertex.collapse_to = target;
            if target.is_some() {
                self.cost_set.insert(v, cost);
            }
        }
    }

    /// Re-evaluate `v`; it is requeued only if its cost or target changed.
    fn update_vertex_collapse_cost(&mut self, v: usize) {
        if self.topology.vertices[v].collapsed {
            return;
        }
        let (cost, target) = self.topology.vertex_collapse_cost(v);
        let vertex = &mut self.topology.vertices[v];
        if cost == vertex.collapse_cost && target == vertex.collapse_to {
            return;
        }
        self.cost_set.remove(v);
        match target {
            Some(_) if cost != UNINITIALIZED_COLLAPSE_COST => {
                vertex.collapse_cost = cost;
                vertex.collapse_to = target;
                self.cost_set.insert(v, cost);
            }
            _ => {
                vertex.collapse_cost = UNINITIALIZED_COLLAPSE_COST;
                vertex.collapse_to = None;
            }
        }
    }

    fn reevaluate(&mut self, src: usize, dst: usize, former_neighbors: &[usize]) {
        match self.strategy {
            ReevaluationStrategy::Exhaustive => {
                for &n in former_neighbors {
                    self.update_vertex_collapse_cost(n);
                }
                self.update_vertex_collapse_cost(dst);
                for n in self.topology.neighbors(dst) {
                    self.update_vertex_collapse_cost(n);
                }
            }
            ReevaluationStrategy::Batched => {
                let mut affected = BTreeSet::new();
                for &n in former_neighbors {
                    affected.insert(n);
                    affected.extend(self.topology.neighbors(n));
                }
                affected.remove(&src);
                for v in affected {
                    self.update_vertex_collapse_cost(v);
                }
            }
        }
    }

    /// Collapse the cheapest vertex if its cost is below `cost_limit`.
    ///
    /// Returns `Ok(false)` when the working set is empty or its head is too
    /// expensive. A vertex that cannot be collapsed still leaves the set.
    pub fn step(&mut self, cost_limit: f32) -> Result<bool> {
        let Some((src, cost)) = self.cost_set.peek() else {
            return Ok(false);
        };
        if cost >= cost_limit {
            return Ok(false);
        }
        self.cost_set.remove(src);

        let target = self.topology.vertices[src].collapse_to;
        let former_neighbors = self.topology.neighbors(src);
        match target {
            Some(dst) if self.topology.collapse(src) => {
                self.reevaluate(src, dst, &former_neighbors);
                if self.validate {
                    self.validate()?;
                }
            }
            _ => debug!(
                "couldn't collapse vertex {}",
                self.topology.vertices[src].index
            ),
        }
        Ok(true)
    }

    /// Collapse until at most `target_triangles` remain live or the cheapest
    /// vertex reaches `cost_limit`. Returns the number of triangles removed.
    pub fn reduce_to(&mut self, target_triangles: usize, cost_limit: f32) -> Result<usize> {
        let before = self.topology.live_triangles;
        while target_triangles < self.topology.live_triangles {
            if !self.step(cost_limit)? {
                break;
            }
        }
        Ok(before - self.topology.live_triangles)
    }

    pub fn queued_vertices(&self) -> usize {
        self.cost_set.len()
    }

    /// Topology invariants plus: every queued vertex is live, has a cost and
    /// has an edge to its target whose cached cost is the vertex cost.
    pub fn validate(&self) -> Result<()> {
        self.topology.validate()?;
        for v in self.cost_set.iter() {
            let vertex = &self.topology.vertices[v];
            if vertex.collapsed {
                return Err(Error::Algorithm(format!(
                    "collapsed vertex {} is still queued",
                    vertex.index
                )));
            }
            if vertex.collapse_cost == UNINITIALIZED_COLLAPSE_COST {
                return Err(Error::Algorithm(format!(
                    "queued vertex {} has no collapse cost",
                    vertex.index
                )));
            }
            let Some(edge) = vertex.collapse_to.and_then(|target| vertex.edge_to(target)) else {
                return Err(Error::Algorithm(format!(
                    "queued vertex {} has no edge to its collapse target",
                    vertex.index
                )));
            };
            if vertex.edges[edge].collapse_cost != vertex.collapse_cost {
                return Err(Error::Algorithm(format!(
                    "queued vertex {} costs {} but its target edge costs {}",
                    vertex.index, vertex.collapse_cost, vertex.edges[edge].collapse_cost
                )));
            }
        }
        Ok(())
    }
}
