// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Destructive edits: erasing faces and edges, healing, and imprinting.
//!
//! ## Healing
//!
//! Erasing an edge fuses the faces on both sides of it. The faces connected
//! through erased edges form a cluster. The directed boundary uses of every
//! wire in the cluster, minus the erased edges, are relinked into closed
//! cycles. At a vertex with several continuations the walk takes the most
//! left turn, so touching loops separate cleanly. Counter-clockwise cycles
//! become outer boundaries and clockwise cycles become holes of the smallest
//! outer boundary that contains them.

use std::f64::consts::PI;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::*;
use crate::error::{Error, Result};
use crate::geometry::{point_in_ring, signed_area_2d, Polygon2};
use crate::keys::*;
use crate::traversal::HalfEdge;

/// Summary of an [`PlanarMesh::erase_edges`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealReport {
    /// Edges removed from the mesh.
    pub erased_edges: usize,
    /// Faces removed because they bordered an erased edge.
    pub faces_removed: usize,
    /// Faces rebuilt from the surviving boundary.
    pub faces_created: Vec<FaceKey>,
    /// Boundary fragments that did not close into a loop with area.
    pub dropped_loops: usize,
}

impl PlanarMesh {
    /// Removes a face and its wires. Edges and vertices stay.
    pub fn erase_face(&mut self, key: FaceKey) -> Result<()> {
        let face = self.faces.remove(key).ok_or(Error::FaceNotFound(key))?;
        for wk in std::iter::once(face.outer_wire).chain(face.inner_wires) {
            self.remove_wire(wk);
        }
        Ok(())
    }

    /// Removes several faces. Missing keys are ignored.
    pub fn erase_faces(&mut self, keys: &[FaceKey]) -> usize {
        keys.iter().filter(|&&k| self.erase_face(k).is_ok()).count()
    }

    fn remove_wire(&mut self, key: WireKey) {
        if let Some(wire) = self.wires.remove(key) {
            for ek in wire.edges {
                self.unlink_edge_wire(ek, key);
            }
        }
        self.wire_to_face.remove(&key);
    }

    /// Removes an edge that no wire uses any more.
    fn remove_edge(&mut self, key: EdgeKey) {
        if let Some(edge) = self.edges.remove(key) {
            self.edge_lookup.remove(&pair(edge.start, edge.end));
            for v in [edge.start, edge.end] {
                if let Some(list) = self.vertex_to_edges.get_mut(&v) {
                    list.retain(|e| *e != key);
                }
            }
        }
        self.edge_to_wires.remove(&key);
    }

    /// Removes every edge with no face use, then every vertex with no edge.
    pub fn remove_loose_geometry(&mut self) -> usize {
        let loose: Vec<EdgeKey> = self
            .edge_keys()
            .into_iter()
            .filter(|&e| self.edge_wires(e).is_empty())
            .collect();
        for &e in &loose {
            self.remove_edge(e);
        }
        let vertices = self.vertex_keys();
        self.drop_unused_vertices(&vertices);
        loose.len()
    }

    /// Replaces a face by a set of polygons covering (part of) it.
    ///
    /// The pieces are added without nesting. Boundary edges of the old face
    /// that no piece reuses are removed along with orphaned vertices.
    pub fn replace_face(&mut self, key: FaceKey, pieces: &[Polygon2]) -> Result<Vec<FaceKey>> {
        let old_edges = self.face_edges(key).ok_or(Error::FaceNotFound(key))?;
        self.erase_face(key)?;

        let mut created = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match self.insert_polygon(&piece.outer, &piece.holes) {
                Ok(f) => created.push(f),
                Err(Error::DegenerateFace) => continue,
                Err(e) => return Err(e),
            }
        }

        let mut touched = Vec::new();
        for ek in old_edges {
            if self.edge_wires(ek).is_empty() {
                if let Some((s, e)) = self.edge_vertices(ek) {
                    touched.extend([s, e]);
                }
                self.remove_edge(ek);
            }
        }
        self.drop_unused_vertices(&touched);
        Ok(created)
    }

    /// Erases edges and heals the faces that bordered them.
    pub fn erase_edges(&mut self, keys: &[EdgeKey]) -> Result<HealReport> {
        let erased: FxHashSet<EdgeKey> = keys
            .iter()
            .copied()
            .filter(|e| self.edges.contains_key(*e))
            .collect();
        let mut report = HealReport::default();
        if erased.is_empty() {
            return Ok(report);
        }

        for cluster in self.face_clusters(&erased) {
            let mut halves = Vec::new();
            for &fk in &cluster {
                for wk in self.face_wires(fk).unwrap_or_default() {
                    let wire = self.wire_half_edges(wk).ok_or(Error::WireNotFound(wk))?;
                    halves.extend(wire.into_iter().filter(|h| !erased.contains(&h.edge)));
                }
            }
            for &fk in &cluster {
                self.erase_face(fk)?;
            }
            report.faces_removed += cluster.len();

            let (cycles, broken) = self.link_cycles(&halves);
            report.dropped_loops += broken;
            let (faces, dropped) = self.rebuild_faces(cycles);
            report.dropped_loops += dropped;
            report.faces_created.extend(faces);
        }

        let mut touched = Vec::new();
        for &ek in &erased {
            if let Some((s, e)) = self.edge_vertices(ek) {
                touched.extend([s, e]);
            }
            self.remove_edge(ek);
        }
        report.erased_edges = erased.len();

        // Edges of dropped fragments no longer border anything
        for ek in self.edge_keys() {
            if self.edge_wires(ek).is_empty() {
                if let Some((s, e)) = self.edge_vertices(ek) {
                    touched.extend([s, e]);
                }
                self.remove_edge(ek);
            }
        }
        self.drop_unused_vertices(&touched);

        Ok(report)
    }

    /// Groups the faces bordering `erased` into clusters connected through
    /// erased edges.
    fn face_clusters(&self, erased: &FxHashSet<EdgeKey>) -> Vec<Vec<FaceKey>> {
        let mut sorted: Vec<EdgeKey> = erased.iter().copied().collect();
        sorted.sort();

        let mut neighbours: FxHashMap<FaceKey, FxHashSet<FaceKey>> = FxHashMap::default();
        let mut order = Vec::new();
        for ek in sorted {
            let faces = self.edge_faces(ek);
            for &f in &faces {
                if !neighbours.contains_key(&f) {
                    order.push(f);
                }
                neighbours.entry(f).or_default().extend(faces.iter().copied());
            }
        }

        let mut seen = FxHashSet::default();
        let mut clusters = Vec::new();
        for start in order {
            if !seen.insert(start) {
                continue;
            }
            let mut cluster = vec![start];
            let mut stack = vec![start];
            while let Some(f) = stack.pop() {
                let mut next: Vec<FaceKey> = neighbours[&f].iter().copied().collect();
                next.sort();
                for n in next {
                    if seen.insert(n) {
                        cluster.push(n);
                        stack.push(n);
                    }
                }
            }
            clusters.push(cluster);
        }
        clusters
    }

    /// Relinks directed edge uses into closed cycles.
    ///
    /// Returns the cycles and the number of chains that could not be closed.
    fn link_cycles(&self, halves: &[HalfEdge]) -> (Vec<Vec<HalfEdge>>, usize) {
        let mut outgoing: FxHashMap<VertexKey, Vec<usize>> = FxHashMap::default();
        for (i, h) in halves.iter().enumerate() {
            outgoing.entry(h.from).or_default().push(i);
        }

        let mut used = vec![false; halves.len()];
        let mut cycles = Vec::new();
        let mut broken = 0;

        for start in 0..halves.len() {
            if used[start] {
                continue;
            }
            used[start] = true;
            let mut cycle = vec![halves[start]];
            let mut current = start;

            loop {
                let at = halves[current].to;
                let candidates: Vec<usize> = outgoing
                    .get(&at)
                    .map(|c| {
                        c.iter()
                            .copied()
                            .filter(|&i| !used[i] || i == start)
                            .collect()
                    })
                    .unwrap_or_default();

                let Some(next) = self.leftmost_turn(&halves[current], &candidates, halves) else {
                    broken += 1;
                    break;
                };
                if next == start {
                    cycles.push(cycle);
                    break;
                }
                used[next] = true;
                cycle.push(halves[next]);
                current = next;
            }
        }

        (cycles, broken)
    }

    /// Picks the continuation making the sharpest left turn after `incoming`.
    ///
    /// Going straight back along the same edge ranks last.
    fn leftmost_turn(&self, incoming: &HalfEdge, candidates: &[usize], halves: &[HalfEdge]) -> Option<usize> {
        let dir = |h: &HalfEdge| -> Option<[f64; 2]> {
            let a = self.vertices.get(h.from)?;
            let b = self.vertices.get(h.to)?;
            Some([b.x - a.x, b.y - a.y])
        };
        let din = dir(incoming)?;

        candidates
            .iter()
            .filter_map(|&i| {
                let dout = dir(&halves[i])?;
                let cross = din[0] * dout[1] - din[1] * dout[0];
                let dot = din[0] * dout[0] + din[1] * dout[1];
                let mut angle = cross.atan2(dot);
                if angle >= PI - 1e-12 || halves[i].edge == incoming.edge {
                    angle = -PI;
                }
                Some((i, angle))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Builds faces from closed cycles: counter-clockwise cycles are outer
    /// boundaries, clockwise ones holes.
    fn rebuild_faces(&mut self, cycles: Vec<Vec<HalfEdge>>) -> (Vec<FaceKey>, usize) {
        let eps = self.tolerance * self.tolerance;
        let mut outers = Vec::new();
        let mut holes = Vec::new();
        let mut dropped = 0;

        for cycle in cycles {
            let points: Vec<[f64; 2]> = cycle
                .iter()
                .filter_map(|h| self.vertices.get(h.from).map(|v| [v.x, v.y]))
                .collect();
            let area = signed_area_2d(&points);
            if area > eps {
                outers.push((cycle, points, area));
            } else if area < -eps {
                holes.push((cycle, points));
            } else {
                dropped += 1;
            }
        }

        let mut assigned: Vec<Vec<WireKey>> = vec![Vec::new(); outers.len()];
        for (cycle, points) in holes {
            let sample = hole_sample_point(&points);
            let host = outers
                .iter()
                .enumerate()
                .filter(|(_, (_, ring, _))| point_in_ring(sample, ring))
                .min_by(|a, b| a.1 .2.total_cmp(&b.1 .2))
                .map(|(i, _)| i);
            match host {
                Some(i) => {
                    let wire = self.wire_from_cycle(&cycle);
                    assigned[i].push(wire);
                }
                None => dropped += 1,
            }
        }

        let mut faces = Vec::with_capacity(outers.len());
        for ((cycle, _, _), inner) in outers.into_iter().zip(assigned) {
            let outer = self.wire_from_cycle(&cycle);
            let face = self.faces.insert(FaceData {
                outer_wire: outer,
                inner_wires: inner.clone(),
            });
            self.link_wire_face(outer, face);
            for w in inner {
                self.link_wire_face(w, face);
            }
            faces.push(face);
        }
        (faces, dropped)
    }

    fn wire_from_cycle(&mut self, cycle: &[HalfEdge]) -> WireKey {
        let edges = cycle.iter().map(|h| h.edge).collect();
        let orientations = cycle
            .iter()
            .map(|h| self.edges.get(h.edge).is_some_and(|e| e.start == h.from))
            .collect();
        self.insert_wire(edges, orientations)
    }

    /// Splits every edge at the vertices lying on its interior.
    ///
    /// Wires running over a split edge are rewritten to run over the pieces
    /// in order. Returns the number of edges split.
    pub fn split_edges_at_vertices(&mut self) -> usize {
        let tol = self.tolerance;
        let mut split = 0;

        for ek in self.edge_keys() {
            let Some((start, end)) = self.edge_vertices(ek) else {
                continue;
            };
            let (Some(a), Some(b)) = (self.vertex_point(start), self.vertex_point(end)) else {
                continue;
            };
            let d = b - a;
            let len_sq = d.norm_squared();
            if len_sq <= tol * tol {
                continue;
            }

            let mut on_edge: Vec<(f64, VertexKey)> = self
                .vertices
                .iter()
                .filter(|(vk, _)| *vk != start && *vk != end)
                .filter_map(|(vk, v)| {
                    let p = nalgebra::Point3::new(v.x, v.y, v.z);
                    let t = (p - a).dot(&d) / len_sq;
                    let closest = a + d * t;
                    let interior = t > 0.0 && t < 1.0;
                    (interior && (p - closest).norm() <= tol && (p - a).norm() > tol && (p - b).norm() > tol)
                        .then_some((t, vk))
                })
                .collect();
            if on_edge.is_empty() {
                continue;
            }
            on_edge.sort_by(|x, y| x.0.total_cmp(&y.0));

            let mut chain = Vec::with_capacity(on_edge.len() + 2);
            chain.push(start);
            chain.extend(on_edge.into_iter().map(|(_, v)| v));
            chain.push(end);

            if self.split_edge(ek, &chain).is_ok() {
                split += 1;
            }
        }
        split
    }

    /// Replaces `edge` by the edges along `chain` (start to end) in every wire.
    fn split_edge(&mut self, edge: EdgeKey, chain: &[VertexKey]) -> Result<()> {
        let mut pieces = Vec::with_capacity(chain.len() - 1);
        for w in chain.windows(2) {
            let piece = self.add_edge(w[0], w[1])?;
            let forward = self.edges[piece].start == w[0];
            pieces.push((piece, forward));
        }

        let mut users: Vec<WireKey> = self.edge_wires(edge).to_vec();
        users.sort();
        users.dedup();

        for wk in users {
            let Some(wire) = self.wires.get(wk) else {
                continue;
            };
            let mut edges = Vec::with_capacity(wire.edges.len() + pieces.len());
            let mut orientations = Vec::with_capacity(edges.capacity());
            let mut added = Vec::new();
            for (&ek, &fwd) in wire.edges.iter().zip(&wire.orientations) {
                if ek != edge {
                    edges.push(ek);
                    orientations.push(fwd);
                    continue;
                }
                let ordered: Vec<(EdgeKey, bool)> = if fwd {
                    pieces.clone()
                } else {
                    pieces.iter().rev().map(|&(p, pf)| (p, !pf)).collect()
                };
                for (p, pf) in ordered {
                    edges.push(p);
                    orientations.push(pf);
                    added.push(p);
                }
            }

            self.unlink_edge_wire(edge, wk);
            for p in added {
                self.link_edge_wire(p, wk);
            }
            if let Some(w) = self.wires.get_mut(wk) {
                w.edges = edges;
                w.orientations = orientations;
            }
        }

        self.remove_edge(edge);
        Ok(())
    }
}

/// A point just inside a clockwise hole ring, left of its longest edge.
fn hole_sample_point(points: &[[f64; 2]]) -> [f64; 2] {
    let n = points.len();
    let (i, _) = (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            (i, (b[0] - a[0]).hypot(b[1] - a[1]))
        })
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
    let (a, b) = (points[i], points[(i + 1) % n]);
    let mid = [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5];
    let len = (b[0] - a[0]).hypot(b[1] - a[1]).max(f64::MIN_POSITIVE);
    // Clockwise ring: the hole interior is on the right, the host on the left
    let offset = (len * 1e-3).min(1e-4);
    let left = [-(b[1] - a[1]) / len, (b[0] - a[0]) / len];
    [mid[0] + left[0] * offset, mid[1] + left[1] * offset]
}
