// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based mesh storage.
//!
//! Each mesh entity gets a unique, type-safe key for O(1) lookup in the
//! mesh. Keys are created by `slotmap::SlotMap` and remain valid even after
//! other entities are removed (generational indices).

use slotmap::new_key_type;

new_key_type! {
    /// Key for a vertex (point in plane-local coordinates).
    pub struct VertexKey;

    /// Key for an edge (segment between two distinct vertices).
    pub struct EdgeKey;

    /// Key for a wire (closed, ordered loop of edges).
    pub struct WireKey;

    /// Key for a face (region bounded by one outer wire and inner wires).
    pub struct FaceKey;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn keys_are_distinct_after_removal() {
        let mut edges: SlotMap<EdgeKey, ()> = SlotMap::with_key();
        let a = edges.insert(());
        edges.remove(a);
        let b = edges.insert(());
        assert_ne!(a, b);
    }
}
