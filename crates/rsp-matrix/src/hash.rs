use rsp_axis::{Axis, BinEdges, Binning};
use rsp_core::MatrixMeta;
use sha2::{Digest, Sha256};

use crate::fixed::OrderedMatrix;
use crate::general::GeneralMatrix;

/// Content hash of a fixed-order matrix: axes, names, metadata and value bits.
pub fn canonical_hash_ordered(matrix: &OrderedMatrix) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"ordered");
    encode_meta(matrix.meta(), &mut hasher);
    hasher.update((matrix.order() as u64).to_le_bytes());
    for (edges, name) in matrix.axes().iter().zip(matrix.axis_names()) {
        encode_str(name, &mut hasher);
        encode_edges(edges, &mut hasher);
    }
    encode_values(matrix.values(), &mut hasher);
    format!("{:x}", hasher.finalize())
}

/// Content hash of a general matrix: axes, names, metadata and value bits.
pub fn canonical_hash_general(matrix: &GeneralMatrix) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"general");
    encode_meta(matrix.meta(), &mut hasher);
    hasher.update((matrix.axis_count() as u64).to_le_bytes());
    for axis in matrix.axes() {
        encode_axis(axis, &mut hasher);
    }
    encode_values(matrix.values(), &mut hasher);
    format!("{:x}", hasher.finalize())
}

fn encode_meta(meta: &MatrixMeta, hasher: &mut Sha256) {
    encode_str(&meta.name, hasher);
    hasher.update(meta.simulated_events.to_le_bytes());
    hasher.update(meta.far_field_area.to_bits().to_le_bytes());
    hasher.update(meta.hash.to_le_bytes());
    hasher.update([u8::from(meta.anchor.is_centered())]);
}

fn encode_axis(axis: &Axis, hasher: &mut Sha256) {
    hasher.update((axis.names().len() as u64).to_le_bytes());
    for name in axis.names() {
        encode_str(name, hasher);
    }
    match axis.binning() {
        Binning::Edges(edges) => {
            hasher.update(b"edges");
            encode_edges(edges, hasher);
        }
        Binning::Fisbel(fisbel) => {
            hasher.update(b"fisbel");
            hasher.update((fisbel.requested_bins() as u64).to_le_bytes());
            hasher.update(fisbel.longitude_shift().to_bits().to_le_bytes());
        }
    }
}

fn encode_edges(edges: &BinEdges, hasher: &mut Sha256) {
    hasher.update((edges.edges().len() as u64).to_le_bytes());
    for edge in edges.edges() {
        hasher.update(edge.to_bits().to_le_bytes());
    }
}

fn encode_values(values: &[f32], hasher: &mut Sha256) {
    hasher.update((values.len() as u64).to_le_bytes());
    for value in values {
        hasher.update(value.to_bits().to_le_bytes());
    }
}

fn encode_str(text: &str, hasher: &mut Sha256) {
    hasher.update((text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
}

impl OrderedMatrix {
    /// SHA-256 hex digest of axes, names, metadata and values.
    pub fn canonical_hash(&self) -> String {
        canonical_hash_ordered(self)
    }
}

impl GeneralMatrix {
    /// SHA-256 hex digest of axes, names, metadata and values.
    pub fn canonical_hash(&self) -> String {
        canonical_hash_general(self)
    }
}
