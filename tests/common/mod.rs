//! Test helper: build temporary-archive byte streams in memory

use temparc_rs::encode_compact_index;

/// Builds the container byte stream entry by entry
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; the name is written with its trailing terminator and a
    /// compact-index length that includes it, as the format requires.
    pub fn entry(mut self, name: &str, payload: &[u8]) -> Self {
        self.entries.push((name.as_bytes().to_vec(), payload.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_with_count(self.entries.len() as u32)
    }

    /// Build with an arbitrary header count, for corrupt-archive scenarios
    pub fn build_with_count(&self, count: u32) -> Vec<u8> {
        let mut out = count.to_le_bytes().to_vec();
        for (name, payload) in &self.entries {
            out.extend(encode_compact_index(name.len() as i64 + 1));
            out.extend_from_slice(name);
            out.push(0);
            out.extend(encode_compact_index(payload.len() as i64));
            out.extend_from_slice(payload);
        }
        out
    }
}
