//! Test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Deterministic binary payload spanning several GridFS chunks of `chunk_size`.
pub fn binary_payload(chunk_size: usize, chunks: usize) -> Vec<u8> {
    (0..chunk_size * chunks + chunk_size / 3).map(|i| (i * 31 % 251) as u8).collect()
}

/// Write a fake JPEG (magic bytes followed by a payload) to `path`.
pub fn write_image(path: &Path, len: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend((0..len).map(|i| (i % 256) as u8));
    fs::write(path, &bytes).expect("Failed to write image fixture");
    bytes
}

/// Write a JSON Lines colour palette with `count` documents to `path`.
pub fn write_colors(path: &Path, count: usize) {
    let lines: Vec<String> = (0..count)
        .map(|i| format!(r##"{{"color": "color_{i}", "value": "#{:06x}"}}"##, i * 4096))
        .collect();
    fs::write(path, lines.join("\n") + "\n").expect("Failed to write colors fixture");
}
