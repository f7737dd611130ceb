#![allow(unused)]

use qips::MAGIC;
use rand::distributions::{Distribution, Uniform};
use rand::prelude::*;

/// Builds IPS patches record by record.
pub struct PatchBuilder {
    bytes: Vec<u8>,
}

impl PatchBuilder {
    pub fn new() -> Self {
        PatchBuilder {
            bytes: MAGIC.to_vec(),
        }
    }

    pub fn literal(mut self, offset: usize, payload: &[u8]) -> Self {
        assert!(!payload.is_empty() && payload.len() <= 0xffff);
        self.push_offset(offset);
        self.push_u16(payload.len());
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn rle(mut self, offset: usize, length: usize, value: u8) -> Self {
        assert!(length <= 0xffff);
        self.push_offset(offset);
        self.push_u16(0);
        self.push_u16(length);
        self.bytes.push(value);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.extend_from_slice(b"EOF");
        self.bytes
    }

    pub fn unterminated(self) -> Vec<u8> {
        self.bytes
    }

    fn push_offset(&mut self, offset: usize) {
        assert!(offset < 0x1000000);
        self.bytes
            .extend_from_slice(&[(offset >> 16) as u8, (offset >> 8) as u8, offset as u8]);
    }

    fn push_u16(&mut self, x: usize) {
        self.bytes.extend_from_slice(&[(x >> 8) as u8, x as u8]);
    }
}

pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut rng = thread_rng();
    let mut bytes = vec![0; n];
    rng.fill_bytes(&mut bytes[..]);
    bytes
}

/// Random non-overlapping edits inside `size` bytes as
/// `(offset, payload, is_run)`.
pub fn random_edits(size: usize, count: usize) -> Vec<(usize, Vec<u8>, bool)> {
    let mut rng = thread_rng();
    let lens = Uniform::new_inclusive(1, 64);
    let mut edits = Vec::new();
    let mut at = 0;
    for _ in 0..count {
        at += rng.gen_range(0, 128);
        let n = lens.sample(&mut rng);
        if at + n > size {
            break;
        }
        let rle = rng.gen::<bool>();
        let payload = if rle {
            vec![rng.gen::<u8>(); n]
        } else {
            random_bytes(n)
        };
        edits.push((at, payload, rle));
        at += n;
    }
    edits
}
