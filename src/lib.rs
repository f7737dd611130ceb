/*!
Small and strict applier of IPS patches over in-memory buffers.

An IPS patch is the magic `PATCH`, followed by records that either write
literal bytes or fill a run of one byte at a 24-bit offset, optionally ended
by the marker `EOF`. The format carries no target size, so it has to be
inferred by scanning the records first:

```
use qips::{apply, infer_output_size, verify_header};

let patch = b"PATCH\x00\x00\x00\x00\x03\xaa\xbb\xccEOF";
let source = [0u8; 10];

assert!(verify_header(patch));
let mut target = vec![0; infer_output_size(patch)];
apply(&mut target[..], &source[..], patch).unwrap();
assert_eq!(target, [0xaa, 0xbb, 0xcc]);
```
*/

mod ipspatch;
mod utils;


pub use ipspatch::{
    apply, infer_output_size, records, verify_header, Ipspatch, Records, EOF_MARKER,
    HEADER_SIZE, MAGIC, PATCH_MAX_SIZE, PATCH_MIN_SIZE,
};

/// Single IPS record.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Record<'p> {
    /// Writes `length` bytes of the patch stream at `offset`.
    ///
    /// `payload` holds the bytes actually present in the patch, which is
    /// shorter than `length` if the patch is truncated.
    Literal {
        offset: usize,
        length: usize,
        payload: &'p [u8],
    },

    /// Writes `length` copies of `value` at `offset`.
    ///
    /// `exhausted` is set if the patch has no byte left after the run
    /// descriptor, in which case no byte of the run can be written.
    Rle {
        offset: usize,
        length: usize,
        value: u8,
        exhausted: bool,
    },
}

impl Record<'_> {
    /// Position of the first byte written.
    pub fn offset(&self) -> usize {
        match *self {
            Record::Literal { offset, .. } | Record::Rle { offset, .. } => offset,
        }
    }

    /// Number of bytes the record declares to write.
    pub fn len(&self) -> usize {
        match *self {
            Record::Literal { length, .. } | Record::Rle { length, .. } => length,
        }
    }

    /// Whether the record writes nothing, which only a run can do.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position just past the last byte written.
    pub fn end(&self) -> usize {
        self.offset() + self.len()
    }
}
