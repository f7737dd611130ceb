#![forbid(unsafe_code)]
use super::utils::*;
use super::Record;
use std::io::{Error, ErrorKind, Result};
use std::iter::FusedIterator;

/// Magic bytes every IPS patch starts with.
pub const MAGIC: &[u8; 5] = b"PATCH";

/// Value of the 3-byte offset field that ends the record stream (`EOF`).
pub const EOF_MARKER: u32 = 0x454f46;

/// Size of the patch header.
pub const HEADER_SIZE: usize = 5;

/// Min size of an applicable patch.
pub const PATCH_MIN_SIZE: usize = 9;

/// Max size of an applicable patch (16 MiB).
pub const PATCH_MAX_SIZE: usize = 0x1000000;

/// Checks whether `patch` starts with the IPS magic.
pub fn verify_header(patch: &[u8]) -> bool {
    patch.len() >= HEADER_SIZE && &patch[..HEADER_SIZE] == MAGIC
}

/// Infers the least target size that every record of `patch` fits in.
///
/// The header is not checked, an empty record stream gives `0`.
pub fn infer_output_size(patch: &[u8]) -> usize {
    target_size(records(patch))
}

/// Decodes the records following the header of `patch`.
pub fn records(patch: &[u8]) -> Records<'_> {
    Records {
        patch,
        cursor: HEADER_SIZE,
        done: false,
    }
}

/// Applies `patch` onto `target`, which is first seeded from `source`.
///
/// Every record is decoded again. Use [`Ipspatch`] to apply one patch more
/// than once or to get the inferred target size without scanning twice.
///
/// On failure the target may be left partially patched.
pub fn apply(target: &mut [u8], source: &[u8], patch: &[u8]) -> Result<()> {
    check_buffers(target, source)?;
    check_patch(patch)?;
    seed(target, source);
    for record in records(patch) {
        apply_record(target, &record)?;
    }
    Ok(())
}

/// IPS patcher with the records decoded once.
///
/// Apply patch to source, sizing the target by the patch:
/// ```
/// use std::io;
/// use qips::Ipspatch;
///
/// fn ipspatch(source: &[u8], patch: &[u8]) -> io::Result<Vec<u8>> {
///     let patcher = Ipspatch::new(patch)?;
///     let mut target = vec![0; Ord::max(source.len(), patcher.hint_target_size())];
///     patcher.apply(&mut target[..], source)?;
///     Ok(target)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Ipspatch<'p> {
    records: Vec<Record<'p>>,
    tsize: usize,
}

impl<'p> Ipspatch<'p> {
    /// Validate and decode the patch file.
    ///
    /// Return error if the patch size is out of range or the header is bad.
    pub fn new(patch: &'p [u8]) -> Result<Self> {
        check_patch(patch)?;
        let records: Vec<_> = records(patch).collect();
        let tsize = target_size(records.iter().copied());
        log::debug!(
            "decoded {} records from {} bytes of patch, target size {}",
            records.len(),
            patch.len(),
            tsize
        );
        Ok(Ipspatch { records, tsize })
    }

    /// Hint the least target size, as inferred from the records.
    pub fn hint_target_size(&self) -> usize {
        self.tsize
    }

    /// Decoded records, in patch order.
    pub fn records(&self) -> &[Record<'p>] {
        &self.records[..]
    }

    /// Apply patch onto `target`, which is first seeded from `source`.
    ///
    /// Behaves exactly as [`apply`] does, partial writes on failure included.
    pub fn apply(&self, target: &mut [u8], source: &[u8]) -> Result<()> {
        check_buffers(target, source)?;
        seed(target, source);
        for record in self.records.iter() {
            apply_record(target, record)?;
        }
        log::debug!(
            "applied {} records onto {} bytes of target",
            self.records.len(),
            target.len()
        );
        Ok(())
    }

    /// Apply patch to `source` and return the target, sized to hold both the
    /// whole source and every record.
    pub fn apply_to_vec(&self, source: &[u8]) -> Result<Vec<u8>> {
        let mut target = vec![0; Ord::max(source.len(), self.tsize)];
        self.apply(&mut target[..], source)?;
        Ok(target)
    }
}

/// Iterator over the records of a patch, see [`records`].
///
/// Stops at the `EOF` marker or when the patch runs out.
#[derive(Debug, Clone)]
pub struct Records<'p> {
    patch: &'p [u8],
    cursor: usize,
    done: bool,
}

impl<'p> Records<'p> {
    /// Current position in the patch, past the last decoded record.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<'p> Iterator for Records<'p> {
    type Item = Record<'p>;

    fn next(&mut self) -> Option<Record<'p>> {
        let patch = self.patch;
        if self.done || self.cursor >= patch.len() {
            self.done = true;
            return None;
        }

        let offset = read3_be(patch, &mut self.cursor);
        if offset == EOF_MARKER {
            self.done = true;
            return None;
        }
        let offset = offset as usize;

        let length = read2_be(patch, &mut self.cursor) as usize;
        if length == 0 {
            let length = read2_be(patch, &mut self.cursor) as usize;
            let value = read1(patch, &mut self.cursor);
            Some(Record::Rle {
                offset,
                length,
                value,
                exhausted: self.cursor >= patch.len(),
            })
        } else {
            let start = Ord::min(self.cursor, patch.len());
            let end = Ord::min(self.cursor.saturating_add(length), patch.len());
            self.cursor = self.cursor.saturating_add(length);
            Some(Record::Literal {
                offset,
                length,
                payload: &patch[start..end],
            })
        }
    }
}

impl FusedIterator for Records<'_> {}

fn target_size<'p, I>(records: I) -> usize
where
    I: IntoIterator<Item = Record<'p>>,
{
    records.into_iter().map(|r| r.end()).max().unwrap_or(0)
}

fn check_buffers(target: &[u8], source: &[u8]) -> Result<()> {
    if target.is_empty() {
        return Err(Error::new(ErrorKind::InvalidInput, "empty target"));
    }
    if source.is_empty() {
        return Err(Error::new(ErrorKind::InvalidInput, "empty source"));
    }
    Ok(())
}

fn check_patch(patch: &[u8]) -> Result<()> {
    if patch.len() < PATCH_MIN_SIZE || patch.len() > PATCH_MAX_SIZE {
        log::debug!("rejected patch of {} bytes", patch.len());
        return Err(Error::new(ErrorKind::InvalidData, "patch size out of range"));
    }
    if !verify_header(patch) {
        log::debug!("rejected patch with header {:?}", &patch[..HEADER_SIZE]);
        return Err(Error::new(ErrorKind::InvalidData, "not a valid patch"));
    }
    Ok(())
}

/// Copy the part of source that overlaps target.
fn seed(target: &mut [u8], source: &[u8]) {
    let n = Ord::min(target.len(), source.len());
    target[..n].copy_from_slice(&source[..n]);
}

/// Write a record byte by byte, failing on the first byte that either falls
/// outside target or is missing from the patch.
fn apply_record(target: &mut [u8], record: &Record) -> Result<()> {
    log::trace!("apply {:?}", record);
    let mut cursor = record.offset();
    match *record {
        Record::Literal {
            length, payload, ..
        } => {
            for i in 0..length {
                check_target(target, cursor)?;
                let value = *payload.get(i).ok_or_else(truncated)?;
                write1(target, value, &mut cursor);
            }
        }
        Record::Rle {
            length,
            value,
            exhausted,
            ..
        } => {
            for _ in 0..length {
                check_target(target, cursor)?;
                if exhausted {
                    return Err(truncated());
                }
                write1(target, value, &mut cursor);
            }
        }
    }
    Ok(())
}

#[inline]
fn check_target(target: &[u8], cursor: usize) -> Result<()> {
    if cursor >= target.len() {
        log::debug!("record writes at {} beyond target of {} bytes", cursor, target.len());
        return Err(Error::new(ErrorKind::WriteZero, "write beyond target"));
    }
    Ok(())
}

fn truncated() -> Error {
    Error::new(ErrorKind::UnexpectedEof, "patch truncated")
}
