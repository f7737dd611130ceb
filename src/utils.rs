use byteorder::{ByteOrder, BE};

/// Reads a single byte.
///
/// The cursor advances only if the read succeeds, otherwise `0` is returned.
#[inline]
pub fn read1(buf: &[u8], cursor: &mut usize) -> u8 {
    match buf.get(*cursor) {
        Some(&b) => {
            *cursor += 1;
            b
        }
        None => 0,
    }
}

/// Reads a big-endian `u16`.
///
/// The cursor always advances by 2, `0` is returned if it runs past the end.
#[inline]
pub fn read2_be(buf: &[u8], cursor: &mut usize) -> u16 {
    match advance(buf, cursor, 2) {
        Some(b) => BE::read_u16(b),
        None => 0,
    }
}

/// Reads a big-endian 24-bit integer.
///
/// The cursor always advances by 3, `0` is returned if it runs past the end.
#[inline]
pub fn read3_be(buf: &[u8], cursor: &mut usize) -> u32 {
    match advance(buf, cursor, 3) {
        Some(b) => BE::read_u24(b),
        None => 0,
    }
}

/// Writes a single byte.
///
/// Nothing happens and the cursor stays put if it is out of range.
#[inline]
pub fn write1(buf: &mut [u8], value: u8, cursor: &mut usize) {
    if let Some(b) = buf.get_mut(*cursor) {
        *b = value;
        *cursor += 1;
    }
}

/// Moves the cursor forth by `n` and returns the bytes passed over if they
/// are all inside `buf`.
#[inline]
fn advance<'a>(buf: &'a [u8], cursor: &mut usize, n: usize) -> Option<&'a [u8]> {
    let start = *cursor;
    *cursor = start.saturating_add(n);
    buf.get(start..*cursor).filter(|b| b.len() == n)
}
