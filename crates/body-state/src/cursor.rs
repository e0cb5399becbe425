use crate::schema::align_up;
use crate::{DecodeError, DecodeResult};

/// Byte-offset tracker over one record, replicating C natural-alignment padding.
///
/// Multi-byte values are little-endian, matching the x86/ARM producers.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Skip padding up to the next multiple of `align`.
    pub fn align_to(&mut self, align: usize) -> DecodeResult<()> {
        let next = align_up(self.pos, align);
        if next > self.buf.len() {
            return Err(self.out_of_bounds(next - self.pos));
        }
        self.pos = next;
        Ok(())
    }

    /// One byte, no alignment. Any nonzero value is `true`.
    pub fn read_bool(&mut self) -> DecodeResult<bool> {
        let [b] = self.take::<1>()?;
        Ok(b != 0)
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        self.read_aligned().map(f32::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        self.read_aligned().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        self.read_aligned().map(u64::from_le_bytes)
    }

    fn read_aligned<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        self.align_to(N)?;
        self.take()
    }

    fn take<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let end = self.pos + N;
        let src = self
            .buf
            .get(self.pos..end)
            .ok_or_else(|| self.out_of_bounds(N))?;
        let mut out = [0u8; N];
        out.copy_from_slice(src);
        self.pos = end;
        Ok(out)
    }

    fn out_of_bounds(&self, needed: usize) -> DecodeError {
        DecodeError::OutOfBounds {
            offset: self.pos,
            needed,
            len: self.buf.len(),
        }
    }
}
