//! Bounded cursor over the raw bytes of a `.class` file.
//!
//! Every multi-byte quantity in the format is big-endian. The cursor never
//! reads past the end of its buffer; an exhausted read reports the offset it
//! failed at so the error points into the original file.

use crate::classfile::ClassfileError;
use bumpalo::Bump;
use std::borrow::Cow;

pub(crate) trait FromBeBytes {
    type Bytes: Sized;
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_from_be_bytes {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromBeBytes for $t {
                type Bytes = [u8; core::mem::size_of::<$t>()];
                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$t>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_from_be_bytes!(u8, u16, u32, i32, i64, f32, f64);

/// Read cursor over a classfile buffer.
#[derive(Debug)]
pub(crate) struct Reader<'b> {
    buffer: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Reader { buffer, pos: 0 }
    }

    /// Current position, in bytes from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn read<T>(&mut self) -> Result<T, ClassfileError>
    where
        T: FromBeBytes,
        T::Bytes: AsMut<[u8]> + Default,
    {
        let mut bytes = T::Bytes::default();
        let size = bytes.as_mut().len();
        let end = self.pos + size;
        if end > self.buffer.len() {
            return Err(ClassfileError::Truncated(self.pos));
        }

        bytes.as_mut().copy_from_slice(&self.buffer[self.pos..end]);
        self.pos = end;
        Ok(T::from_be_bytes(bytes))
    }

    pub fn read_bytes(&mut self, size: usize) -> Result<&'b [u8], ClassfileError> {
        let end = self.pos + size;
        if end > self.buffer.len() {
            return Err(ClassfileError::Truncated(self.pos));
        }

        let bytes = &self.buffer[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads a 16-bit byte count followed by that many bytes of Java's
    /// modified UTF-8.
    ///
    /// `C0 80` decodes to U+0000 and a pair of surrogate three-byte sequences
    /// recombines into the supplementary character it encodes.
    pub fn read_utf8(&mut self) -> Result<Cow<'b, str>, ClassfileError> {
        let length = self.read::<u16>()? as usize;
        self.read_cesu8(length)
    }

    /// Decodes `length` bytes of modified UTF-8 without a count prefix.
    pub fn read_cesu8(&mut self, length: usize) -> Result<Cow<'b, str>, ClassfileError> {
        let offset = self.pos;
        let bytes = self.read_bytes(length)?;
        cesu8::from_java_cesu8(bytes).map_err(|source| ClassfileError::InvalidUtf8 { offset, source })
    }
}

/// Moves a decoded string into the arena unless it already borrows from the
/// classfile buffer.
pub(crate) fn alloc_str<'b, 'c>(value: Cow<'b, str>, arena: &'c Bump) -> &'c str
where
    'b: 'c,
{
    match value {
        Cow::Borrowed(value) => value,
        Cow::Owned(value) => arena.alloc_str(&value),
    }
}
