use std::io::{self, Read};

use crate::error::{BinaryError, BinaryResult};

/// Byte source with a fixed budget.
///
/// Every read draws down the budget. Asking for more than is left, or
/// hitting the end of the underlying source before the budget is spent,
/// yields [`BinaryError::Truncated`] instead of a short read. Length-prefixed
/// values are read through [`BoundedReader::nested`] and closed with
/// [`BoundedReader::finish`], which rejects leftover bytes.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    remaining: u64,
}

impl<'a> BoundedReader<&'a [u8]> {
    /// Reader over a whole slice.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::new(bytes, bytes.len() as u64)
    }
}

impl<R: Read> BoundedReader<R> {
    /// Wrap `inner`, allowing at most `limit` bytes to be read.
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }

    /// Budget left.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// True once the whole budget has been read.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Fails with `Truncated` when the budget or the input runs out.
    pub fn read_byte(&mut self) -> BinaryResult<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_array<const N: usize>(&mut self) -> BinaryResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// The budget is checked before allocating.
    pub fn read_bytes(&mut self, n: usize) -> BinaryResult<Vec<u8>> {
        self.check_budget(n as u64)?;
        let mut buf = vec![0u8; n];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read the rest of the budget.
    pub fn read_rest(&mut self) -> BinaryResult<Vec<u8>> {
        let n = usize::try_from(self.remaining).map_err(|_| BinaryError::LengthOverflow(usize::MAX))?;
        self.read_bytes(n)
    }

    /// A reader over the next `limit` bytes of this one.
    pub fn nested(&mut self, limit: u64) -> BinaryResult<BoundedReader<&mut Self>> {
        self.check_budget(limit)?;
        Ok(BoundedReader::new(self, limit))
    }

    /// Close a length-prefixed value; any unread budget is a framing error.
    pub fn finish(self, context: &'static str) -> BinaryResult<()> {
        if self.remaining != 0 {
            return Err(BinaryError::Trailing {
                context,
                remaining: self.remaining,
            });
        }
        Ok(())
    }

    /// Give back the wrapped reader, whatever budget is left.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn check_budget(&self, needed: u64) -> BinaryResult<()> {
        if needed > self.remaining {
            return Err(BinaryError::Truncated {
                needed,
                remaining: self.remaining,
            });
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> BinaryResult<()> {
        let needed = buf.len() as u64;
        self.check_budget(needed)?;
        let before = self.remaining;
        self.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => BinaryError::Truncated {
                needed,
                remaining: before,
            },
            _ => BinaryError::Io(e),
        })
    }
}

/// Plain `io::Read` over the budget, so a reader can be nested inside
/// another or handed to `read_exact`.
///
/// A spent budget reads as `Ok(0)`, the usual end-of-stream convention,
/// which cannot be told apart from a short source. Decoders go through
/// [`BoundedReader::read_byte`], [`BoundedReader::read_array`] and
/// [`BoundedReader::read_bytes`] instead; those fail with
/// [`BinaryError::Truncated`] rather than returning fewer bytes.
impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let max = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = self.inner.read(&mut buf[..max])?;
        self.remaining -= n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn spent_budget_is_truncation_not_a_short_read() {
        let mut reader = BoundedReader::new(&[1u8, 2, 3][..], 2);
        assert_eq!(reader.read_array::<2>().unwrap(), [1, 2]);
        assert!(matches!(reader.read_byte(), Err(BinaryError::Truncated { .. })));
        assert!(matches!(reader.read_bytes(1), Err(BinaryError::Truncated { .. })));
        let mut buf = [0u8; 4];
        assert_eq!(Read::read(&mut reader, &mut buf).unwrap(), 0);
    }

    #[test]
    fn reads_draw_down_budget() {
        let data = [1u8, 2, 3, 4, 5];
        let mut r = BoundedReader::new(&data[..], 4);
        assert_eq!(r.read_byte().unwrap(), 1);
        assert_eq!(r.remaining(), 3);
        assert_eq!(r.read_bytes(2).unwrap(), vec![2, 3]);
        assert_eq!(r.read_array::<1>().unwrap(), [4]);
        assert!(r.is_exhausted());
        assert!(matches!(
            r.read_byte(),
            Err(BinaryError::Truncated { needed: 1, remaining: 0 })
        ));
    }

    #[test]
    fn short_source_is_truncation_not_short_read() {
        let data = [1u8, 2];
        let mut r = BoundedReader::new(&data[..], 10);
        assert!(matches!(
            r.read_bytes(3),
            Err(BinaryError::Truncated { needed: 3, .. })
        ));
    }

    #[test]
    fn nested_reader_must_be_consumed() {
        let data = [1u8, 2, 3, 4];
        let mut outer = BoundedReader::from_slice(&data);
        {
            let mut inner = outer.nested(2).unwrap();
            assert_eq!(inner.read_byte().unwrap(), 1);
            let err = inner.finish("blob").unwrap_err();
            assert!(matches!(err, BinaryError::Trailing { context: "blob", remaining: 1 }));
        }
        assert_eq!(outer.remaining(), 3);
        assert!(outer.nested(4).is_err());
        let mut inner = outer.nested(3).unwrap();
        assert_eq!(inner.read_rest().unwrap(), vec![2, 3, 4]);
        inner.finish("blob").unwrap();
        assert!(outer.is_exhausted());
    }

    #[test]
    fn io_read_stops_at_budget() {
        let data = [7u8; 8];
        let mut r = BoundedReader::new(&data[..], 3);
        let mut buf = [0u8; 8];
        assert_eq!(r.read(&mut buf).unwrap(), 3);
        assert_eq!(r.read(&mut buf).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn prop_exactly_budget_bytes_readable(
            data in proptest::collection::vec(any::<u8>(), 0..256),
            cut in any::<proptest::sample::Index>(),
        ) {
            let budget = cut.index(data.len() + 1);
            let mut r = BoundedReader::new(&data[..], budget as u64);
            let mut count = 0;
            while r.read_byte().is_ok() {
                count += 1;
            }
            prop_assert_eq!(count, budget);
            prop_assert_eq!(r.remaining(), 0);
            prop_assert_eq!(&r.into_inner()[..], &data[budget..]);
        }
    }
}
