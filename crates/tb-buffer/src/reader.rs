use crate::datetime::DateTime;
use crate::envelope::Envelope;
use crate::error::{BufferError, BufferResult};

/// A fixed-little-endian binary reader over a borrowed byte slice.
///
/// Every read advances a position cursor; requesting more bytes than
/// remain fails with `ReadPastEnd` rather than panicking.
#[derive(Debug)]
pub struct BufferReader<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> BufferReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        BufferReader { buf, position: 0 }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    fn take(&mut self, n: usize) -> BufferResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(BufferError::ReadPastEnd {
                requested: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    pub fn read_bytes(&mut self, dst: &mut [u8]) -> BufferResult<()> {
        let slice = self.take(dst.len())?;
        dst.copy_from_slice(slice);
        Ok(())
    }

    pub fn read_bool(&mut self) -> BufferResult<bool> {
        Ok(self.take(1)?[0] != 0)
    }
    pub fn read_i8(&mut self) -> BufferResult<i8> {
        Ok(self.take(1)?[0] as i8)
    }
    pub fn read_u8(&mut self) -> BufferResult<u8> {
        Ok(self.take(1)?[0])
    }
    pub fn read_i16(&mut self) -> BufferResult<i16> {
        Ok(i16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }
    pub fn read_u16(&mut self) -> BufferResult<u16> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }
    pub fn read_i32(&mut self) -> BufferResult<i32> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }
    pub fn read_u32(&mut self) -> BufferResult<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }
    pub fn read_i64(&mut self) -> BufferResult<i64> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }
    pub fn read_u64(&mut self) -> BufferResult<u64> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }
    pub fn read_f32(&mut self) -> BufferResult<f32> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }
    pub fn read_f64(&mut self) -> BufferResult<f64> {
        Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_char(&mut self) -> BufferResult<char> {
        let unit = self.read_u16()?;
        Ok(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    pub fn read_datetime(&mut self) -> BufferResult<DateTime> {
        Ok(DateTime::from_ticks(self.read_i64()?))
    }

    /// Symmetric with `write_string`: a `-1` length prefix yields `None`;
    /// any non-negative length reads that many UTF-8 bytes.
    pub fn read_string(&mut self) -> BufferResult<Option<String>> {
        let len = self.read_i32()?;
        if len == -1 {
            return Ok(None);
        }
        if len < -1 {
            return Err(BufferError::InvalidStringLength(len));
        }
        let bytes = self.take(len as usize)?;
        Ok(Some(String::from_utf8(bytes.to_vec())?))
    }

    /// Reads the 24-byte packed envelope layout exactly.
    pub fn read_envelope(&mut self) -> BufferResult<Envelope> {
        let source_id = self.read_i32()?;
        let sequence_id = self.read_i32()?;
        let originating_time = self.read_datetime()?;
        let creation_time = self.read_datetime()?;
        Ok(Envelope::new(
            source_id,
            sequence_id,
            originating_time,
            creation_time,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::BufferWriter;

    #[test]
    fn read_past_end_fails() {
        let buf = [0u8; 2];
        let mut r = BufferReader::new(&buf);
        assert!(matches!(
            r.read_i64(),
            Err(BufferError::ReadPastEnd { .. })
        ));
    }

    #[test]
    fn envelope_round_trip_for_all_values() {
        let cases = [
            Envelope::new(0, 0, DateTime::from_ticks(0), DateTime::from_ticks(0)),
            Envelope::new(
                i32::MIN,
                i32::MAX,
                DateTime::from_ticks(i64::MIN),
                DateTime::from_ticks(i64::MAX),
            ),
            Envelope::new(7, 42, DateTime::from_ticks(1_000), DateTime::from_ticks(1_500)),
        ];
        for e in cases {
            let mut w = BufferWriter::new();
            w.write_envelope(&e);
            let bytes = w.into_vec();
            let mut r = BufferReader::new(&bytes);
            assert_eq!(r.read_envelope().unwrap(), e);
        }
    }

    #[test]
    fn string_round_trip() {
        for v in [None, Some(""), Some("hello world"), Some("utf8 \u{1F600}")] {
            let mut w = BufferWriter::new();
            w.write_string(v);
            let bytes = w.into_vec();
            let mut r = BufferReader::new(&bytes);
            assert_eq!(r.read_string().unwrap().as_deref(), v);
        }
    }

    #[test]
    fn bytes_round_trip() {
        let mut w = BufferWriter::new();
        w.write_bytes(&[1, 2, 3, 4]);
        let bytes = w.into_vec();
        let mut r = BufferReader::new(&bytes);
        let mut dst = [0u8; 4];
        r.read_bytes(&mut dst).unwrap();
        assert_eq!(dst, [1, 2, 3, 4]);
    }
}
