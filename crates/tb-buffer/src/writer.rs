use crate::datetime::DateTime;
use crate::envelope::Envelope;

/// A resizable, fixed-little-endian binary writer with no alignment
/// padding. Auto-grows by doubling: `max(2*capacity, position+needed)`.
#[derive(Debug, Default)]
pub struct BufferWriter {
    buf: Vec<u8>,
    position: usize,
}

impl BufferWriter {
    #[must_use]
    pub fn new() -> Self {
        BufferWriter {
            buf: Vec::new(),
            position: 0,
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        BufferWriter {
            buf: vec![0u8; capacity],
            position: 0,
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The written prefix of the buffer, i.e. `[0, position)`.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.position]
    }

    #[must_use]
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.position);
        self.buf
    }

    fn ensure_capacity(&mut self, needed: usize) {
        let required = self.position + needed;
        if required > self.buf.len() {
            let grown = (2 * self.buf.len().max(1)).max(required);
            self.buf.resize(grown, 0);
        }
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.ensure_capacity(bytes.len());
        self.buf[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.push_bytes(bytes);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.push_bytes(&[u8::from(v)]);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.push_bytes(&v.to_le_bytes());
    }
    pub fn write_u8(&mut self, v: u8) {
        self.push_bytes(&[v]);
    }
    pub fn write_i16(&mut self, v: i16) {
        self.push_bytes(&v.to_le_bytes());
    }
    pub fn write_u16(&mut self, v: u16) {
        self.push_bytes(&v.to_le_bytes());
    }
    pub fn write_i32(&mut self, v: i32) {
        self.push_bytes(&v.to_le_bytes());
    }
    pub fn write_u32(&mut self, v: u32) {
        self.push_bytes(&v.to_le_bytes());
    }
    pub fn write_i64(&mut self, v: i64) {
        self.push_bytes(&v.to_le_bytes());
    }
    pub fn write_u64(&mut self, v: u64) {
        self.push_bytes(&v.to_le_bytes());
    }
    pub fn write_f32(&mut self, v: f32) {
        self.push_bytes(&v.to_le_bytes());
    }
    pub fn write_f64(&mut self, v: f64) {
        self.push_bytes(&v.to_le_bytes());
    }

    /// `char` is written as a UTF-16 code unit, matching the source's
    /// 2-byte wire representation.
    pub fn write_char(&mut self, v: char) {
        let mut units = [0u16; 2];
        let encoded = v.encode_utf16(&mut units);
        self.write_u16(encoded[0]);
    }

    pub fn write_datetime(&mut self, v: DateTime) {
        self.write_i64(v.ticks());
    }

    /// `None` writes the `-1` length sentinel; `Some(s)` writes the UTF-8
    /// byte length as `i32` followed by the bytes (no trailing nul).
    pub fn write_string(&mut self, v: Option<&str>) {
        match v {
            None => self.write_i32(-1),
            Some(s) => {
                let bytes = s.as_bytes();
                self.write_i32(bytes.len() as i32);
                self.push_bytes(bytes);
            }
        }
    }

    /// Writes the 24-byte packed envelope layout exactly:
    /// `source_id: i32, sequence_id: i32, originating_time: i64, creation_time: i64`.
    pub fn write_envelope(&mut self, e: &Envelope) {
        self.write_i32(e.source_id);
        self.write_i32(e.sequence_id);
        self.write_datetime(e.originating_time);
        self.write_datetime(e.creation_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_by_doubling() {
        let mut w = BufferWriter::with_capacity(4);
        for _ in 0..10 {
            w.write_u64(0);
        }
        assert_eq!(w.position(), 80);
        assert!(w.as_slice().len() == 80);
    }

    #[test]
    fn string_none_writes_sentinel() {
        let mut w = BufferWriter::new();
        w.write_string(None);
        assert_eq!(w.as_slice(), &(-1i32).to_le_bytes());
    }

    #[test]
    fn string_some_writes_len_then_bytes() {
        let mut w = BufferWriter::new();
        w.write_string(Some("hi"));
        let mut expected = 2i32.to_le_bytes().to_vec();
        expected.extend_from_slice(b"hi");
        assert_eq!(w.as_slice(), expected.as_slice());
    }

    #[test]
    fn envelope_is_24_bytes() {
        let mut w = BufferWriter::new();
        w.write_envelope(&Envelope::new(
            1,
            2,
            DateTime::from_ticks(3),
            DateTime::from_ticks(4),
        ));
        assert_eq!(w.position(), 24);
    }
}
