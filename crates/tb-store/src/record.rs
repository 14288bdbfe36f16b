use crate::error::{StoreError, StoreResult};
use tb_buffer::{BufferReader, BufferWriter, Envelope};

/// One persisted (or on-wire) message: the 24-byte envelope, a 32-bit
/// little-endian payload length, then the payload bytes. No padding, no
/// alignment — identical on disk and over the data channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub envelope: Envelope,
    pub payload: Vec<u8>,
}

impl MessageRecord {
    #[must_use]
    pub fn new(envelope: Envelope, payload: Vec<u8>) -> Self {
        MessageRecord { envelope, payload }
    }

    pub fn write(&self, w: &mut BufferWriter) {
        w.write_envelope(&self.envelope);
        w.write_i32(self.payload.len() as i32);
        w.write_bytes(&self.payload);
    }

    pub fn read(r: &mut BufferReader<'_>) -> StoreResult<Self> {
        let envelope = r.read_envelope()?;
        let len = r.read_i32()?;
        if len < 0 {
            return Err(StoreError::DeserializeFailure(format!(
                "negative payload length {len}"
            )));
        }
        let mut payload = vec![0u8; len as usize];
        r.read_bytes(&mut payload)?;
        Ok(MessageRecord { envelope, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_buffer::DateTime;

    #[test]
    fn record_round_trips_through_the_wire_format() {
        let record = MessageRecord::new(
            Envelope::new(1, 2, DateTime::from_ticks(100), DateTime::from_ticks(150)),
            vec![9, 9, 9],
        );
        let mut w = BufferWriter::new();
        record.write(&mut w);
        let bytes = w.into_vec();
        assert_eq!(bytes.len(), 24 + 4 + 3);
        let mut r = BufferReader::new(&bytes);
        let read_back = MessageRecord::read(&mut r).unwrap();
        assert_eq!(read_back, record);
    }

    #[test]
    fn sequential_records_concatenate_without_padding() {
        let a = MessageRecord::new(Envelope::new(1, 0, DateTime::from_ticks(0), DateTime::from_ticks(0)), vec![1]);
        let b = MessageRecord::new(Envelope::new(1, 1, DateTime::from_ticks(10), DateTime::from_ticks(10)), vec![2, 3]);
        let mut w = BufferWriter::new();
        a.write(&mut w);
        b.write(&mut w);
        let bytes = w.into_vec();
        let mut r = BufferReader::new(&bytes);
        assert_eq!(MessageRecord::read(&mut r).unwrap(), a);
        assert_eq!(MessageRecord::read(&mut r).unwrap(), b);
        assert_eq!(r.remaining(), 0);
    }
}
