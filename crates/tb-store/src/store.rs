use crate::catalog::CatalogEntry;
use crate::error::StoreResult;
use crate::record::MessageRecord;
use std::io::{Read, Write};
use tb_buffer::{BufferReader, BufferWriter};

/// Appends message records to an in-memory or file-backed sink in the
/// persisted-store wire format. The importer side of the remoting bridge
/// writes received envelopes+bytes through exactly this type, so a
/// replayed remote stream is byte-identical to a locally recorded one.
pub struct StoreWriter<W> {
    sink: W,
}

impl<W: Write> StoreWriter<W> {
    #[must_use]
    pub fn new(sink: W) -> Self {
        StoreWriter { sink }
    }

    pub fn write_message(&mut self, record: &MessageRecord) -> StoreResult<()> {
        let mut w = BufferWriter::new();
        record.write(&mut w);
        self.sink.write_all(&w.into_vec())?;
        Ok(())
    }

    pub fn write_catalog_entry(&mut self, entry: &CatalogEntry) -> StoreResult<()> {
        let mut w = BufferWriter::new();
        entry.write(&mut w);
        self.sink.write_all(&w.into_vec())?;
        Ok(())
    }

    /// Writes the zero-length record that terminates a catalog batch.
    pub fn write_intermission(&mut self) -> StoreResult<()> {
        let mut w = BufferWriter::new();
        w.write_i32(0);
        self.sink.write_all(&w.into_vec())?;
        Ok(())
    }

    pub fn flush(&mut self) -> StoreResult<()> {
        self.sink.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Reads a sequence of persisted message records from a byte buffer
/// already loaded into memory. The pipeline reads directly from this
/// buffer shape, whether it was populated from a local file or from the
/// remoting importer.
pub struct StoreReader {
    buf: Vec<u8>,
}

impl StoreReader {
    #[must_use]
    pub fn new(buf: Vec<u8>) -> Self {
        StoreReader { buf }
    }

    pub fn from_read(mut source: impl Read) -> StoreResult<Self> {
        let mut buf = Vec::new();
        source.read_to_end(&mut buf)?;
        Ok(StoreReader { buf })
    }

    /// Reads every message record in the buffer. Stops (without error) at
    /// the first malformed record's byte offset, matching the spec's
    /// "stream marked unreadable, other streams continue" recovery rule —
    /// callers inspect `unread_tail` to see what was left.
    #[must_use]
    pub fn read_all_messages(&self) -> (Vec<MessageRecord>, Option<&[u8]>) {
        let mut reader = BufferReader::new(&self.buf);
        let mut records = Vec::new();
        loop {
            if reader.remaining() == 0 {
                return (records, None);
            }
            let checkpoint = reader.position();
            match MessageRecord::read(&mut reader) {
                Ok(record) => records.push(record),
                Err(_) => return (records, Some(&self.buf[checkpoint..])),
            }
        }
    }

    /// Reads a catalog batch: zero or more entries, terminated by the
    /// zero-length intermission marker.
    pub fn read_catalog_batch(r: &mut BufferReader<'_>) -> StoreResult<Vec<CatalogEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = CatalogEntry::read(r)? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogHeader, RuntimeInfo, StreamFlags};
    use tb_buffer::{DateTime, Envelope};

    #[test]
    fn writer_reader_round_trip_message_sequence() {
        let mut writer = StoreWriter::new(Vec::new());
        let records: Vec<MessageRecord> = (0..5)
            .map(|i| {
                MessageRecord::new(
                    Envelope::new(1, i, DateTime::from_ticks(i64::from(i) * 10), DateTime::from_ticks(i64::from(i) * 10)),
                    vec![i as u8; 3],
                )
            })
            .collect();
        for record in &records {
            writer.write_message(record).unwrap();
        }
        let bytes = writer.into_inner();
        let reader = StoreReader::new(bytes);
        let (read_back, tail) = reader.read_all_messages();
        assert!(tail.is_none());
        assert_eq!(read_back, records);
    }

    #[test]
    fn truncated_trailing_record_is_reported_as_an_unread_tail() {
        let mut writer = StoreWriter::new(Vec::new());
        writer
            .write_message(&MessageRecord::new(
                Envelope::new(1, 0, DateTime::from_ticks(0), DateTime::from_ticks(0)),
                vec![1, 2, 3],
            ))
            .unwrap();
        let mut bytes = writer.into_inner();
        bytes.extend_from_slice(&[0u8; 10]); // a truncated second record's header
        let reader = StoreReader::new(bytes);
        let (read_back, tail) = reader.read_all_messages();
        assert_eq!(read_back.len(), 1);
        assert!(tail.is_some());
    }

    #[test]
    fn catalog_batch_stops_at_intermission_marker() {
        let mut writer = StoreWriter::new(Vec::new());
        writer
            .write_catalog_entry(&CatalogEntry::RuntimeInfo(RuntimeInfo {
                header: CatalogHeader {
                    name: "runtime".into(),
                    id: 0,
                    type_name: None,
                    version: 1,
                    serializer_name: None,
                    serialization_system_version: 1,
                    custom_flags: StreamFlags::empty(),
                },
                machine_name: "host-a".into(),
                created_at: DateTime::from_ticks(0),
            }))
            .unwrap();
        writer.write_intermission().unwrap();
        let bytes = writer.into_inner();
        let mut reader = BufferReader::new(&bytes);
        let entries = StoreReader::read_catalog_batch(&mut reader).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(reader.remaining(), 0);
    }
}
