use temporal_bus::prelude::*;

#[test]
fn envelope_round_trips_through_the_buffer_codec() {
    use tb_buffer::{BufferReader, BufferWriter};

    let envelope = Envelope::new(7, 42, DateTime::from_ticks(1_000), DateTime::from_ticks(1_500));
    let mut w = BufferWriter::new();
    w.write_envelope(&envelope);
    let bytes = w.into_vec();

    let mut r = BufferReader::new(&bytes);
    let read_back = r.read_envelope().unwrap();
    assert_eq!(read_back, envelope);
    assert_eq!(read_back.latency(), envelope.latency());
}

#[test]
fn message_map_preserves_envelope() {
    let envelope = Envelope::new(1, 0, DateTime::from_ticks(10), DateTime::from_ticks(10));
    let message = Message::new(5_i32, envelope);
    let mapped = message.map(|v| v.to_string());
    assert_eq!(mapped.payload, "5");
    assert_eq!(mapped.envelope, envelope);
}
