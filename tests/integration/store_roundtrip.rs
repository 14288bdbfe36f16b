use temporal_bus::prelude::*;

#[test]
fn message_records_round_trip_through_a_file_backed_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recording.tbstore");

    let records: Vec<MessageRecord> = (0..5)
        .map(|i| {
            MessageRecord::new(
                Envelope::new(1, i, DateTime::from_ticks(i64::from(i) * 10), DateTime::from_ticks(i64::from(i) * 10)),
                vec![i as u8; 4],
            )
        })
        .collect();

    {
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = StoreWriter::new(file);
        for record in &records {
            writer.write_message(record).unwrap();
        }
        writer.flush().unwrap();
    }

    let file = std::fs::File::open(&path).unwrap();
    let reader = StoreReader::from_read(file).unwrap();
    let (read_back, tail) = reader.read_all_messages();
    assert!(tail.is_none());
    assert_eq!(read_back, records);
}

#[test]
fn clock_sync_offset_matches_the_server_minus_corrected_client_formula() {
    let offset = compute_offset_ticks(1_500, 900, 1_100);
    assert_eq!(offset, 500);
}

#[test]
fn meta_hello_negative_one_means_replay_from_now() {
    let hello = MetaHello {
        protocol_version: PROTOCOL_VERSION,
        replay_start_ticks: MetaHello::REPLAY_FROM_NOW,
        replay_end_ticks: i64::MAX,
    };
    assert_eq!(hello.replay_start_ticks, -1);
}
