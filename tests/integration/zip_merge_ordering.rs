use temporal_bus::prelude::*;

fn msg(source: i32, t: i64, payload: i32) -> Message<i32> {
    Message::new(payload, Envelope::new(source, 0, DateTime::from_ticks(t), DateTime::from_ticks(t)))
}

#[test]
fn s3_zip_reorders_reverse_wall_clock_arrivals_into_time_groups() {
    // input0 @ [10, 30], input1 @ [20, 30], delivered out of wall-clock order.
    // expected: {[in0@10]@10, [in1@20]@20, [in0@30, in1@30]@30}.
    let mut zip: Zip<i32> = Zip::new(2);
    let mut groups = Vec::new();
    groups.extend(zip.push(1, msg(1, 20, 20)));
    groups.extend(zip.push(1, msg(1, 30, 21)));
    groups.extend(zip.push(0, msg(0, 10, 10)));
    groups.extend(zip.push(0, msg(0, 30, 11)));

    assert_eq!(groups.len(), 3);

    assert_eq!(groups[0].len(), 1);
    assert_eq!(groups[0][0].envelope.source_id, 0);
    assert_eq!(groups[0][0].originating_time(), DateTime::from_ticks(10));

    assert_eq!(groups[1].len(), 1);
    assert_eq!(groups[1][0].envelope.source_id, 1);
    assert_eq!(groups[1][0].originating_time(), DateTime::from_ticks(20));

    assert_eq!(groups[2].len(), 2);
    assert_eq!(groups[2][0].envelope.source_id, 0);
    assert_eq!(groups[2][1].envelope.source_id, 1);
    assert_eq!(groups[2][0].originating_time(), DateTime::from_ticks(30));
    assert_eq!(groups[2][1].originating_time(), DateTime::from_ticks(30));
}

#[test]
fn merge_passes_each_message_through_unreordered() {
    let a = msg(0, 10, 1);
    let b = msg(1, 5, 2);
    assert_eq!(Merge::push(a.clone()).payload, 1);
    assert_eq!(Merge::push(b.clone()).payload, 2);
}
