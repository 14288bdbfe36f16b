use temporal_bus::prelude::*;

fn msg_ms(t_ms: i64, payload: i32) -> Message<i32> {
    let t = DateTime::from_ticks(t_ms * 10_000);
    Message::new(payload, Envelope::new(1, t_ms as i32, t, t))
}

#[test]
fn s5_relative_time_window_sums_trailing_hundred_millis() {
    // [1@100, 2@150, 3@200, 4@250, 5@300] (ms), window [-100ms, 0] -> 1, 3, 5, 7, 9
    let interval = RelativeTimeInterval::new(
        RelativeBound::exclusive(TimeSpan::from_millis(-100)),
        RelativeBound::inclusive(TimeSpan::ZERO),
    );
    let mut window = RelativeTimeWindow::new(interval, |members: &[Message<i32>]| {
        members.iter().map(|m| m.payload).sum::<i32>()
    });
    let mut sums = Vec::new();
    for (t, v) in [(100, 1), (150, 2), (200, 3), (250, 4), (300, 5)] {
        sums.extend(window.push(msg_ms(t, v)).into_iter().map(|m| m.payload));
    }
    assert_eq!(sums, vec![1, 3, 5, 7, 9]);
}

#[test]
fn relative_index_window_emits_a_trimmed_sliding_sum() {
    let mut window = RelativeIndexWindow::new(3, 0, 0, |members: &[Message<i32>]| {
        members.iter().map(|m| m.payload).sum::<i32>()
    });
    let mut sums = Vec::new();
    for (i, v) in [(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)] {
        sums.extend(window.push(msg_ms(i * 10, v)));
    }
    assert_eq!(sums.iter().map(|m| m.payload).collect::<Vec<_>>(), vec![6, 9, 12]);
}
