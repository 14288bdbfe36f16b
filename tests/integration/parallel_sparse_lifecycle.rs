use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use temporal_bus::prelude::*;

#[tokio::test]
async fn s4_branches_open_and_close_as_keys_appear_and_disappear() {
    // splitter {A:1}@1, {A:2,B:10}@2, {B:11}@3
    // -> branch A: 1@1, 2@2, closes@3. branch B: starts@2, gets 10@2, 11@3.
    let pipeline = Pipeline::new("root", VirtualClock::new(DateTime::from_ticks(0)));
    let seen: Arc<Mutex<HashMap<char, Vec<i32>>>> = Arc::new(Mutex::new(HashMap::new()));

    let seen_for_transform = Arc::clone(&seen);
    let mut dispatcher = ParallelSparseDo::new(
        Arc::clone(&pipeline),
        |input: &HashMap<char, i32>| input.clone(),
        move |key: &char, emitter: &Arc<Emitter<i32>>, sub: &Arc<Pipeline>| {
            let key = *key;
            let seen = Arc::clone(&seen_for_transform);
            let context = sub.new_context();
            let receiver = sub.create_receiver(&context, DeliveryPolicy::unlimited(), move |m| {
                seen.lock().entry(key).or_default().push(m.payload);
            });
            emitter.pipe_to(Arc::clone(&receiver), true).unwrap();
        },
        WhenKeyNotPresent,
    );

    let mut tick1 = HashMap::new();
    tick1.insert('A', 1);
    dispatcher.push(&tick1, DateTime::from_ticks(1), DateTime::from_ticks(1)).await;
    assert!(dispatcher.active_keys().contains(&'A'));

    let mut tick2 = HashMap::new();
    tick2.insert('A', 2);
    tick2.insert('B', 10);
    dispatcher.push(&tick2, DateTime::from_ticks(2), DateTime::from_ticks(2)).await;
    assert!(dispatcher.active_keys().contains(&'B'));

    let mut tick3 = HashMap::new();
    tick3.insert('B', 11);
    dispatcher.push(&tick3, DateTime::from_ticks(3), DateTime::from_ticks(3)).await;

    assert!(!dispatcher.active_keys().contains(&'A'));
    assert!(dispatcher.active_keys().contains(&'B'));

    dispatcher.close_all(DateTime::from_ticks(4)).await;

    let snapshot = seen.lock();
    assert_eq!(snapshot[&'A'], vec![1, 2]);
    assert_eq!(snapshot[&'B'], vec![10, 11]);
}
