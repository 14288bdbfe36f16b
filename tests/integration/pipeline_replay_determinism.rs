use parking_lot::Mutex;
use std::sync::Arc;
use temporal_bus::prelude::*;

#[tokio::test]
async fn repeated_runs_over_the_same_posts_yield_the_same_delivery_order() {
    async fn run_once() -> Vec<i32> {
        let pipeline = Pipeline::new("replay", VirtualClock::new(DateTime::from_ticks(0)));
        let emitter = pipeline.create_emitter::<i32>();
        let context = pipeline.new_context();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let receiver = pipeline.create_receiver(&context, DeliveryPolicy::unlimited(), move |m| {
            seen_clone.lock().push(m.payload);
        });
        emitter.pipe_to(Arc::clone(&receiver), false).unwrap();
        pipeline.start(ReplayDescriptor::as_fast_as_possible());
        for i in 1..=10 {
            emitter
                .post(i, DateTime::from_ticks(i as i64 * 10), DateTime::from_ticks(i as i64 * 10))
                .unwrap();
        }
        pipeline.stop(DateTime::from_ticks(1_000), true).await;
        Arc::try_unwrap(seen).unwrap().into_inner()
    }

    let first = run_once().await;
    let second = run_once().await;
    assert_eq!(first, second);
    assert_eq!(first, (1..=10).collect::<Vec<_>>());
}

#[test]
fn virtual_clock_offset_is_reproducible_from_fixed_inputs() {
    let mut clock = VirtualClock::new(DateTime::from_ticks(0));
    clock.set_offset(TimeSpan::from_ticks(500));
    let a = clock.to_virtual(DateTime::from_ticks(1_000));
    let b = clock.to_virtual(DateTime::from_ticks(1_000));
    assert_eq!(a, b);
    assert_eq!(a, DateTime::from_ticks(1_500));
}
