use crate::delivery::{DeliveryPolicy, QueueDiscipline};
use crate::error::{PipelineError, PipelineResult};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use tb_buffer::Message;

struct State<T> {
    items: VecDeque<Message<T>>,
    closed: bool,
}

/// The bounded/unbounded/latest-only queue backing one receiver, plus the
/// condvar that implements `Throttle`'s "block post until there is room".
pub(crate) struct ReceiverQueue<T> {
    receiver_id: i32,
    policy: DeliveryPolicy<T>,
    state: Mutex<State<T>>,
    has_room: Condvar,
}

pub(crate) enum PushOutcome {
    Delivered,
    DroppedLatency,
    DroppedOverflow,
}

impl<T> ReceiverQueue<T> {
    pub(crate) fn new(receiver_id: i32, policy: DeliveryPolicy<T>) -> Self {
        ReceiverQueue {
            receiver_id,
            policy,
            state: Mutex::new(State {
                items: VecDeque::new(),
                closed: false,
            }),
            has_room: Condvar::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub(crate) fn attempt_synchronous(&self) -> bool {
        self.policy.attempt_synchronous
    }

    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.has_room.notify_all();
    }

    /// Applies the receiver's delivery policy and enqueues `message` unless
    /// dropped. `Throttle`/`SynchronousOrThrottle` block the caller on the
    /// condvar until room is available, a guaranteed-delivery message
    /// bypasses that wait.
    pub(crate) fn push(&self, message: Message<T>) -> PipelineResult<PushOutcome> {
        if let Some(max_latency) = &self.policy.maximum_latency {
            if message.envelope.latency() > *max_latency {
                return Ok(PushOutcome::DroppedLatency);
            }
        }
        let guaranteed = self
            .policy
            .guarantee_delivery
            .as_ref()
            .is_some_and(|f| f(&message.payload));

        let mut state = self.state.lock();
        match &self.policy.discipline {
            QueueDiscipline::Unlimited => {
                state.items.push_back(message);
                Ok(PushOutcome::Delivered)
            }
            QueueDiscipline::LatestMessage => {
                if !guaranteed {
                    state.items.clear();
                }
                state.items.push_back(message);
                Ok(PushOutcome::Delivered)
            }
            QueueDiscipline::Throttle { capacity }
            | QueueDiscipline::SynchronousOrThrottle { capacity } => {
                let capacity = *capacity;
                if guaranteed {
                    state.items.push_back(message);
                    return Ok(PushOutcome::Delivered);
                }
                while state.items.len() >= capacity && !state.closed {
                    self.has_room.wait(&mut state);
                }
                if state.closed {
                    return Err(PipelineError::ThrottleClosed {
                        receiver_id: self.receiver_id,
                    });
                }
                state.items.push_back(message);
                Ok(PushOutcome::Delivered)
            }
        }
    }

    pub(crate) fn pop(&self) -> Option<Message<T>> {
        let mut state = self.state.lock();
        let item = state.items.pop_front();
        drop(state);
        self.has_room.notify_one();
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_buffer::{DateTime, Envelope, TimeSpan};

    fn msg(n: i64) -> Message<i32> {
        Message::new(n as i32, Envelope::new(1, n as i32, DateTime::from_ticks(n), DateTime::from_ticks(n)))
    }

    #[test]
    fn latest_message_keeps_only_the_newest() {
        let queue = ReceiverQueue::new(1, DeliveryPolicy::latest_message());
        queue.push(msg(1)).unwrap();
        queue.push(msg(2)).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().unwrap().payload, 2);
    }

    #[test]
    fn unlimited_keeps_everything_in_order() {
        let queue = ReceiverQueue::new(1, DeliveryPolicy::unlimited());
        for i in 1..=5 {
            queue.push(msg(i)).unwrap();
        }
        for i in 1..=5 {
            assert_eq!(queue.pop().unwrap().payload, i as i32);
        }
        assert!(queue.pop().is_none());
    }

    #[test]
    fn guaranteed_delivery_bypasses_latest_message_eviction() {
        let mut policy = DeliveryPolicy::latest_message();
        policy.guarantee_delivery = Some(std::sync::Arc::new(|v: &i32| *v == 1));
        let queue = ReceiverQueue::new(1, policy);
        queue.push(msg(1)).unwrap();
        queue.push(msg(2)).unwrap();
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn maximum_latency_drops_before_enqueue() {
        let policy = DeliveryPolicy::<i32>::unlimited().with_maximum_latency(TimeSpan::from_ticks(5));
        let queue = ReceiverQueue::new(1, policy);
        let late = Message::new(1, Envelope::new(1, 1, DateTime::from_ticks(0), DateTime::from_ticks(100)));
        assert!(matches!(queue.push(late).unwrap(), PushOutcome::DroppedLatency));
        assert_eq!(queue.len(), 0);
    }
}
