use temporal_bus::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scratch(Vec<u8>);

impl Clearable for Scratch {
    fn clear(&mut self) {
        self.0.clear();
    }
}

#[test]
fn s6_twenty_cycles_converge_on_capacity_ten() {
    let pool = SharedPool::new(|| Scratch(vec![0u8; 8]));
    let mut held = Vec::new();
    for i in 0..20 {
        let s = pool.get_or_create();
        held.push(s);
        if held.len() > 10 || i % 2 == 1 {
            held.remove(0).dispose().unwrap();
        }
    }
    for s in held {
        s.dispose().unwrap();
    }
    assert!(pool.total_count() <= 10);
    assert_eq!(pool.available_count(), pool.total_count());
}
