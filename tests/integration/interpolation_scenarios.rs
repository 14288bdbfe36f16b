use temporal_bus::prelude::*;

fn secondary(t: i64, payload: f64) -> Message<f64> {
    Message::new(payload, Envelope::new(2, 0, DateTime::from_ticks(t), DateTime::from_ticks(t)))
}

#[test]
fn s1_adjacent_values_linear_interpolation() {
    // secondary at t=100(10.0)/t=200(20.0), primary at t=150 -> 15.0, obsolete=100.
    let interp = AdjacentValues::new(TimeSpan::from_ticks(1_000), |a: &f64, b: &f64, r| a + (b - a) * r);
    let secondaries = vec![secondary(100, 10.0), secondary(200, 20.0)];
    match interp.interpolate(DateTime::from_ticks(150), &secondaries, false) {
        InterpolationResult::Created(value, obsolete) => {
            assert_eq!(value, 15.0);
            assert_eq!(obsolete, DateTime::from_ticks(100));
        }
        other => panic!("expected Created, got {other:?}"),
    }
}

#[test]
fn s2_exact_or_default_substitution() {
    // secondary at 100(A)/300(B), primary at t=200 with or_default="Z" -> "Z".
    let interp = Exact::or_default("Z".to_string());
    let secondaries = vec![
        Message::new("A".to_string(), Envelope::new(2, 0, DateTime::from_ticks(100), DateTime::from_ticks(100))),
        Message::new("B".to_string(), Envelope::new(2, 1, DateTime::from_ticks(300), DateTime::from_ticks(300))),
    ];
    match interp.interpolate(DateTime::from_ticks(200), &secondaries, false) {
        InterpolationResult::Created(value, _) => assert_eq!(value, "Z"),
        other => panic!("expected Created, got {other:?}"),
    }
}

#[test]
fn fuse_combines_primary_with_interpolated_secondary_end_to_end() {
    let mut fuse: Fuse<i32, f64, f64, f64, _, _> = Fuse::new(|p: &i32, secondaries: &[f64]| *p as f64 + secondaries[0]);
    fuse.add_input(AdjacentValues::new(TimeSpan::from_ticks(1_000), |a: &f64, b: &f64, r| a + (b - a) * r));
    fuse.push_secondary(0, secondary(100, 10.0));
    fuse.push_secondary(0, secondary(200, 20.0));
    let out = fuse.push_primary(Message::new(5, Envelope::new(1, 0, DateTime::from_ticks(150), DateTime::from_ticks(150))));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].payload, 20.0);
}
