//! Codec round trips over randomized fields and generated IDs

#[cfg(test)]
mod tests {
    use crate::tests::test_utils::ManualClock;
    use crate::*;
    use rand::Rng;

    fn layouts() -> Vec<Layout> {
        vec![
            Layout::standard(),
            Layout::host_octet(),
            Layout::builder().node_bits(5).sequence_bits(3).build().unwrap(),
            Layout::builder().node_bits(12).sequence_bits(8).epoch(0).build().unwrap(),
        ]
    }

    #[test]
    fn test_random_round_trip() {
        let mut rng = rand::rng();

        for layout in layouts() {
            let codec = layout.codec();
            for _ in 0..1_000 {
                let t = rng.random_range(0..=layout.max_timestamp());
                let n = rng.random_range(0..=layout.max_node_id());
                let s = rng.random_range(0..=layout.max_sequence());

                let id = codec.encode(t, n, s);
                assert!(id.as_i64() >= 0, "sign bit set for {layout:?}");
                assert_eq!(codec.decompose(id), (t, n, s));
                assert_eq!(codec.time_of(id), t + layout.epoch());
            }
        }
    }

    #[test]
    fn test_encoding_preserves_time_order() {
        let codec = Layout::standard().codec();
        // Later millisecond wins regardless of node and sequence
        assert!(codec.encode(11, 0, 0) > codec.encode(10, 1023, 4095));
        assert!(codec.encode(10, 1, 0) > codec.encode(10, 0, 4095));
    }

    #[test]
    fn test_generated_node_id_matches_configuration() {
        for layout in layouts() {
            let node_id = layout.max_node_id() / 2;
            let generator = Generator::with_layout(node_id, layout).unwrap();
            for _ in 0..100 {
                assert_eq!(generator.node_id_of(generator.generate()), node_id);
            }
        }
    }

    #[test]
    fn test_generated_fields_decode_exactly() {
        let clock = ManualClock::new(TWITTER_EPOCH + 123_456);
        let generator = Generator::with_clock(77, Layout::standard(), clock).unwrap();

        let id = generator.generate();
        assert_eq!(generator.time_of(id), TWITTER_EPOCH + 123_456);
        assert_eq!(generator.node_id_of(id), 77);
        assert_eq!(generator.step_of(id), 0);
        assert_eq!(
            generator.codec().encode(123_456, 77, 0),
            id
        );
    }
}
