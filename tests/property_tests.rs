use std::collections::HashMap;
use std::num::ParseIntError;

use fukuro::{Queue, RecordFormat, Weight, WeightedBag};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::io::BufReader;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

fn parse_u16(key: &str) -> Result<u16, ParseIntError> {
    key.parse()
}

fn format_strategy() -> impl Strategy<Value = RecordFormat> {
    prop_oneof![
        Just(RecordFormat::Lines),
        Just(RecordFormat::Delimited('=')),
        Just(RecordFormat::Delimited('\t')),
    ]
}

proptest! {
    #[test]
    fn prop_count_tracks_adds_and_removes(
        ops in prop::collection::vec((any::<bool>(), 0u8..8), 0..200)
    ) {
        let mut bag = WeightedBag::new();
        let mut expected: Weight = 0;
        for (is_add, item) in ops {
            if is_add {
                bag.add(item);
                expected += 1;
            } else if bag.remove(&item) {
                expected -= 1;
            }
        }

        prop_assert_eq!(bag.count_contents(), expected);
        let sum: Weight = bag.entries().map(|(_, w)| w).sum();
        prop_assert_eq!(sum, bag.count_contents());
    }

    #[test]
    fn prop_seeded_total_is_entry_sum(
        weights in prop::collection::hash_map(any::<u16>(), 0u64..1_000, 0..50)
    ) {
        let bag = WeightedBag::from(weights.clone());
        let sum: Weight = weights.values().sum();
        prop_assert_eq!(bag.count_contents(), sum);
        prop_assert_eq!(bag.len(), weights.len());
    }

    #[test]
    fn prop_pull_returns_drawable_item(
        weights in prop::collection::hash_map(0u16..100, 0u64..10, 0..20),
        seed in any::<u64>(),
    ) {
        let bag = WeightedBag::from(weights);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        match bag.pull_with_rng(&mut rng) {
            None => prop_assert_eq!(bag.count_contents(), 0),
            Some(item) => prop_assert!(bag.weight(item) > 0),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_write_read_round_trip(
        weights in prop::collection::hash_map(any::<u16>(), any::<u64>().prop_map(|w| w >> 8), 0..300),
        format in format_strategy(),
    ) {
        let bag = WeightedBag::from(weights);
        let back = runtime().block_on(async {
            let mut data = Vec::new();
            bag.write(&mut data, format).await?;
            let mut reader = &data[..];
            let back = WeightedBag::read_from(&mut reader, format, parse_u16).await?;
            Ok::<_, fukuro::BagError>(back)
        });

        let back = back.map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(back, bag);
    }

    #[test]
    fn prop_concatenated_round_trip(
        weights in prop::collection::hash_map(any::<u16>(), 0u64..1_000, 0..100),
    ) {
        let bag = WeightedBag::from(weights);
        let (first, second) = runtime().block_on(async {
            let mut data = Vec::new();
            bag.write(&mut data, RecordFormat::Lines).await?;
            bag.write(&mut data, RecordFormat::Lines).await?;

            let mut reader = BufReader::new(&data[..]);
            let first = WeightedBag::read_from(&mut reader, RecordFormat::Lines, parse_u16).await?;
            let second = WeightedBag::read_from(&mut reader, RecordFormat::Lines, parse_u16).await?;
            Ok::<_, fukuro::BagError>((first, second))
        }).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(&first, &bag);
        prop_assert_eq!(&second, &bag);
    }
}

proptest! {
    #[test]
    fn prop_queue_is_fifo(
        ops in prop::collection::vec(prop::option::of(any::<u32>()), 0..300)
    ) {
        let mut q = Queue::new();
        let mut model = std::collections::VecDeque::new();
        for op in ops {
            match op {
                Some(x) => {
                    q.add(x);
                    model.push_back(x);
                }
                None => {
                    prop_assert_eq!(q.remove().ok(), model.pop_front());
                }
            }
            prop_assert_eq!(q.peek(), model.front());
            prop_assert_eq!(q.len(), model.len());
        }
    }
}

#[test]
fn example_scenario_counts() {
    let mut bag = WeightedBag::new();
    for _ in 0..50 {
        bag.add(1);
    }
    for _ in 0..25 {
        bag.add(2);
    }
    for _ in 0..10 {
        bag.add(3);
    }

    assert_eq!(bag.count_contents(), 85);
    let entries: HashMap<i32, Weight> = bag.entries().map(|(&k, w)| (k, w)).collect();
    assert_eq!(entries, HashMap::from([(1, 50), (2, 25), (3, 10)]));
}

#[test]
fn draw_frequencies_converge() {
    // 10/18, 3/18, 5/18 within one percentage point.
    let bag = WeightedBag::from_entries([("A", 10), ("B", 3), ("C", 5)]);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let n = 100_000;

    let mut counts = [0usize; 3];
    for _ in 0..n {
        match bag.pull_with_rng(&mut rng) {
            Some(&"A") => counts[0] += 1,
            Some(&"B") => counts[1] += 1,
            Some(&"C") => counts[2] += 1,
            other => panic!("unexpected draw {other:?}"),
        }
    }

    for (count, weight) in counts.iter().zip([10.0, 3.0, 5.0]) {
        let freq = *count as f64 / n as f64;
        assert!((freq - weight / 18.0).abs() < 0.01, "counts={counts:?}");
    }
}
