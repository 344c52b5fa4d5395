use jsg_config::RangeExpression;
use proptest::prelude::*;

proptest! {
    #[test]
    fn integer_ranges_are_inclusive_and_stepped(start in -50i64..50, len in 0i64..40, step in 1i64..7) {
        let stop = start + len;
        let text = format!("{start}:{stop}:{step}");
        let values = RangeExpression::new(text).resolve().unwrap().values;
        prop_assert_eq!(values.len() as i64, len / step + 1);
        let parsed: Vec<i64> = values.iter().map(|v| v.parse().unwrap()).collect();
        prop_assert_eq!(parsed[0], start);
        prop_assert!(parsed.windows(2).all(|pair| pair[1] - pair[0] == step));
        prop_assert!(*parsed.last().unwrap() <= stop);
    }

    #[test]
    fn resolution_is_deterministic(text in "[0-9a-z.:]{0,6}") {
        let first = RangeExpression::new(text.clone()).resolve();
        let second = RangeExpression::new(text).resolve();
        prop_assert_eq!(first, second);
    }
}
