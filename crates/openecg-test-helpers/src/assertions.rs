//! Custom assertion macros for testing.

/// Assert that two floating-point values are approximately equal.
///
/// # Example
///
/// ```rust
/// use openecg_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(75.0, 74.6, 2.0);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if diff > tolerance {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`",
                left, right, diff, tolerance
            );
        }
    };
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if diff > tolerance {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`: {}",
                left, right, diff, tolerance, format_args!($($arg)+)
            );
        }
    };
}

/// Assert that a collection is strictly increasing.
///
/// # Example
///
/// ```rust
/// use openecg_test_helpers::assert_strictly_increasing;
///
/// assert_strictly_increasing!(&[0.8, 1.6, 2.4]);
/// ```
#[macro_export]
macro_rules! assert_strictly_increasing {
    ($collection:expr $(,)?) => {
        let collection = $collection;
        for (i, pair) in collection.windows(2).enumerate() {
            if !(pair[0] < pair[1]) {
                panic!(
                    "assertion failed: collection is not strictly increasing\n  at index {}: {:?} >= {:?}",
                    i, pair[0], pair[1]
                );
            }
        }
    };
}

/// Assert that a value lies within an inclusive range.
///
/// # Example
///
/// ```rust
/// use openecg_test_helpers::assert_in_range;
///
/// assert_in_range!(72.0, 40.0, 180.0);
/// ```
#[macro_export]
macro_rules! assert_in_range {
    ($value:expr, $min:expr, $max:expr $(,)?) => {
        let value = $value;
        let min = $min;
        let max = $max;
        if !(value >= min && value <= max) {
            panic!(
                "assertion failed: `{:?}` is not in range [{:?}, {:?}]",
                value, min, max
            );
        }
    };
}
