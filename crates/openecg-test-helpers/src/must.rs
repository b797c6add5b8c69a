//! Unwrap helpers with good error messages.
//!
//! These replace `expect()` in test code. `#[track_caller]` keeps the panic
//! location at the call site.

/// Unwrap an `Option`, panicking with a custom message if `None`.
///
/// # Example
///
/// ```rust
/// use openecg_test_helpers::must_some;
///
/// let bpm = Some(60.0);
/// assert!((must_some(bpm, "expected an estimate") - 60.0).abs() < f64::EPSILON);
/// ```
///
/// # Panics
///
/// Panics if the option is `None`, with the provided message.
#[track_caller]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}
