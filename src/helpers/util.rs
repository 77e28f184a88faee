use crate::dom::DomWindow;

/// Return value clamped between min and max
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Check if number is in range. The bounds can be given in any order.
pub fn is_number_in_range(number: f64, start: f64, end: f64) -> bool {
    number >= start.min(end) && number <= start.max(end)
}

/// Maps a value from one range to another.
///
/// Mapping 10 degrees Celsius to Fahrenheit:
/// `map_range_to_range((0.0, 100.0), (32.0, 212.0), 10.0) == 50.0`
pub fn map_range_to_range(from: (f64, f64), to: (f64, f64), value: f64) -> f64 {
    to.0 + ((value - from.0) * (to.1 - to.0)) / (from.1 - from.0)
}

/// Drop the missing items
pub fn compact<T>(items: impl IntoIterator<Item = Option<T>>) -> Vec<T> {
    items.into_iter().flatten().collect()
}

/// Remove the first item the matcher accepts. Returns the removed item.
pub fn remove_from_array<T>(matcher: impl FnMut(&T) -> bool, items: &mut Vec<T>) -> Option<T> {
    let index = items.iter().position(matcher)?;
    Some(items.remove(index))
}

/// Good enough identifier made of 4 random 32 bit values joined with `-`.
///
/// Not an RFC 4122 UUID: no version or variant bits.
pub fn uuid<W: DomWindow>(win: &W) -> String {
    (0..4)
        .map(|_| win.random_u32().to_string())
        .collect::<Vec<_>>()
        .join("-")
}
