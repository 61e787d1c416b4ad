/// Formats a duration given in nanoseconds into a human-readable string.
///
/// - If the duration is less than 10,000 nanoseconds, it will be represented as nanoseconds.
/// - If the duration is between 10,000 nanoseconds and 1 second, it will be represented as milliseconds.
/// - If the duration is greater than 1 second, it will be represented as seconds.
pub fn format_duration(duration: u64) -> String {
    const NANOS_PER_SEC: u64 = 1_000_000_000;
    const NANOS_PER_MILLI: u64 = 1_000_000;

    if duration < 10_000 {
        format!("{}ns", duration)
    } else if duration <= NANOS_PER_SEC {
        let millis = duration as f64 / NANOS_PER_MILLI as f64;
        format!("{:.4}ms", millis)
    } else {
        let seconds = duration as f64 / NANOS_PER_SEC as f64;
        format!("{}s", seconds)
    }
}

/// Formats a number by adding underscores to separate thousands for better readability.
///
/// For example, `1000000` becomes `1_000_000`.
pub fn format_with_underscores(number: u64) -> String {
    let num_str = number.to_string();
    let mut result = String::new();
    let chars: Vec<_> = num_str.chars().rev().collect();
    for (i, char) in chars.iter().enumerate() {
        if i % 3 == 0 && i != 0 {
            result.push('_');
        }
        result.push(*char);
    }
    result.chars().rev().collect()
}

/// bytes size for 1 kibibyte
pub const KIB: u64 = 1_024;

static UNITS: &str = "KMGTPE";

/// Converts a byte size to a human-readable string representation with binary units.
///
/// For example, `1024` bytes becomes `1.0 KiB`, and `1_048_576` bytes becomes `1.0 MiB`.
pub fn bytes_to_string(bytes: u64) -> String {
    if bytes < KIB {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64;
    let mut exp = 0;
    while size >= KIB as f64 && exp < UNITS.len() {
        size /= KIB as f64;
        exp += 1;
    }
    format!("{:.1} {}iB", size, UNITS.as_bytes()[exp - 1] as char)
}

/// Formats a floating-point number (`f64`) into a shorter, human-readable string
/// with varying precision depending on the value of the number.
///
/// # Examples
/// ```
/// use aggressor::report::format::format_float;
/// assert_eq!(format_float(9.876543), "9.8765");
/// assert_eq!(format_float(987.6543), "987.65");
/// assert_eq!(format_float(12345.67), "12346");
/// ```
pub fn format_float(n: f64) -> String {
    if n < 10.0 {
        format!("{:.4}", n)
    } else if n < 100.0 {
        format!("{:.3}", n)
    } else if n < 1000.0 {
        format!("{:.2}", n)
    } else if n < 10000.0 {
        format!("{:.1}", n)
    } else {
        format!("{:.0}", n)
    }
}

/// Formats a rate in bytes per second with a decimal unit.
pub fn format_throughput(bytes_per_second: f64) -> String {
    let (denominator, unit) = if bytes_per_second < 1000.0 {
        (1.0, "B/s")
    } else if bytes_per_second < 1000.0 * 1000.0 {
        (1000.0, "KB/s")
    } else if bytes_per_second < 1000.0 * 1000.0 * 1000.0 {
        (1000.0 * 1000.0, "MB/s")
    } else {
        (1000.0 * 1000.0 * 1000.0, "GB/s")
    };
    format!("{} {}", format_float(bytes_per_second / denominator), unit)
}
