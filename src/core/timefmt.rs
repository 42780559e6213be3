// Human-readable rendering of simulation timestamps.
//
// Timestamps are in billions of years (Gyr), the unit the timeline
// generator emits. Negative values and NaN are "does not occur" sentinels;
// anything beyond 1e100 Gyr is treated as never-ending.

/// Seconds in a Julian year. Shared with the milestone physics.
pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0;

/// Years per Gyr.
pub const BILLION: f64 = 1e9;

/// Format a Gyr timestamp for display.
///
/// Total over every input: absent and NaN values render as "Does not occur",
/// so callers never need a fallible path. Pure, no locale dependence.
pub fn format_timestamp(timestamp: Option<f64>) -> String {
    let t = match timestamp {
        Some(t) if !t.is_nan() => t,
        _ => return "Does not occur".to_string(),
    };

    if t == 0.0 {
        return "t = 0".to_string();
    }
    if t == f64::INFINITY || t > 1e100 {
        return "t → ∞".to_string();
    }
    if t < 0.0 {
        return "Does not occur".to_string();
    }

    let years = t * BILLION;

    if years < 1.0 {
        // Sub-year times are easier to read in seconds-derived units.
        let seconds = years * SECONDS_PER_YEAR;
        return if seconds < 1e-6 {
            format!("t = {:.2} nanoseconds", seconds * 1e9)
        } else if seconds < 1e-3 {
            format!("t = {:.2} microseconds", seconds * 1e6)
        } else if seconds < 1.0 {
            format!("t = {:.2} milliseconds", seconds * 1e3)
        } else if seconds < 60.0 {
            format!("t = {seconds:.2} seconds")
        } else if seconds < 3600.0 {
            format!("t = {:.2} minutes", seconds / 60.0)
        } else if seconds < 86400.0 {
            format!("t = {:.2} hours", seconds / 3600.0)
        } else {
            format!("t = {:.2} days", seconds / 86400.0)
        };
    }

    if years < 1e3 {
        format!("t = {years:.2} years")
    } else if years < 1e6 {
        format!("t = {:.2} thousand years", years / 1e3)
    } else if years < 1e9 {
        format!("t = {:.2} million years", years / 1e6)
    } else {
        format!("t = {:.2} billion years", years / BILLION)
    }
}
