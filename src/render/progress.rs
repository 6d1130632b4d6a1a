/// Observable state of the render trigger and its progress overlay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStatus {
    /// A render is running; the trigger is disabled and the overlay shown.
    pub is_rendering: bool,
    /// Text shown in the overlay.
    pub progress_message: String,
}

/// `"<pct> % (rendered time: <secs> s)"` with both numbers floored and shown as reported.
pub fn format_progress(progress: f64, time_us: i64) -> String {
    // `+ 0.0` turns a floored negative zero into zero.
    let pct = (progress * 100.0).floor() + 0.0;
    let secs = (time_us as f64 / 1_000_000.0).floor() + 0.0;
    format!("{pct} % (rendered time: {secs} s)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_way_message() {
        assert_eq!(format_progress(0.5, 2_500_000), "50 % (rendered time: 2 s)");
    }

    #[test]
    fn values_are_floored_not_rounded() {
        assert_eq!(format_progress(0.999, 999_999), "99 % (rendered time: 0 s)");
        assert_eq!(format_progress(0.0, 0), "0 % (rendered time: 0 s)");
    }

    #[test]
    fn out_of_range_values_pass_through() {
        assert_eq!(
            format_progress(1.25, 61_000_000),
            "125 % (rendered time: 61 s)"
        );
        assert_eq!(
            format_progress(-0.001, -1),
            "-1 % (rendered time: -1 s)"
        );
        assert_eq!(format_progress(-0.0, 0), "0 % (rendered time: 0 s)");
    }
}
