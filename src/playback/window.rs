use crate::foundation::core::Seconds;

/// Action the media element must take to keep playback inside the trim range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RangeAction {
    /// Cursor fell before the range start: jump to `start`.
    Seek(Seconds),
    /// Cursor ran past the range end: pause, then jump to `end`.
    PauseAndSeek(Seconds),
}

impl RangeAction {
    /// Position the cursor ends up at.
    pub fn position(self) -> Seconds {
        match self {
            Self::Seek(t) | Self::PauseAndSeek(t) => t,
        }
    }
}

/// Transcript keys visible for the playback window `[current_time, range_end]`.
///
/// Entry `t_i` is kept when its successor starts strictly after both the cursor and the range
/// start, and `t_i <= range_end`. The last entry has no successor and is filtered only by the
/// range end. `timestamps` must be ascending; the result keeps that order.
pub fn visible_window(
    timestamps: &[u64],
    current_time: Seconds,
    range_start: Seconds,
    range_end: Seconds,
) -> Vec<u64> {
    timestamps
        .iter()
        .enumerate()
        .filter(|&(i, &ts)| {
            let starts_in_range = ts as f64 <= range_end;
            match timestamps.get(i + 1) {
                Some(&next) => {
                    let next = next as f64;
                    next > current_time && next > range_start && starts_in_range
                }
                None => starts_in_range,
            }
        })
        .map(|(_, &ts)| ts)
        .collect()
}

/// Clamp decision for the cursor against `[start, end]`.
///
/// NaN positions compare false on both sides and yield no action.
pub fn enforce_range(current_time: Seconds, start: Seconds, end: Seconds) -> Option<RangeAction> {
    if current_time < start {
        Some(RangeAction::Seek(start))
    } else if current_time > end {
        Some(RangeAction::PauseAndSeek(end))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: [u64; 3] = [0, 5, 10];

    #[test]
    fn reference_scenario() {
        assert_eq!(visible_window(&TS, 4.0, 3.0, 8.0), vec![0, 5]);
    }

    #[test]
    fn next_timestamp_comparison_is_strict() {
        // At exactly t=5 the first entry's window [0,5) is over.
        assert_eq!(visible_window(&TS, 5.0, 0.0, 12.0), vec![5, 10]);
        // Range starting exactly at 5 excludes the first entry too.
        assert_eq!(visible_window(&TS, 0.0, 5.0, 12.0), vec![5, 10]);
    }

    #[test]
    fn range_end_comparison_is_inclusive() {
        assert_eq!(visible_window(&TS, 0.0, 0.0, 10.0), vec![0, 5, 10]);
        assert_eq!(visible_window(&TS, 0.0, 0.0, 9.999), vec![0, 5]);
    }

    #[test]
    fn last_entry_ignores_cursor_and_start() {
        assert_eq!(visible_window(&TS, 100.0, 50.0, 200.0), vec![10]);
    }

    #[test]
    fn nan_cursor_leaves_only_the_last_entry_candidate() {
        assert_eq!(visible_window(&TS, f64::NAN, 0.0, 12.0), vec![10]);
    }

    #[test]
    fn empty_transcript_has_empty_window() {
        assert!(visible_window(&[], 1.0, 0.0, 5.0).is_empty());
    }

    #[test]
    fn enforcement_clamps_both_sides() {
        assert_eq!(enforce_range(1.0, 3.0, 8.0), Some(RangeAction::Seek(3.0)));
        assert_eq!(
            enforce_range(9.0, 3.0, 8.0),
            Some(RangeAction::PauseAndSeek(8.0))
        );
        assert_eq!(enforce_range(3.0, 3.0, 8.0), None);
        assert_eq!(enforce_range(8.0, 3.0, 8.0), None);
        assert_eq!(enforce_range(f64::NAN, 3.0, 8.0), None);
    }
}
