//! Time label formatting for the progress bar.

use std::time::Duration;

/// Placeholder shown while the track length is unknown.
pub const UNKNOWN_TIME: &str = "--:--";

/// Format whole seconds as `MM:SS`, or `H:MM:SS` from one hour on.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}

/// Track length in whole seconds, a partial last second counting as one.
pub fn track_secs(duration: Duration) -> u64 {
    duration_ms(duration).div_ceil(1000)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Elapsed and remaining labels for a track at `progress` (clamped to `[0, 1]`).
///
/// Both are derived from [`track_secs`]: elapsed rounds down to the second
/// and remaining is the rest, so the two always add up to the track length.
pub fn progress_labels(duration: Duration, progress: f64) -> (String, String) {
    let progress = clamp_progress(progress);
    let total_ms = duration_ms(duration);
    let total_secs = track_secs(duration);
    let elapsed_ms = ((total_ms as f64) * progress).round() as u64;
    let elapsed_secs = if elapsed_ms >= total_ms {
        total_secs
    } else {
        elapsed_ms / 1000
    };

    let elapsed = format_duration(elapsed_secs);
    let remaining = format!("-{}", format_duration(total_secs - elapsed_secs));
    (elapsed, remaining)
}

/// Clamp to `[0, 1]`; NaN counts as the start of the track.
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_pads_minutes_and_seconds() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(62), "01:02");
        assert_eq!(format_duration(599), "09:59");
        assert_eq!(format_duration(3599), "59:59");
    }

    #[test]
    fn format_duration_adds_hours() {
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3723), "1:02:03");
    }

    #[test]
    fn half_way_through_splits_the_odd_second() {
        let (elapsed, remaining) = progress_labels(Duration::from_secs(125), 0.5);
        assert_eq!(elapsed, "01:02");
        assert_eq!(remaining, "-01:03");
    }

    #[test]
    fn boundaries_show_full_length() {
        let len = Duration::from_secs(125);
        assert_eq!(progress_labels(len, 0.0), ("00:00".into(), "-02:05".into()));
        assert_eq!(progress_labels(len, 1.0), ("02:05".into(), "-00:00".into()));
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let len = Duration::from_secs(125);
        assert_eq!(progress_labels(len, -0.3), progress_labels(len, 0.0));
        assert_eq!(progress_labels(len, 1.7), progress_labels(len, 1.0));
        assert_eq!(progress_labels(len, f64::NAN), progress_labels(len, 0.0));
    }

    #[test]
    fn float_noise_does_not_add_a_second() {
        // 0.8 * 125 is not exactly 100 in binary floating point.
        let (elapsed, remaining) = progress_labels(Duration::from_secs(125), 0.2);
        assert_eq!(elapsed, "00:25");
        assert_eq!(remaining, "-01:40");
    }

    fn label_secs(label: &str) -> u64 {
        label
            .trim_start_matches('-')
            .split(':')
            .fold(0, |acc, part| acc * 60 + part.parse::<u64>().unwrap())
    }

    #[test]
    fn fractional_lengths_keep_a_constant_sum() {
        let len = Duration::from_millis(125_400);
        assert_eq!(track_secs(len), 126);
        for progress in [0.0, 0.5, 1.0] {
            let (elapsed, remaining) = progress_labels(len, progress);
            assert_eq!(
                label_secs(&elapsed) + label_secs(&remaining),
                126,
                "{elapsed} / {remaining} at {progress}"
            );
        }
        assert_eq!(progress_labels(len, 0.0), ("00:00".into(), "-02:06".into()));
        assert_eq!(progress_labels(len, 0.5), ("01:02".into(), "-01:04".into()));
        assert_eq!(progress_labels(len, 1.0), ("02:06".into(), "-00:00".into()));
    }

    #[test]
    fn clamp_progress_handles_edges() {
        assert_eq!(clamp_progress(-1.0), 0.0);
        assert_eq!(clamp_progress(0.25), 0.25);
        assert_eq!(clamp_progress(2.0), 1.0);
        assert_eq!(clamp_progress(f64::NAN), 0.0);
    }
}
