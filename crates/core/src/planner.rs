use crate::types::TimeWindow;

/// Window size used when none is configured: 20 minutes.
pub const DEFAULT_WINDOW_SECONDS: u64 = 1200;

/// Split `[0, duration)` into contiguous windows of `window_seconds`.
///
/// An unknown duration (`0`) yields one open-ended window. A zero window
/// size is treated the same as a window larger than the media.
pub fn plan_segments(duration: u64, window_seconds: u64) -> Vec<TimeWindow> {
    if duration == 0 {
        return vec![TimeWindow {
            index: 0,
            start: 0,
            end: None,
        }];
    }

    let window_seconds = if window_seconds == 0 {
        duration
    } else {
        window_seconds
    };

    (0..duration.div_ceil(window_seconds))
        .map(|i| {
            let start = i * window_seconds;
            TimeWindow {
                index: i as usize,
                start,
                end: Some((start + window_seconds).min(duration)),
            }
        })
        .collect()
}
