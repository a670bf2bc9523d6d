//! Progress reporting for long ranking runs.
//!
//! Interactive runs get an indicatif bar; `--log-only` runs hide it and emit
//! periodic `[PHASE] n/total` lines on stderr instead, which read better when
//! the output is tailed or captured.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Candidates between two log-only progress lines.
pub const LOG_INTERVAL: u64 = 10_000;

static LOG_ONLY: AtomicBool = AtomicBool::new(false);

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// "12.3s" under a minute, "4.5m" above.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Progress bar for scoring `len` candidates; hidden in log-only mode.
pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if is_log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})")
                .unwrap()
                .progress_chars("=> "),
        );
    }
    pb.set_message(msg.to_string());
    pb
}

/// Whether a log-only progress line is due after `current` of `total` items.
fn should_log(current: u64, total: u64, interval: u64) -> bool {
    interval > 0 && (current % interval == 0 || current == total)
}

/// Advance the bar by one item, logging a progress line when in log-only mode.
pub fn tick(pb: &ProgressBar, phase: &str, total: u64) {
    pb.inc(1);
    let current = pb.position();
    if is_log_only() && should_log(current, total, LOG_INTERVAL) {
        let pct = if total == 0 { 100.0 } else { 100.0 * current as f64 / total as f64 };
        eprintln!("[{}] {}/{} ({:.1}%)", phase, current, total, pct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn test_should_log() {
        assert!(should_log(10_000, 25_000, LOG_INTERVAL));
        assert!(should_log(25_000, 25_000, LOG_INTERVAL));
        assert!(!should_log(12_345, 25_000, LOG_INTERVAL));
        assert!(!should_log(5, 10, 0));
    }

    #[test]
    fn test_tick_advances_hidden_bar() {
        let pb = ProgressBar::hidden();
        tick(&pb, "RANK", 3);
        tick(&pb, "RANK", 3);
        assert_eq!(pb.position(), 2);
    }
}
