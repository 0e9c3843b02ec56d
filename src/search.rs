//! Discrete event search over time.

use crate::error::{AstroError, Result};
use crate::time::{JulianDate, SECONDS_PER_DAY};

/// Bisection stops once the bracket is narrower than this.
const PRECISION_DAYS: f64 = 1.0 / SECONDS_PER_DAY;

/// Smallest accepted sampling step: one second.
pub const MIN_STEP_DAYS: f64 = PRECISION_DAYS;

/// Finds every instant in `[start, end]` where `f` changes value.
///
/// `f` is sampled every `step_days`; each change between two samples is
/// narrowed by bisection to one second. Returns the time just after the
/// change together with the new value, in chronological order. Changes that
/// flip and flip back within one step are not seen, so the step must be
/// shorter than the shortest state `f` can hold.
pub fn find_discrete<T, F>(
    start: JulianDate,
    end: JulianDate,
    step_days: f64,
    f: F,
) -> Result<Vec<(JulianDate, T)>>
where
    T: PartialEq + Copy,
    F: Fn(JulianDate) -> T,
{
    if !(step_days.is_finite() && step_days >= MIN_STEP_DAYS) {
        return Err(AstroError::Search(format!(
            "step must be at least one second, got {} days",
            step_days
        )));
    }
    if end.value() < start.value() {
        return Err(AstroError::Search("end precedes start".into()));
    }

    let mut events = Vec::new();
    let mut t0 = start.value();
    let mut v0 = f(start);

    while t0 < end.value() {
        let t1 = (t0 + step_days).min(end.value());
        if t1 <= t0 {
            return Err(AstroError::Search(format!("step of {} days does not advance past {}", step_days, t0)));
        }
        let v1 = f(JulianDate::new(t1));
        if v1 != v0 {
            let (mut lo, mut hi) = (t0, t1);
            while hi - lo > PRECISION_DAYS {
                let mid = 0.5 * (lo + hi);
                if f(JulianDate::new(mid)) == v0 {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            events.push((JulianDate::new(hi), v1));
        }
        t0 = t1;
        v0 = v1;
    }

    Ok(events)
}
