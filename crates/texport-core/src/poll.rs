//! Bounded polling for long-running server-side operations.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::time::TimeSource;

/// Repeatedly invokes `probe` until it reports completion or `timeout`
/// elapses on the monotonic clock.
///
/// The deadline is computed once, up front, and checked *before* each probe
/// invocation. An in-flight probe is never cancelled; only the time
/// accumulated across loop iterations counts against the deadline, so a
/// slow probe can overrun it by the duration of that one call.
///
/// `probe` returns `Ok(Some(value))` when done, `Ok(None)` to keep waiting,
/// or `Err` to abort the poll immediately; an error is never treated as
/// "not yet". A `timeout` of zero raises the timeout error on the first
/// check without invoking the probe or sleeping.
pub fn poll_until<T, F>(
    time: &dyn TimeSource,
    timeout: Duration,
    poll_interval: Duration,
    label: &str,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Result<Option<T>>,
{
    let deadline = time.now() + timeout;
    loop {
        if time.now() >= deadline {
            return Err(Error::Timeout {
                label: label.to_string(),
                timeout,
            });
        }
        if let Some(value) = probe()? {
            return Ok(value);
        }
        time.sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fake::FakeTime;

    #[test]
    fn zero_timeout_fails_before_the_first_probe() {
        let time = FakeTime::new();
        let mut probes = 0u32;
        let err = poll_until(
            &time,
            Duration::ZERO,
            Duration::from_secs(2),
            "export abc",
            || -> Result<Option<()>> {
                probes += 1;
                Ok(None)
            },
        )
        .unwrap_err();

        assert_eq!(probes, 0);
        assert!(time.slept().is_empty());
        assert!(err.to_string().contains("export abc"), "{err}");
    }

    #[test]
    fn returns_the_first_truthy_probe_result() {
        let time = FakeTime::new();
        let mut probes = 0u32;
        let value = poll_until(
            &time,
            Duration::from_secs(60),
            Duration::from_secs(2),
            "job",
            || {
                probes += 1;
                Ok((probes == 3).then_some("done"))
            },
        )
        .unwrap();

        assert_eq!(value, "done");
        assert_eq!(probes, 3);
        assert_eq!(
            time.slept(),
            vec![Duration::from_secs(2), Duration::from_secs(2)]
        );
    }

    #[test]
    fn probe_errors_abort_immediately() {
        let time = FakeTime::new();
        let err = poll_until(
            &time,
            Duration::from_secs(60),
            Duration::from_secs(2),
            "job",
            || -> Result<Option<()>> { Err(Error::api("export job-1 failed")) },
        )
        .unwrap_err();

        assert!(err.to_string().contains("job-1"));
        assert!(time.slept().is_empty());
    }

    #[test]
    fn expires_once_accumulated_sleeps_pass_the_deadline() {
        let time = FakeTime::new();
        let mut probes = 0u32;
        let err = poll_until(
            &time,
            Duration::from_secs(10),
            Duration::from_secs(3),
            "slow export",
            || -> Result<Option<()>> {
                probes += 1;
                Ok(None)
            },
        )
        .unwrap_err();

        // Checks at t = 0, 3, 6, 9 all pass; the check at t = 12 expires.
        assert_eq!(probes, 4);
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(err.to_string().contains("10s"), "{err}");
    }
}
