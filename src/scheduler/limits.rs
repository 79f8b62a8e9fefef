//! Open-file limit setup
//!
//! Every session holds one socket, so the soft `RLIMIT_NOFILE` must cover
//! the whole run. Raising is idempotent: the limit is only ever raised, and
//! never past the hard limit.

use crate::scheduler::error::{SchedulerError, SchedulerResult};

/// Raise the soft open-file limit to at least `wanted` if the hard limit
/// allows. Returns the soft limit in effect afterwards, which may be below
/// `wanted` when the hard limit is lower.
#[cfg(unix)]
pub fn raise_fd_limit(wanted: u64) -> SchedulerResult<u64> {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };

    // SAFETY: getrlimit writes only into the struct we own
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) } != 0 {
        return Err(last_os_error());
    }

    let wanted = wanted as libc::rlim_t;
    if limit.rlim_cur >= wanted {
        return Ok(limit.rlim_cur as u64);
    }

    let target = if limit.rlim_max == libc::RLIM_INFINITY {
        wanted
    } else {
        wanted.min(limit.rlim_max)
    };

    let raised = libc::rlimit {
        rlim_cur: target,
        rlim_max: limit.rlim_max,
    };

    // SAFETY: setrlimit reads only from the struct we pass
    if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &raised) } != 0 {
        return Err(last_os_error());
    }

    let (from, to) = (limit.rlim_cur as u64, target as u64);
    tracing::debug!(from, to, "raised open-file limit");
    Ok(to)
}

#[cfg(not(unix))]
pub fn raise_fd_limit(_wanted: u64) -> SchedulerResult<u64> {
    Err(SchedulerError::Unsupported)
}

#[cfg(unix)]
fn last_os_error() -> SchedulerError {
    SchedulerError::ResourceLimit(std::io::Error::last_os_error().to_string())
}
