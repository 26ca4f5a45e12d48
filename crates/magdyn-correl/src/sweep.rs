use magdyn_core::{CorrelationConfig, ErrorInfo, MagdynError, MagdynReal, MagneticSite};
use rayon::prelude::*;
use tracing::debug;

use crate::observer::CorrelationObserver;
use crate::pipeline::{query_momentum, MomentumPoint, MomentumReport};

fn thread_pool_error(err: impl ToString) -> MagdynError {
    MagdynError::Numeric(ErrorInfo::new("thread-pool", err.to_string()))
}

/// Options governing a momentum sweep.
#[derive(Debug, Clone)]
pub struct SweepOpts {
    /// Number of worker threads.
    pub concurrency: usize,
}

impl Default for SweepOpts {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Evaluates independent momentum points in parallel.
///
/// Reports come back in input order. Sites and configuration are shared
/// read-only between the workers. A singular Cholesky factor only flags the
/// affected report; shape errors abort the sweep.
pub fn sweep_momenta<T, O>(
    sites: &[MagneticSite<T>],
    config: &CorrelationConfig,
    points: &[MomentumPoint<T>],
    observer: &O,
    opts: &SweepOpts,
) -> Result<Vec<MomentumReport<T>>, MagdynError>
where
    T: MagdynReal,
    O: CorrelationObserver<T> + Sync + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.concurrency.max(1))
        .build()
        .map_err(thread_pool_error)?;

    let reports: Result<Vec<_>, MagdynError> = pool.install(|| {
        points
            .par_iter()
            .map(|point| query_momentum(sites, config, point, observer))
            .collect()
    });
    let reports = reports?;

    let failed = reports.iter().filter(|report| !report.inversion_ok).count();
    debug!(points = reports.len(), failed, "momentum sweep finished");
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_numeric_errors() {
        let err = thread_pool_error("no threads available");
        assert!(matches!(err, MagdynError::Numeric(_)));
        assert_eq!(err.info().code, "thread-pool");
        assert_eq!(err.info().message, "no threads available");
    }
}
