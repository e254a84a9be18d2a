//! Fit several independent data sets at once.
//!
//! Each data set is fitted on its own rayon task. Results come back in input
//! order, one per data set, so a failure in one set does not hide the others.

use rayon::prelude::*;

use crate::domain::Measurement;
use crate::error::UslError;
use crate::fit::{Fit, Fitter};

/// Fit every data set in `datasets` with `fitter` (parallel).
pub fn build_all<F>(fitter: &F, datasets: &[Vec<Measurement>]) -> Vec<Result<Fit, UslError>>
where
    F: Fitter + Sync + ?Sized,
{
    datasets.par_iter().map(|ms| fitter.fit(ms)).collect()
}
