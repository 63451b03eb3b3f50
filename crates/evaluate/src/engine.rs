//! MEF computation for one normalized model against the observation baseline.
//!
//! Every aggregation uses the same ratio,
//! `MEF = 1 - Σ(obs - model)² / Σ(obs - obsmean)²`,
//! with `obsmean` the per-cell climatology. Only the grouping of the sums
//! changes: the whole record, calendar months, seasons, or space per time
//! step. NaN terms are skipped; a group without any finite term sums to NaN.

use mef_baseline::ObservationBaseline;
use mef_calendar::{Season, YearMonth};
use mef_normalize::RegriddedModelSeries;
use ndarray::{Array, Array1, Array2, Array3, ArrayView3, Axis, Dimension, Zip};

use crate::error::EvaluateError;

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// Numerator and denominator totals of one aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Terms<D: Dimension> {
    /// `Σ(obs - model)²` per group.
    pub numerator: Array<f64, D>,
    /// `Σ(obs - obsmean)²` per group.
    pub denominator: Array<f64, D>,
    /// `Σ obs²` per group, the magnitude a vanishing denominator is judged
    /// against.
    pub scale: Array<f64, D>,
}

impl<D: Dimension> Terms<D> {
    /// Element-wise `1 - numerator / denominator`, see [`mef_stats::efficiency`].
    pub fn efficiency(&self) -> Array<f64, D> {
        Zip::from(&self.numerator)
            .and(&self.denominator)
            .and(&self.scale)
            .map_collect(|&n, &d, &s| mef_stats::efficiency(n, d, s))
    }
}

/// Raw totals behind every field of a [`MetricSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct MefTerms {
    /// Whole-record sums, `[y, x]`.
    pub annual: Terms<ndarray::Ix2>,
    /// Per-season sums, `[season, y, x]` in DJF, MAM, JJA, SON order.
    pub seasonal: Terms<ndarray::Ix3>,
    /// Per-calendar-month sums, `[month, y, x]` in January..December order.
    pub monthly: Terms<ndarray::Ix3>,
    /// Spatial sums per time step, `[time]`.
    pub binned: Terms<ndarray::Ix1>,
}

impl MefTerms {
    /// Turn the totals into efficiencies labeled with `model` and `times`.
    pub fn into_metric_set(self, model: impl Into<String>, times: Vec<YearMonth>) -> MetricSet {
        MetricSet {
            model: model.into(),
            times,
            annual: self.annual.efficiency(),
            seasonal: self.seasonal.efficiency(),
            monthly: self.monthly.efficiency(),
            binned: self.binned.efficiency(),
        }
    }
}

// ---------------------------------------------------------------------------
// MetricSet
// ---------------------------------------------------------------------------

/// The four MEF fields of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSet {
    model: String,
    times: Vec<YearMonth>,
    annual: Array2<f64>,
    seasonal: Array3<f64>,
    monthly: Array3<f64>,
    binned: Array1<f64>,
}

impl MetricSet {
    /// Model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Time labels of [`MetricSet::binned`].
    pub fn times(&self) -> &[YearMonth] {
        &self.times
    }

    /// Whole-record MEF, `[y, x]`.
    pub fn annual(&self) -> &Array2<f64> {
        &self.annual
    }

    /// Seasonal MEF, `[season, y, x]`.
    pub fn seasonal(&self) -> &Array3<f64> {
        &self.seasonal
    }

    /// Monthly MEF, `[month, y, x]`.
    pub fn monthly(&self) -> &Array3<f64> {
        &self.monthly
    }

    /// Spatially binned MEF, one value per time step.
    pub fn binned(&self) -> &Array1<f64> {
        &self.binned
    }

    /// Spatial shape `(ny, nx)`.
    pub fn spatial_shape(&self) -> (usize, usize) {
        self.annual.dim()
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute the numerator and denominator totals for every aggregation.
///
/// # Errors
///
/// Returns [`EvaluateError::ShapeMismatch`] if the model field, observation
/// field and climatology disagree in shape, and
/// [`EvaluateError::TimeAlignment`] if the time labels differ.
pub fn compute_terms(
    baseline: &ObservationBaseline,
    model: &RegriddedModelSeries,
) -> Result<MefTerms, EvaluateError> {
    let obs = baseline.series();
    let sim = model.series();
    let id = model.id();

    let obs_shape = obs.values().shape();
    if sim.values().shape() != obs_shape {
        return Err(EvaluateError::ShapeMismatch {
            model: id.to_string(),
            name: "model field".to_string(),
            expected: obs_shape.to_vec(),
            got: sim.values().shape().to_vec(),
        });
    }
    let clim = baseline.climatology();
    if clim.shape() != &obs_shape[1..] {
        return Err(EvaluateError::ShapeMismatch {
            model: id.to_string(),
            name: "climatology".to_string(),
            expected: obs_shape[1..].to_vec(),
            got: clim.shape().to_vec(),
        });
    }
    if let Some((t, (o, m))) = obs
        .times()
        .iter()
        .zip(sim.times())
        .enumerate()
        .find(|(_, (o, m))| o != m)
    {
        return Err(EvaluateError::TimeAlignment {
            model: id.to_string(),
            reason: format!("step {t} is {m} in the model and {o} in the observations"),
        });
    }

    let mut numerator = Array3::<f64>::zeros(obs.values().raw_dim());
    Zip::from(&mut numerator)
        .and(obs.values())
        .and(sim.values())
        .for_each(|n, &o, &m| *n = mef_stats::squared_error(o, m));

    let mut denominator = Array3::<f64>::zeros(obs.values().raw_dim());
    for (mut lane, obs_slice) in denominator
        .axis_iter_mut(Axis(0))
        .zip(obs.values().axis_iter(Axis(0)))
    {
        Zip::from(&mut lane)
            .and(&obs_slice)
            .and(clim)
            .for_each(|d, &o, &c| *d = mef_stats::squared_error(o, c));
    }

    let scale = obs.values().mapv(|o| o * o);

    let times = obs.times();
    let month_groups = groups(times, 12, |t| t.month_index());
    let season_groups = groups(times, Season::ALL.len(), |t| t.season().index());

    Ok(MefTerms {
        annual: Terms {
            numerator: sum_time(numerator.view()),
            denominator: sum_time(denominator.view()),
            scale: sum_time(scale.view()),
        },
        seasonal: Terms {
            numerator: sum_groups(numerator.view(), &season_groups),
            denominator: sum_groups(denominator.view(), &season_groups),
            scale: sum_groups(scale.view(), &season_groups),
        },
        monthly: Terms {
            numerator: sum_groups(numerator.view(), &month_groups),
            denominator: sum_groups(denominator.view(), &month_groups),
            scale: sum_groups(scale.view(), &month_groups),
        },
        binned: Terms {
            numerator: sum_space(numerator.view()),
            denominator: sum_space(denominator.view()),
            scale: sum_space(scale.view()),
        },
    })
}

/// Compute the four MEF fields of `model`.
///
/// # Errors
///
/// Same as [`compute_terms`].
pub fn compute_metrics(
    baseline: &ObservationBaseline,
    model: &RegriddedModelSeries,
) -> Result<MetricSet, EvaluateError> {
    let terms = compute_terms(baseline, model)?;
    Ok(terms.into_metric_set(model.id(), baseline.series().times().to_vec()))
}

/// Time indices of each of `n` groups.
fn groups(times: &[YearMonth], n: usize, key: impl Fn(YearMonth) -> usize) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new(); n];
    for (t, &month) in times.iter().enumerate() {
        out[key(month)].push(t);
    }
    out
}

fn sum_time(terms: ArrayView3<'_, f64>) -> Array2<f64> {
    terms.map_axis(Axis(0), |lane| mef_stats::nansum_iter(lane.iter().copied()))
}

fn sum_groups(terms: ArrayView3<'_, f64>, groups: &[Vec<usize>]) -> Array3<f64> {
    let (_, ny, nx) = terms.dim();
    let mut out = Array3::from_elem((groups.len(), ny, nx), f64::NAN);
    for (mut dst, idx) in out.axis_iter_mut(Axis(0)).zip(groups) {
        if idx.is_empty() {
            continue;
        }
        dst.assign(&sum_time(terms.select(Axis(0), idx).view()));
    }
    out
}

fn sum_space(terms: ArrayView3<'_, f64>) -> Array1<f64> {
    terms
        .axis_iter(Axis(0))
        .map(|slice| mef_stats::nansum_iter(slice.iter().copied()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn efficiency_of_terms() {
        let t = Terms {
            numerator: array![0.2, 0.0, 1.0, f64::NAN],
            denominator: array![0.05, 0.0, f64::NAN, 1.0],
            scale: array![1.0, 1.0, 1.0, 1.0],
        };
        let e = t.efficiency();
        assert_relative_eq!(e[0], -3.0, epsilon = 1e-12);
        assert!(e[1].is_nan());
        assert!(e[2].is_nan());
        assert!(e[3].is_nan());
    }

    #[test]
    fn denominator_at_rounding_level_is_degenerate() {
        let t = Terms {
            numerator: array![0.04, 0.04],
            denominator: array![1.45e-27, 1e-6],
            scale: array![38.88, 38.88],
        };
        let e = t.efficiency();
        assert!(e[0].is_nan());
        assert_relative_eq!(e[1], 1.0 - 0.04 / 1e-6, epsilon = 1e-9);
    }

    #[test]
    fn groups_follow_calendar() {
        let start = YearMonth::new(1978, 12).unwrap();
        let times = mef_calendar::month_sequence(start, 4);
        let seasons = groups(&times, 4, |t| t.season().index());
        assert_eq!(seasons[0], vec![0, 1, 2]);
        assert_eq!(seasons[1], vec![3]);
        assert!(seasons[2].is_empty());
        let months = groups(&times, 12, |t| t.month_index());
        assert_eq!(months[11], vec![0]);
        assert_eq!(months[0], vec![1]);
    }

    #[test]
    fn sums_skip_nan_and_empty_groups_are_nan() {
        let terms = Array3::from_shape_vec((3, 1, 2), vec![1.0, f64::NAN, 2.0, f64::NAN, 3.0, f64::NAN])
            .unwrap();
        let annual = sum_time(terms.view());
        assert_eq!(annual[[0, 0]], 6.0);
        assert!(annual[[0, 1]].is_nan());

        let grouped = sum_groups(terms.view(), &[vec![0, 2], vec![], vec![1]]);
        assert_eq!(grouped[[0, 0, 0]], 4.0);
        assert!(grouped[[1, 0, 0]].is_nan());
        assert_eq!(grouped[[2, 0, 0]], 2.0);

        let binned = sum_space(terms.view());
        assert_eq!(binned.to_vec(), vec![1.0, 2.0, 3.0]);
    }
}
