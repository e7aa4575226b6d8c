//! Coast-down period detection
//!
//! A coast-down is a stretch where neither the primary heat nor auxiliary heat
//! ran, so the indoor temperature drifts toward outdoor at the building's
//! natural loss rate. The longest such stretch is the best window for fitting
//! that rate; ties go to the most recent one since it reflects the building
//! as it is now.

use statrs::statistics::Statistics;
use tracing::debug;

use super::{sample_interval_hours, EstimatorError};
use crate::types::{CoastDownDiagnostics, CoastDownPeriod, Sample};

/// Equal durations within this tolerance count as a tie (hours).
const TIE_TOLERANCE_HOURS: f64 = 1e-9;

/// Find the longest qualifying coast-down using the configured minimum duration.
pub fn find_coast_down(samples: &[Sample]) -> Result<CoastDownPeriod, EstimatorError> {
    find_coast_down_with(samples, crate::config::get().coast_down.min_off_hours)
}

/// Find the longest heating-off run lasting at least `min_off_hours`.
///
/// A run's duration is the span between its first and last timestamps plus
/// one sample interval, so three hourly samples cover 3.0 hours. The
/// longest run is reported in the diagnostics even when it falls short.
pub fn find_coast_down_with(
    samples: &[Sample],
    min_off_hours: f64,
) -> Result<CoastDownPeriod, EstimatorError> {
    let interval_hours = sample_interval_hours(samples);
    let run_hours = |start: usize, end: usize| -> f64 {
        let span = samples[end].timestamp - samples[start].timestamp;
        span.num_milliseconds() as f64 / 3_600_000.0 + interval_hours
    };

    let mut off_rows = 0usize;
    let mut run_start: Option<usize> = None;
    let mut best: Option<(usize, usize, f64)> = None;

    let close_run = |start: usize, end: usize, best: &mut Option<(usize, usize, f64)>| {
        let hours = run_hours(start, end);
        // `>=` so a later run of equal length replaces an earlier one
        let longer = best.map_or(true, |(_, _, h)| hours + TIE_TOLERANCE_HOURS >= h);
        if longer {
            *best = Some((start, end, hours));
        }
    };

    for (i, sample) in samples.iter().enumerate() {
        if sample.is_heat_off() {
            off_rows += 1;
            run_start.get_or_insert(i);
        } else if let Some(start) = run_start.take() {
            close_run(start, i - 1, &mut best);
        }
    }
    if let Some(start) = run_start {
        close_run(start, samples.len() - 1, &mut best);
    }

    let longest_off_hours = best.map_or(0.0, |(_, _, h)| h);
    debug!(
        total = samples.len(),
        off_rows,
        longest_off_hours,
        min_off_hours,
        "Coast-down scan complete"
    );

    match best {
        Some((start, end, hours)) if hours >= min_off_hours => {
            let run = &samples[start..=end];
            Ok(CoastDownPeriod {
                start_index: start,
                end_index: end,
                start_time: run[0].timestamp,
                end_time: run[run.len() - 1].timestamp,
                duration_hours: hours,
                start_indoor_temp: run[0].indoor_temp,
                end_indoor_temp: run[run.len() - 1].indoor_temp,
                avg_indoor_temp: run.iter().map(|s| s.indoor_temp).mean(),
                avg_outdoor_temp: run.iter().map(|s| s.outdoor_temp).mean(),
            })
        }
        _ => Err(EstimatorError::NoQualifyingCoastDownPeriod(
            CoastDownDiagnostics {
                total_points: samples.len(),
                off_rows,
                longest_off_hours,
                required_off_hours: min_off_hours,
            },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thermal::test_support::heating_series;

    /// Turn heating off for `range` and let the indoor temperature fall 1 °F per sample.
    fn switch_off(samples: &mut [Sample], range: std::ops::Range<usize>) {
        for (k, i) in range.enumerate() {
            samples[i].heat_runtime_sec = 0.0;
            samples[i].indoor_temp = 70.0 - k as f64;
        }
    }

    #[test]
    fn test_selects_longest_run() {
        let mut samples = heating_series(48, 60);
        switch_off(&mut samples, 5..9);
        switch_off(&mut samples, 20..27);

        let period = find_coast_down_with(&samples, 3.0).unwrap();
        assert_eq!(period.start_index, 20);
        assert_eq!(period.end_index, 26);
        assert!((period.duration_hours - 7.0).abs() < 1e-9);
        assert_eq!(period.sample_count(), 7);
        assert!((period.start_indoor_temp - 70.0).abs() < 1e-12);
        assert!((period.end_indoor_temp - 64.0).abs() < 1e-12);
        assert!((period.avg_indoor_temp - 67.0).abs() < 1e-9);
        assert!((period.avg_outdoor_temp - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_prefers_most_recent() {
        let mut samples = heating_series(40, 60);
        switch_off(&mut samples, 3..8);
        switch_off(&mut samples, 30..35);

        let period = find_coast_down_with(&samples, 3.0).unwrap();
        assert_eq!(period.start_index, 30);
    }

    #[test]
    fn test_exactly_three_hours_qualifies() {
        let mut samples = heating_series(12, 60);
        switch_off(&mut samples, 4..7);
        let period = find_coast_down_with(&samples, 3.0).unwrap();
        assert!((period.duration_hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_run_rejected_even_if_longest() {
        // 35 five-minute samples = 2h55m
        let mut samples = heating_series(200, 5);
        switch_off(&mut samples, 100..135);

        let err = find_coast_down_with(&samples, 3.0).unwrap_err();
        let diag = err.diagnostics().unwrap();
        assert_eq!(diag.total_points, 200);
        assert_eq!(diag.off_rows, 35);
        assert!((diag.longest_off_hours - 35.0 * 5.0 / 60.0).abs() < 1e-9);
        assert!((diag.required_off_hours - 3.0).abs() < 1e-12);
        assert!(diag.missing_hours() > 0.0);
    }

    #[test]
    fn test_run_at_end_of_series() {
        let mut samples = heating_series(24, 60);
        switch_off(&mut samples, 18..24);
        let period = find_coast_down_with(&samples, 3.0).unwrap();
        assert_eq!(period.end_index, 23);
        assert!((period.duration_hours - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_aux_runtime_breaks_run() {
        let mut samples = heating_series(24, 60);
        switch_off(&mut samples, 4..12);
        samples[8].aux_runtime_sec = 120.0;

        let err = find_coast_down_with(&samples, 5.0).unwrap_err();
        let diag = err.diagnostics().unwrap();
        assert_eq!(diag.off_rows, 7);
        assert!((diag.longest_off_hours - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_off_samples() {
        let samples = heating_series(96, 60);
        let err = find_coast_down_with(&samples, 3.0).unwrap_err();
        let diag = err.diagnostics().unwrap();
        assert_eq!(diag.off_rows, 0);
        assert_eq!(diag.longest_off_hours, 0.0);
    }

    #[test]
    fn test_empty_series() {
        let err = find_coast_down_with(&[], 3.0).unwrap_err();
        assert_eq!(err.diagnostics().unwrap().total_points, 0);
    }
}
