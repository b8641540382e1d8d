use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::expand::atomic_intervals;
use crate::models::{IntervalNode, WorkoutDescription, WorkoutMetrics};

/// `duration_seconds × percent_ftp²` units per TSS point (3600 s/h × 100² / 100)
const STRESS_UNITS_PER_TSS: u128 = 360_000;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Core TSS calculation engine for planned workouts.
///
/// Every atomic interval is held at constant intensity, so its TSS is exact:
/// TSS = duration_hours × (percent_ftp / 100)² × 100
pub struct TssCalculator;

impl TssCalculator {
    /// Unrounded TSS of a single atomic interval
    pub fn segment_tss(percent_ftp: u32, duration_seconds: u32) -> Decimal {
        Self::units_to_tss(Self::stress_units(percent_ftp, duration_seconds))
    }

    /// Unrounded TSS of a whole interval list, repeats traversed explicitly
    pub fn raw_tss(intervals: &[IntervalNode]) -> Decimal {
        let units = atomic_intervals(intervals)
            .map(|atomic| Self::stress_units(atomic.interval.percent_ftp, atomic.interval.duration))
            .fold(0u128, u128::saturating_add);

        Self::units_to_tss(units)
    }

    /// Total TSS, rounded to the nearest integer (ties to even) only at the aggregate
    pub fn compute_tss(intervals: &[IntervalNode]) -> u32 {
        // Validated workouts never exceed u32::MAX TSS, see `WorkoutValidator`
        Self::round_tss(Self::raw_tss(intervals)).unwrap_or(u32::MAX)
    }

    /// Rounded TSS computed per group rather than per repetition, `None` when it does not fit
    /// in `u32`
    pub fn checked_tss(intervals: &[IntervalNode]) -> Option<u32> {
        let units = intervals
            .iter()
            .map(|node| match node {
                IntervalNode::Simple(interval) => Self::stress_units(interval.percent_ftp, interval.duration),
                IntervalNode::Group(group) => {
                    let single_pass = group
                        .subintervals
                        .iter()
                        .map(|sub| Self::stress_units(sub.percent_ftp, sub.duration))
                        .fold(0u128, u128::saturating_add);
                    u128::from(group.repeat()).saturating_mul(single_pass)
                }
            })
            .fold(0u128, u128::saturating_add);

        Self::round_tss(Self::units_to_tss(units))
    }

    fn round_tss(raw: Decimal) -> Option<u32> {
        raw.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven).to_u32()
    }

    /// Total duration in seconds, group members counted once per repetition
    ///
    /// Saturates at `u32::MAX`; the validator rejects workouts that long before they get here.
    pub fn total_duration(intervals: &[IntervalNode]) -> u32 {
        atomic_intervals(intervals)
            .map(|atomic| atomic.interval.duration)
            .fold(0u32, u32::saturating_add)
    }

    /// Exact total duration in seconds, `None` when it does not fit in `u32`.
    ///
    /// Computed per group rather than per repetition, so huge repeat counts stay cheap.
    pub fn checked_total_duration(intervals: &[IntervalNode]) -> Option<u32> {
        let seconds: u128 = intervals
            .iter()
            .map(|node| match node {
                IntervalNode::Simple(interval) => u128::from(interval.duration),
                IntervalNode::Group(group) => {
                    let single_pass: u128 = group.subintervals.iter().map(|sub| u128::from(sub.duration)).sum();
                    u128::from(group.repeat()) * single_pass
                }
            })
            .sum();

        u32::try_from(seconds).ok()
    }

    /// Intensity Factor from the rounded TSS and total duration.
    ///
    /// IF = round(√(TSS / duration_hours / 100), 2), shown with at least one decimal place
    /// (`1.0`, `0.75`). A zero-length workout reports a plain 0.
    pub fn intensity_factor(tss: u32, duration_seconds: u32) -> Decimal {
        if duration_seconds == 0 {
            return Decimal::ZERO;
        }

        let duration_hours = f64::from(duration_seconds) / SECONDS_PER_HOUR;
        let value = (f64::from(tss) / duration_hours / 100.0).sqrt();

        Decimal::from_f64_retain(value)
            .map(|factor| {
                let mut factor = factor
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
                    .normalize();
                if factor.scale() == 0 {
                    factor.rescale(1);
                }
                factor
            })
            .unwrap_or(Decimal::ZERO)
    }

    /// Duration, TSS and IF for a workout, derived from its interval structure only
    pub fn compute_workout_metrics(workout: &WorkoutDescription) -> WorkoutMetrics {
        let duration = Self::total_duration(&workout.intervals);
        let tss = Self::compute_tss(&workout.intervals);
        let intensity_factor = Self::intensity_factor(tss, duration);

        tracing::debug!(
            workout = %workout.name,
            duration,
            tss,
            intensity_factor = %intensity_factor,
            "Computed workout metrics"
        );

        WorkoutMetrics {
            duration,
            tss,
            intensity_factor,
        }
    }

    /// `u32³` fits in `u128` and in a `Decimal` mantissa
    fn stress_units(percent_ftp: u32, duration_seconds: u32) -> u128 {
        let percent = u128::from(percent_ftp);
        u128::from(duration_seconds) * percent * percent
    }

    fn units_to_tss(units: u128) -> Decimal {
        let units = i128::try_from(units)
            .ok()
            .and_then(|units| Decimal::try_from_i128_with_scale(units, 0).ok())
            .unwrap_or(Decimal::MAX);
        units / Decimal::from(STRESS_UNITS_PER_TSS as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SimpleInterval;
    use rust_decimal_macros::dec;

    fn four_by_four() -> WorkoutDescription {
        WorkoutDescription::new(
            "4x4 3-2-1",
            vec![
                IntervalNode::simple("WARM UP", 50, 300),
                IntervalNode::simple("WARM UP 2", 60, 300),
                IntervalNode::group(
                    "4X2min 75-65",
                    3,
                    vec![
                        SimpleInterval::new("4 min Tempo", 105, 240),
                        SimpleInterval::new("3 min Hvile", 50, 180),
                    ],
                ),
                IntervalNode::simple("3 min", 105, 180),
                IntervalNode::simple("2 min Hvile", 50, 120),
                IntervalNode::simple("2 min", 105, 120),
                IntervalNode::simple("1 min Hvile", 50, 60),
                IntervalNode::simple("1 min", 105, 60),
                IntervalNode::simple("Recovery", 50, 600),
            ],
        )
    }

    #[test]
    fn test_single_interval_metrics() {
        let workout = WorkoutDescription::new("T", vec![IntervalNode::simple("A", 100, 60)]);

        let metrics = TssCalculator::compute_workout_metrics(&workout);

        assert_eq!(metrics.duration, 60);
        assert_eq!(metrics.tss, 2); // 1.666... rounded
        assert_eq!(metrics.intensity_factor, dec!(1.1)); // sqrt(2 / (1/60) / 100) = 1.095
    }

    #[test]
    fn test_segment_tss_at_threshold() {
        // One hour at FTP is 100 TSS by definition
        assert_eq!(TssCalculator::segment_tss(100, 3600), dec!(100));
        assert_eq!(TssCalculator::segment_tss(50, 3600), dec!(25));
        assert_eq!(TssCalculator::segment_tss(0, 3600), Decimal::ZERO);
    }

    #[test]
    fn test_group_tss_counts_every_repetition() {
        let once = vec![IntervalNode::group(
            "Block",
            1,
            vec![SimpleInterval::new("On", 120, 300), SimpleInterval::new("Off", 40, 300)],
        )];
        let thrice = vec![IntervalNode::group(
            "Block",
            3,
            vec![SimpleInterval::new("On", 120, 300), SimpleInterval::new("Off", 40, 300)],
        )];

        assert_eq!(TssCalculator::raw_tss(&thrice), TssCalculator::raw_tss(&once) * dec!(3));
        assert_eq!(TssCalculator::total_duration(&thrice), 1800);
    }

    #[test]
    fn test_rounding_happens_only_at_the_aggregate() {
        // Each segment is 0.4 TSS: per-segment rounding would report 0, the aggregate is 1.2
        let intervals: Vec<IntervalNode> = (0..3)
            .map(|i| IntervalNode::simple(format!("S{}", i), 60, 40))
            .collect();

        assert_eq!(TssCalculator::segment_tss(60, 40), dec!(0.4));
        assert_eq!(TssCalculator::raw_tss(&intervals), dec!(1.2));
        assert_eq!(TssCalculator::compute_tss(&intervals), 1);

        // 5 × 0.4 = 2.0; rounding each to 0 first would yield 0
        let five: Vec<IntervalNode> = (0..5)
            .map(|i| IntervalNode::simple(format!("S{}", i), 60, 40))
            .collect();
        assert_eq!(TssCalculator::compute_tss(&five), 2);
    }

    #[test]
    fn test_midpoint_rounds_to_even() {
        // 1800 s at 100% = 50 TSS; 0.5 TSS = 180000 units = 18 s at 100%
        let half = vec![IntervalNode::simple("Half", 100, 18)];
        assert_eq!(TssCalculator::raw_tss(&half), dec!(0.5));
        assert_eq!(TssCalculator::compute_tss(&half), 0);

        let one_and_half = vec![IntervalNode::simple("One and a half", 100, 54)];
        assert_eq!(TssCalculator::raw_tss(&one_and_half), dec!(1.5));
        assert_eq!(TssCalculator::compute_tss(&one_and_half), 2);
    }

    #[test]
    fn test_zero_duration_intensity_factor_is_zero() {
        let workout = WorkoutDescription::new("Empty", Vec::new());

        let metrics = TssCalculator::compute_workout_metrics(&workout);

        assert_eq!(metrics.duration, 0);
        assert_eq!(metrics.tss, 0);
        assert_eq!(metrics.intensity_factor, Decimal::ZERO);
        assert_eq!(TssCalculator::intensity_factor(50, 0), Decimal::ZERO);
    }

    #[test]
    fn test_intensity_factor_rounding() {
        // One hour at FTP
        assert_eq!(TssCalculator::intensity_factor(100, 3600), dec!(1));
        assert_eq!(TssCalculator::intensity_factor(100, 3600).to_string(), "1.0");
        assert_eq!(TssCalculator::intensity_factor(2, 60).to_string(), "1.1");
        assert_eq!(TssCalculator::intensity_factor(0, 60).to_string(), "0.0");
        assert_eq!(TssCalculator::intensity_factor(0, 0).to_string(), "0");
        // 2 h at 75%: TSS 112.5 -> 112, IF = sqrt(0.56) = 0.748
        assert_eq!(TssCalculator::intensity_factor(112, 7200), dec!(0.75));
    }

    #[test]
    fn test_reference_workout_metrics() {
        let metrics = TssCalculator::compute_workout_metrics(&four_by_four());

        assert_eq!(metrics.duration, 3000);
        assert_eq!(TssCalculator::raw_tss(&four_by_four().intervals), dec!(47.325));
        assert_eq!(metrics.tss, 47);
        assert_eq!(metrics.intensity_factor, dec!(0.75));
    }

    #[test]
    fn test_durations_past_u32_saturate_instead_of_wrapping() {
        let intervals = vec![
            IntervalNode::simple("A", 100, 3_000_000_000),
            IntervalNode::simple("B", 100, 3_000_000_000),
        ];

        assert_eq!(TssCalculator::total_duration(&intervals), u32::MAX);
        assert_eq!(TssCalculator::checked_total_duration(&intervals), None);
        // 6e9 s at FTP is still summed exactly
        assert_eq!(TssCalculator::compute_tss(&intervals), 166_666_667);
    }

    #[test]
    fn test_checked_total_duration() {
        assert_eq!(TssCalculator::checked_total_duration(&four_by_four().intervals), Some(3000));

        let huge_repeat = vec![IntervalNode::group(
            "Forever",
            u32::MAX,
            vec![SimpleInterval::new("On", 100, 2)],
        )];
        assert_eq!(TssCalculator::checked_total_duration(&huge_repeat), None);
    }

    #[test]
    fn test_extreme_intensity_does_not_overflow() {
        let tss = TssCalculator::segment_tss(u32::MAX, u32::MAX);
        assert!(tss > Decimal::from(u32::MAX));
        assert_eq!(TssCalculator::compute_tss(&[IntervalNode::simple("X", u32::MAX, u32::MAX)]), u32::MAX);
        assert_eq!(TssCalculator::checked_tss(&[IntervalNode::simple("X", u32::MAX, u32::MAX)]), None);
    }

    #[test]
    fn test_checked_tss_agrees_with_traversal() {
        let workout = four_by_four();
        assert_eq!(TssCalculator::checked_tss(&workout.intervals), Some(47));
        assert_eq!(
            TssCalculator::checked_tss(&workout.intervals),
            Some(TssCalculator::compute_tss(&workout.intervals))
        );
    }

    #[test]
    fn test_metrics_serialize_if_as_number() {
        let metrics = WorkoutMetrics {
            duration: 3000,
            tss: 47,
            intensity_factor: dec!(0.75),
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["if"], serde_json::json!(0.75));
        assert_eq!(json["tss"], serde_json::json!(47));
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_doubling_duration_doubles_segment_tss(
            percent_ftp in 1u32..250,
            duration in 1u32..20_000,
        ) {
            let single = TssCalculator::raw_tss(&[IntervalNode::simple("S", percent_ftp, duration)]);
            let double = TssCalculator::raw_tss(&[IntervalNode::simple("S", percent_ftp, duration * 2)]);

            prop_assert!((double - single * dec!(2)).abs() < dec!(0.000000001));
        }

        #[test]
        fn test_doubling_intensity_quadruples_segment_tss(
            percent_ftp in 1u32..150,
            duration in 1u32..20_000,
        ) {
            let single = TssCalculator::raw_tss(&[IntervalNode::simple("S", percent_ftp, duration)]);
            let double = TssCalculator::raw_tss(&[IntervalNode::simple("S", percent_ftp * 2, duration)]);

            prop_assert!((double - single * dec!(4)).abs() < dec!(0.000000001));
        }

        #[test]
        fn test_repeat_scales_group_tss(
            repeat in 1u32..10,
            percent_ftp in 1u32..200,
            duration in 1u32..3600,
        ) {
            let sub = SimpleInterval::new("S", percent_ftp, duration);
            let grouped = TssCalculator::raw_tss(&[IntervalNode::group("G", repeat, vec![sub])]);
            let flat: Vec<IntervalNode> = (0..repeat)
                .map(|_| IntervalNode::simple("S", percent_ftp, duration))
                .collect();

            prop_assert_eq!(grouped, TssCalculator::raw_tss(&flat));
            prop_assert_eq!(
                TssCalculator::total_duration(&flat),
                repeat * duration
            );
        }

        #[test]
        fn test_intensity_factor_is_non_negative(tss in 0u32..1000, duration in 0u32..40_000) {
            prop_assert!(TssCalculator::intensity_factor(tss, duration) >= Decimal::ZERO);
        }
    }
}
