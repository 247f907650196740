// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Attendance reconciliation for a date range of one staff member.
//!
//! This module provides the pure, deterministic pairing of raw attendance
//! punches with approved shifts to compute worked minutes (net of break),
//! lateness, and absence, including the "as of now" judgment for the current
//! day.
//!
//! ## Invariants
//!
//! - Day records are produced in ascending date order
//! - Reconciliation never fails on anomalous input; anomalies degrade to a
//!   deterministic fallback and are reported on the warnings side channel
//! - Lateness is evaluated only for days carrying a shift; without a shift it
//!   is undefined, not false
//! - Absence is evaluated only for days carrying an approved shift

use crate::types::{AttendanceEvent, DEFAULT_BREAK_MINUTES, PunchKind, Shift};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{Date, Duration, PrimitiveDateTime};

/// Grace period after a shift's scheduled end before an unpunched current
/// day is judged absent.
const ABSENCE_GRACE: Duration = Duration::hours(1);

/// The derived per-date view joining a shift with its punches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledDay {
    /// The civil date this record covers.
    pub date: Date,
    /// The approved shift on this date, if one exists.
    pub shift: Option<Shift>,
    /// Wake-up report timestamp.
    pub wake_up: Option<PrimitiveDateTime>,
    /// Departure report timestamp.
    pub departure: Option<PrimitiveDateTime>,
    /// Clock-in timestamp.
    pub clock_in: Option<PrimitiveDateTime>,
    /// Clock-out timestamp.
    pub clock_out: Option<PrimitiveDateTime>,
    /// Minutes worked net of break. `None` until both clock punches exist.
    pub worked_minutes: Option<u32>,
    /// Whether the clock-in was later than the shift start. `None` when no
    /// shift or no clock-in exists; lateness is undefined then.
    pub is_late: Option<bool>,
    /// Whether this day is judged absent. Undecided days read `false`.
    pub is_absent: bool,
}

/// Aggregate counters over one reconciled range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceTotals {
    /// Sum of worked minutes across completed days.
    pub worked_minutes: u32,
    /// Worked minutes rendered as `H:MM`.
    pub worked_text: String,
    /// Days with both a clock-in and a clock-out.
    pub work_days: u32,
    /// Days judged late.
    pub late_count: u32,
    /// Days judged absent.
    pub absent_days: u32,
    /// Days carrying an approved shift.
    pub scheduled_days: u32,
}

/// Data anomalies observed while reconciling. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileWarning {
    /// More than one punch of one kind existed for a single date; the latest
    /// recorded timestamp was kept.
    DuplicatePunch {
        /// The affected date.
        date: Date,
        /// The duplicated punch kind.
        kind: PunchKind,
        /// How many punches were discarded.
        discarded: u32,
    },
    /// Punches exist on a date with no shift.
    UnscheduledPunch {
        /// The affected date.
        date: Date,
    },
    /// A clock-out exists without a clock-in. Treated as no attendance for
    /// absence purposes; repairing it is outside this module's authority.
    ClockOutWithoutClockIn {
        /// The affected date.
        date: Date,
    },
}

/// The reconciled range: ordered day records, totals, and observed anomalies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledRange {
    /// One record per date, ascending.
    pub days: Vec<ReconciledDay>,
    /// Aggregate counters.
    pub totals: AttendanceTotals,
    /// Data anomalies observed while pairing.
    pub warnings: Vec<ReconcileWarning>,
}

/// Punch slots for one date while pairing.
#[derive(Debug, Clone, Copy, Default)]
struct DaySlots {
    wake_up: Option<PrimitiveDateTime>,
    departure: Option<PrimitiveDateTime>,
    clock_in: Option<PrimitiveDateTime>,
    clock_out: Option<PrimitiveDateTime>,
}

impl DaySlots {
    fn slot_mut(&mut self, kind: PunchKind) -> &mut Option<PrimitiveDateTime> {
        match kind {
            PunchKind::WakeUp => &mut self.wake_up,
            PunchKind::Departure => &mut self.departure,
            PunchKind::ClockIn => &mut self.clock_in,
            PunchKind::ClockOut => &mut self.clock_out,
        }
    }
}

/// Reconciles a range of shifts and punches into per-day records and totals.
///
/// The upstream store guarantees at most one shift per date and one punch per
/// (date, kind); reconciliation tolerates violations of the punch contract by
/// keeping the latest recorded timestamp and reporting the anomaly.
///
/// # Arguments
///
/// * `shifts` - The range's approved shifts
/// * `events` - The range's attendance punches
/// * `now` - The current civil instant; `now.date()` is today
///
/// # Judgment rules
///
/// - Worked minutes: `max(0, (clock_out - clock_in) - break)` once both clock
///   punches exist; the break comes from the day's shift, defaulting to 60
///   minutes on shift-less days
/// - Late: clock-in after shift start, shift-carrying days only
/// - Absent: shift-carrying days only — future days never; today only once
///   `now` is at least one hour past the scheduled end and no clock-in
///   exists; past days whenever no clock-in exists
#[must_use]
pub fn reconcile(
    shifts: &[Shift],
    events: &[AttendanceEvent],
    now: PrimitiveDateTime,
) -> ReconciledRange {
    let today: Date = now.date();
    let mut warnings: Vec<ReconcileWarning> = Vec::new();

    // Pair shifts by date. Uniqueness is guaranteed upstream; keep the first
    // occurrence if the guarantee is ever violated.
    let mut shift_by_date: BTreeMap<Date, &Shift> = BTreeMap::new();
    for shift in shifts {
        shift_by_date.entry(shift.date).or_insert(shift);
    }

    // Fill punch slots, latest recorded timestamp winning on duplicates.
    let mut slots_by_date: BTreeMap<Date, DaySlots> = BTreeMap::new();
    let mut duplicates: BTreeMap<(Date, PunchKind), u32> = BTreeMap::new();
    for event in events {
        let slots: &mut DaySlots = slots_by_date.entry(event.date).or_default();
        let slot: &mut Option<PrimitiveDateTime> = slots.slot_mut(event.kind);
        match *slot {
            None => *slot = Some(event.recorded_at),
            Some(existing) => {
                *duplicates.entry((event.date, event.kind)).or_insert(0) += 1;
                if event.recorded_at > existing {
                    *slot = Some(event.recorded_at);
                }
            }
        }
    }
    for ((date, kind), discarded) in duplicates {
        warnings.push(ReconcileWarning::DuplicatePunch {
            date,
            kind,
            discarded,
        });
    }

    // Every date with a shift or a punch produces exactly one record.
    let mut dates: Vec<Date> = shift_by_date.keys().copied().collect();
    for date in slots_by_date.keys() {
        if !shift_by_date.contains_key(date) {
            dates.push(*date);
        }
    }
    dates.sort_unstable();

    let mut days: Vec<ReconciledDay> = Vec::with_capacity(dates.len());
    let mut worked_minutes_total: u32 = 0;
    let mut work_days: u32 = 0;
    let mut late_count: u32 = 0;
    let mut absent_days: u32 = 0;

    for date in dates {
        let shift: Option<&Shift> = shift_by_date.get(&date).copied();
        let slots: DaySlots = slots_by_date.get(&date).copied().unwrap_or_default();

        if shift.is_none() {
            warnings.push(ReconcileWarning::UnscheduledPunch { date });
        }
        if slots.clock_out.is_some() && slots.clock_in.is_none() {
            warnings.push(ReconcileWarning::ClockOutWithoutClockIn { date });
        }

        let worked_minutes: Option<u32> = match (slots.clock_in, slots.clock_out) {
            (Some(clock_in), Some(clock_out)) => {
                let break_minutes: i64 = shift
                    .map_or(i64::from(DEFAULT_BREAK_MINUTES), |s| {
                        i64::from(s.break_minutes)
                    });
                let gross: i64 = (clock_out - clock_in).whole_minutes();
                let net: i64 = (gross - break_minutes).max(0);
                Some(u32::try_from(net).unwrap_or(0))
            }
            _ => None,
        };

        let is_late: Option<bool> = match (shift, slots.clock_in) {
            (Some(s), Some(clock_in)) => Some(clock_in > s.start_time),
            _ => None,
        };

        let is_absent: bool = shift.is_some_and(|s| {
            if date > today {
                // Future days are never judged.
                false
            } else if date == today {
                let threshold: PrimitiveDateTime = s.end_time.saturating_add(ABSENCE_GRACE);
                now >= threshold && slots.clock_in.is_none()
            } else {
                slots.clock_in.is_none()
            }
        });

        if let Some(minutes) = worked_minutes {
            worked_minutes_total += minutes;
            work_days += 1;
        }
        if is_late == Some(true) {
            late_count += 1;
        }
        if is_absent {
            absent_days += 1;
        }

        days.push(ReconciledDay {
            date,
            shift: shift.cloned(),
            wake_up: slots.wake_up,
            departure: slots.departure,
            clock_in: slots.clock_in,
            clock_out: slots.clock_out,
            worked_minutes,
            is_late,
            is_absent,
        });
    }

    let scheduled_days: u32 = u32::try_from(shift_by_date.len()).unwrap_or(u32::MAX);

    ReconciledRange {
        days,
        totals: AttendanceTotals {
            worked_minutes: worked_minutes_total,
            worked_text: format_minutes(worked_minutes_total),
            work_days,
            late_count,
            absent_days,
            scheduled_days,
        },
        warnings,
    }
}

/// Renders a minute count as `H:MM` (e.g. 480 → `"8:00"`).
#[must_use]
pub fn format_minutes(total: u32) -> String {
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ShiftType;
    use time::macros::{date, datetime};

    fn shift_on(
        date: Date,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        break_minutes: u16,
    ) -> Shift {
        Shift::new(
            1,
            date,
            start,
            end,
            break_minutes,
            ShiftType::Regular,
            String::from("HQ"),
        )
    }

    fn punch(date: Date, kind: PunchKind, at: PrimitiveDateTime) -> AttendanceEvent {
        AttendanceEvent::new(1, date, kind, at)
    }

    #[test]
    fn test_worked_minutes_net_of_break() {
        let shifts = vec![shift_on(
            date!(2025 - 07 - 10),
            datetime!(2025 - 07 - 10 09:00:00),
            datetime!(2025 - 07 - 10 18:00:00),
            60,
        )];
        let events = vec![
            punch(
                date!(2025 - 07 - 10),
                PunchKind::ClockIn,
                datetime!(2025 - 07 - 10 09:00:00),
            ),
            punch(
                date!(2025 - 07 - 10),
                PunchKind::ClockOut,
                datetime!(2025 - 07 - 10 18:00:00),
            ),
        ];

        let result = reconcile(&shifts, &events, datetime!(2025 - 07 - 31 12:00:00));

        assert_eq!(result.days.len(), 1);
        assert_eq!(result.days[0].worked_minutes, Some(480));
        assert_eq!(result.totals.worked_minutes, 480);
        assert_eq!(result.totals.worked_text, "8:00");
        assert_eq!(result.totals.work_days, 1);
        assert_eq!(result.totals.scheduled_days, 1);
    }

    #[test]
    fn test_break_never_pushes_worked_minutes_negative() {
        let shifts = vec![shift_on(
            date!(2025 - 07 - 10),
            datetime!(2025 - 07 - 10 09:00:00),
            datetime!(2025 - 07 - 10 10:00:00),
            90,
        )];
        let events = vec![
            punch(
                date!(2025 - 07 - 10),
                PunchKind::ClockIn,
                datetime!(2025 - 07 - 10 09:00:00),
            ),
            punch(
                date!(2025 - 07 - 10),
                PunchKind::ClockOut,
                datetime!(2025 - 07 - 10 10:00:00),
            ),
        ];

        let result = reconcile(&shifts, &events, datetime!(2025 - 07 - 31 12:00:00));
        assert_eq!(result.days[0].worked_minutes, Some(0));
    }

    #[test]
    fn test_lateness_judged_against_shift_start() {
        let shifts = vec![shift_on(
            date!(2025 - 07 - 10),
            datetime!(2025 - 07 - 10 09:00:00),
            datetime!(2025 - 07 - 10 17:00:00),
            60,
        )];

        let late = vec![punch(
            date!(2025 - 07 - 10),
            PunchKind::ClockIn,
            datetime!(2025 - 07 - 10 09:05:00),
        )];
        let result = reconcile(&shifts, &late, datetime!(2025 - 07 - 31 12:00:00));
        assert_eq!(result.days[0].is_late, Some(true));
        assert_eq!(result.totals.late_count, 1);

        let on_time = vec![punch(
            date!(2025 - 07 - 10),
            PunchKind::ClockIn,
            datetime!(2025 - 07 - 10 08:59:00),
        )];
        let result = reconcile(&shifts, &on_time, datetime!(2025 - 07 - 31 12:00:00));
        assert_eq!(result.days[0].is_late, Some(false));
        assert_eq!(result.totals.late_count, 0);
    }

    #[test]
    fn test_lateness_undefined_without_shift() {
        let events = vec![
            punch(
                date!(2025 - 07 - 10),
                PunchKind::ClockIn,
                datetime!(2025 - 07 - 10 09:30:00),
            ),
            punch(
                date!(2025 - 07 - 10),
                PunchKind::ClockOut,
                datetime!(2025 - 07 - 10 18:00:00),
            ),
        ];

        let result = reconcile(&[], &events, datetime!(2025 - 07 - 31 12:00:00));

        assert_eq!(result.days.len(), 1);
        assert_eq!(result.days[0].is_late, None);
        assert!(!result.days[0].is_absent);
        // Shift-less day defaults the break to 60 minutes.
        assert_eq!(result.days[0].worked_minutes, Some(450));
        assert!(
            result
                .warnings
                .contains(&ReconcileWarning::UnscheduledPunch {
                    date: date!(2025 - 07 - 10)
                })
        );
    }

    #[test]
    fn test_today_absence_waits_for_grace_period() {
        let shifts = vec![shift_on(
            date!(2025 - 07 - 10),
            datetime!(2025 - 07 - 10 09:00:00),
            datetime!(2025 - 07 - 10 17:00:00),
            60,
        )];

        // Before the 18:00 threshold: undecided.
        let result = reconcile(&shifts, &[], datetime!(2025 - 07 - 10 17:30:00));
        assert!(!result.days[0].is_absent);
        assert_eq!(result.totals.absent_days, 0);

        // After the threshold with no clock-in: absent.
        let result = reconcile(&shifts, &[], datetime!(2025 - 07 - 10 18:01:00));
        assert!(result.days[0].is_absent);
        assert_eq!(result.totals.absent_days, 1);
    }

    #[test]
    fn test_future_day_never_absent() {
        let shifts = vec![shift_on(
            date!(2025 - 07 - 20),
            datetime!(2025 - 07 - 20 09:00:00),
            datetime!(2025 - 07 - 20 17:00:00),
            60,
        )];

        let result = reconcile(&shifts, &[], datetime!(2025 - 07 - 10 12:00:00));
        assert!(!result.days[0].is_absent);
    }

    #[test]
    fn test_past_day_absent_without_clock_in() {
        let shifts = vec![shift_on(
            date!(2025 - 07 - 08),
            datetime!(2025 - 07 - 08 09:00:00),
            datetime!(2025 - 07 - 08 17:00:00),
            60,
        )];

        let result = reconcile(&shifts, &[], datetime!(2025 - 07 - 10 12:00:00));
        assert!(result.days[0].is_absent);
    }

    #[test]
    fn test_clock_out_alone_still_counts_absent() {
        let shifts = vec![shift_on(
            date!(2025 - 07 - 08),
            datetime!(2025 - 07 - 08 09:00:00),
            datetime!(2025 - 07 - 08 17:00:00),
            60,
        )];
        let events = vec![punch(
            date!(2025 - 07 - 08),
            PunchKind::ClockOut,
            datetime!(2025 - 07 - 08 17:00:00),
        )];

        let result = reconcile(&shifts, &events, datetime!(2025 - 07 - 10 12:00:00));

        assert!(result.days[0].is_absent);
        assert_eq!(result.days[0].worked_minutes, None);
        assert!(
            result
                .warnings
                .contains(&ReconcileWarning::ClockOutWithoutClockIn {
                    date: date!(2025 - 07 - 08)
                })
        );
    }

    #[test]
    fn test_duplicate_punch_keeps_latest_recorded() {
        let shifts = vec![shift_on(
            date!(2025 - 07 - 08),
            datetime!(2025 - 07 - 08 09:00:00),
            datetime!(2025 - 07 - 08 17:00:00),
            60,
        )];
        // Contract violation upstream: two clock-ins on one date.
        let events = vec![
            punch(
                date!(2025 - 07 - 08),
                PunchKind::ClockIn,
                datetime!(2025 - 07 - 08 08:55:00),
            ),
            punch(
                date!(2025 - 07 - 08),
                PunchKind::ClockIn,
                datetime!(2025 - 07 - 08 09:10:00),
            ),
        ];

        let result = reconcile(&shifts, &events, datetime!(2025 - 07 - 10 12:00:00));

        assert_eq!(
            result.days[0].clock_in,
            Some(datetime!(2025 - 07 - 08 09:10:00))
        );
        assert_eq!(result.days[0].is_late, Some(true));
        assert_eq!(
            result.warnings,
            vec![ReconcileWarning::DuplicatePunch {
                date: date!(2025 - 07 - 08),
                kind: PunchKind::ClockIn,
                discarded: 1,
            }]
        );
    }

    #[test]
    fn test_days_ordered_ascending_and_idempotent() {
        let shifts = vec![
            shift_on(
                date!(2025 - 07 - 15),
                datetime!(2025 - 07 - 15 09:00:00),
                datetime!(2025 - 07 - 15 17:00:00),
                60,
            ),
            shift_on(
                date!(2025 - 07 - 03),
                datetime!(2025 - 07 - 03 09:00:00),
                datetime!(2025 - 07 - 03 17:00:00),
                60,
            ),
        ];
        let events = vec![punch(
            date!(2025 - 07 - 09),
            PunchKind::ClockIn,
            datetime!(2025 - 07 - 09 09:00:00),
        )];
        let now = datetime!(2025 - 07 - 20 12:00:00);

        let first = reconcile(&shifts, &events, now);
        let second = reconcile(&shifts, &events, now);

        let dates: Vec<Date> = first.days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2025 - 07 - 03),
                date!(2025 - 07 - 09),
                date!(2025 - 07 - 15)
            ]
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0:00");
        assert_eq!(format_minutes(59), "0:59");
        assert_eq!(format_minutes(480), "8:00");
        assert_eq!(format_minutes(605), "10:05");
    }
}
