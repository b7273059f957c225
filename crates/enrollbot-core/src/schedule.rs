//! Countdown scheduling.
//!
//! Derives the next concrete occurrence of a configured lesson, the
//! instant its enrollment window opens, and blocks until that instant
//! using a tiered polling interval: coarse sleeps far out, a single
//! exact sleep inside the last minute. Pure time arithmetic plus
//! suspension -- no browser or network interaction, no error states.

use chrono::{Datelike, Days, Duration as ChronoDuration, NaiveDateTime, NaiveTime, Weekday};
use std::time::Duration;
use tracing::info;

use crate::clock::Clock;

/// One recurring lesson, as configured. Immutable for the run's duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSpec {
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub facility: String,
    pub description: Option<String>,
    /// Listing page the lesson is booked from.
    pub schedule_url: String,
}

/// The window for one concrete occurrence of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    /// When the lesson itself takes place.
    pub lesson_at: NaiveDateTime,
    /// When enrollment opens: `lesson_at` minus the configured offset.
    pub opens_at: NaiveDateTime,
}

impl ScheduleWindow {
    /// Compute the window for the next occurrence of `spec` as seen from
    /// `now`. The weekday search starts at today's date (today is a
    /// candidate even if the time of day has already passed) and advances
    /// day by day, so the chosen date is never earlier than today.
    pub fn for_lesson(spec: &LessonSpec, offset: ChronoDuration, now: NaiveDateTime) -> Self {
        let mut date = now.date();
        while date.weekday() != spec.weekday {
            date = date + Days::new(1);
        }
        let lesson_at = date.and_time(spec.start_time);
        Self {
            lesson_at,
            opens_at: lesson_at - offset,
        }
    }
}

const MINUTE_SECS: i64 = 60;
const HOUR_SECS: i64 = 3600;

/// Sleep tier for a remaining countdown duration.
///
/// Upper bounds are exclusive: exactly one hour remaining already drops
/// to the 5-minute tier. Inside the last minute the remaining duration
/// itself is slept, rounded up to whole seconds.
pub fn sleep_tier(remaining: ChronoDuration) -> Duration {
    let secs = remaining.num_seconds();
    if secs > HOUR_SECS {
        Duration::from_secs(HOUR_SECS as u64)
    } else if secs > 5 * MINUTE_SECS {
        Duration::from_secs(5 * MINUTE_SECS as u64)
    } else if secs > MINUTE_SECS {
        Duration::from_secs(MINUTE_SECS as u64)
    } else {
        let ceil_secs = (remaining.num_milliseconds() + 999).div_euclid(1000);
        Duration::from_secs(ceil_secs.max(0) as u64)
    }
}

/// Block until `window.opens_at`.
///
/// Re-evaluates the remaining duration after every wake rather than
/// trusting the previous sleep to have been exact, and logs the remaining
/// time before each sleep. Returns immediately if the window is already
/// open; the final sub-minute sleep ends the wait without re-checking.
pub fn wait_until_open<C: Clock>(window: &ScheduleWindow, clock: &C) {
    loop {
        let remaining = window.opens_at - clock.now();
        if remaining <= ChronoDuration::zero() {
            info!("enrollment window is open");
            return;
        }
        info!(
            opens_at = %window.opens_at,
            "time till enrollment opens: {}",
            format_remaining(remaining)
        );
        clock.sleep(sleep_tier(remaining));
        if remaining.num_seconds() <= MINUTE_SECS {
            return;
        }
    }
}

fn format_remaining(remaining: ChronoDuration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::cell::RefCell;

    const WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    fn spec(weekday: Weekday, time: &str) -> LessonSpec {
        LessonSpec {
            weekday,
            start_time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            facility: "Gym A".into(),
            description: None,
            schedule_url: "https://example.org/schedule".into(),
        }
    }

    fn at(y: i32, m: u32, d: u32, time: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::parse_from_str(time, "%H:%M").unwrap())
    }

    /// Deterministic clock: `sleep` advances `now` by the slept amount
    /// and records every nap.
    struct MockClock {
        now: RefCell<NaiveDateTime>,
        naps: RefCell<Vec<Duration>>,
    }

    impl MockClock {
        fn starting_at(now: NaiveDateTime) -> Self {
            Self {
                now: RefCell::new(now),
                naps: RefCell::new(Vec::new()),
            }
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> NaiveDateTime {
            *self.now.borrow()
        }

        fn sleep(&self, duration: Duration) {
            self.naps.borrow_mut().push(duration);
            let mut now = self.now.borrow_mut();
            *now = *now + ChronoDuration::from_std(duration).unwrap();
        }
    }

    #[test]
    fn window_monday_to_wednesday_with_24h_offset() {
        // 2024-01-01 was a Monday.
        let now = at(2024, 1, 1, "10:00");
        let window =
            ScheduleWindow::for_lesson(&spec(Weekday::Wed, "18:00"), ChronoDuration::hours(24), now);
        assert_eq!(window.lesson_at, at(2024, 1, 3, "18:00"));
        assert_eq!(window.opens_at, at(2024, 1, 2, "18:00"));
    }

    #[test]
    fn window_today_is_a_candidate() {
        let now = at(2024, 1, 1, "10:00");
        let window =
            ScheduleWindow::for_lesson(&spec(Weekday::Mon, "18:00"), ChronoDuration::zero(), now);
        assert_eq!(window.lesson_at, at(2024, 1, 1, "18:00"));
        assert_eq!(window.opens_at, window.lesson_at);
    }

    #[test]
    fn window_today_even_if_time_already_passed() {
        // The weekday search is date-only: a Monday 18:00 lesson seen from
        // Monday 19:00 still resolves to today. A retried run after
        // midnight picks the following week instead.
        let now = at(2024, 1, 1, "19:00");
        let window =
            ScheduleWindow::for_lesson(&spec(Weekday::Mon, "18:00"), ChronoDuration::zero(), now);
        assert_eq!(window.lesson_at, at(2024, 1, 1, "18:00"));
    }

    #[test]
    fn tier_selection() {
        assert_eq!(sleep_tier(ChronoDuration::hours(2)), Duration::from_secs(3600));
        assert_eq!(sleep_tier(ChronoDuration::minutes(10)), Duration::from_secs(300));
        assert_eq!(sleep_tier(ChronoDuration::minutes(2)), Duration::from_secs(60));
        assert_eq!(sleep_tier(ChronoDuration::seconds(10)), Duration::from_secs(10));
    }

    #[test]
    fn tier_boundaries_pick_the_lower_tier() {
        assert_eq!(sleep_tier(ChronoDuration::hours(1)), Duration::from_secs(300));
        assert_eq!(sleep_tier(ChronoDuration::minutes(5)), Duration::from_secs(60));
        assert_eq!(sleep_tier(ChronoDuration::minutes(1)), Duration::from_secs(60));
    }

    #[test]
    fn final_tier_rounds_up_to_whole_seconds() {
        assert_eq!(
            sleep_tier(ChronoDuration::milliseconds(1500)),
            Duration::from_secs(2)
        );
        assert_eq!(sleep_tier(ChronoDuration::zero()), Duration::from_secs(0));
    }

    #[test]
    fn wait_exits_immediately_when_already_open() {
        let now = at(2024, 1, 1, "10:00");
        let clock = MockClock::starting_at(now);
        let window = ScheduleWindow {
            lesson_at: at(2024, 1, 1, "09:00"),
            opens_at: at(2024, 1, 1, "09:00"),
        };
        wait_until_open(&window, &clock);
        assert!(clock.naps.borrow().is_empty());
    }

    #[test]
    fn wait_32_hours_uses_tiered_sleeps() {
        // Monday 10:00, lesson Wednesday 18:00, offset 24h: opens Tuesday
        // 18:00, 32 hours out.
        let now = at(2024, 1, 1, "10:00");
        let clock = MockClock::starting_at(now);
        let window =
            ScheduleWindow::for_lesson(&spec(Weekday::Wed, "18:00"), ChronoDuration::hours(24), now);
        wait_until_open(&window, &clock);

        let naps = clock.naps.borrow();
        let hour_naps = naps.iter().filter(|n| **n == Duration::from_secs(3600)).count();
        let five_min_naps = naps.iter().filter(|n| **n == Duration::from_secs(300)).count();
        let minute_naps = naps.iter().filter(|n| **n == Duration::from_secs(60)).count();
        assert_eq!(hour_naps, 31);
        assert_eq!(five_min_naps, 11);
        // Four 1-minute tier naps plus the exact final sleep of 60s.
        assert_eq!(minute_naps, 5);
        assert_eq!(naps.len(), 47);

        let total: Duration = naps.iter().sum();
        assert_eq!(total, Duration::from_secs(32 * 3600));
        assert_eq!(clock.now(), window.opens_at);
    }

    proptest! {
        #[test]
        fn next_occurrence_is_today_or_later_and_matches_weekday(
            weekday_idx in 0usize..7,
            day_offset in 0u64..4000,
            secs_of_day in 0u32..86_400,
        ) {
            let weekday = WEEKDAYS[weekday_idx];
            let now = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                .checked_add_days(Days::new(day_offset)).unwrap()
                .and_time(NaiveTime::from_num_seconds_from_midnight_opt(secs_of_day, 0).unwrap());
            let window = ScheduleWindow::for_lesson(
                &spec(weekday, "18:00"),
                ChronoDuration::hours(24),
                now,
            );
            prop_assert_eq!(window.lesson_at.weekday(), weekday);
            prop_assert!(window.lesson_at.date() >= now.date());
            prop_assert!((window.lesson_at.date() - now.date()).num_days() < 7);
        }

        #[test]
        fn opens_at_is_exactly_lesson_minus_offset(offset_mins in 0i64..10_000) {
            let now = at(2024, 1, 1, "10:00");
            let offset = ChronoDuration::minutes(offset_mins);
            let window = ScheduleWindow::for_lesson(&spec(Weekday::Fri, "12:30"), offset, now);
            prop_assert_eq!(window.opens_at, window.lesson_at - offset);
            prop_assert!(window.opens_at <= window.lesson_at);
        }
    }
}
