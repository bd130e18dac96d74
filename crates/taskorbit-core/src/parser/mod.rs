//! Task phrase interpreter.
//!
//! Turns one line of free text ("Urgent: finish report by 5pm today") into a
//! [`ParsedTask`]. Interpretation is a fixed sequence of passes over the
//! input, each driven by a [`RuleSet`] table:
//!
//! 1. date phrase (first rule in table order wins)
//! 2. time of day, only when a date was found
//! 3. category keywords
//! 4. priority keywords, then escalation by due-date proximity
//! 5. title cleanup
//!
//! The interpreter never reads the system clock; relative phrases are
//! resolved against the `now` passed by the caller, on the calendar of
//! `now`'s time zone.

mod rules;
mod temporal;

pub use rules::{DateRule, DateShift, KeywordRule, RuleSet};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{ParseError, ValidationError};
use crate::storage::ParserConfig;
use crate::task::{Category, Priority};

/// Whitespace left in front of punctuation once a phrase is removed.
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:!?])").expect("built-in pattern"));

/// Upper bound on cleanup passes; each pass only ever shortens the text.
const MAX_CLEANUP_PASSES: usize = 8;

/// Structured result of interpreting one phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTask {
    pub title: String,
    pub due_date: Option<DateTime<FixedOffset>>,
    pub category: Category,
    pub priority: Priority,
}

/// Phrase interpreter over an ordered rule set.
#[derive(Debug, Clone)]
pub struct TaskParser {
    rules: RuleSet,
    default_priority: Priority,
    escalate_by_due_date: bool,
}

impl Default for TaskParser {
    fn default() -> Self {
        Self::new(RuleSet::english())
    }
}

impl TaskParser {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            default_priority: Priority::NORMAL,
            escalate_by_due_date: true,
        }
    }

    /// Build the English interpreter with user configuration applied.
    pub fn from_config(config: &ParserConfig) -> Result<Self, ValidationError> {
        let mut rules = RuleSet::english();
        for (name, words) in &config.extra_keywords {
            let category: Category = name.parse()?;
            rules.extend_category(category, words)?;
        }
        Ok(Self {
            rules,
            default_priority: Priority::new(config.default_priority)?,
            escalate_by_due_date: config.escalate_by_due_date,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Interpret `input` relative to `now`.
    ///
    /// Day shifts follow `now`'s zone, so pass a zone-aware `now` (for
    /// example `Local::now()`) to keep due times right across DST changes.
    ///
    /// # Errors
    /// Returns [`ParseError::EmptyInput`] when `input` is blank. Any other
    /// input yields a best-effort result.
    pub fn parse<Tz: TimeZone>(
        &self,
        input: &str,
        now: DateTime<Tz>,
    ) -> Result<ParsedTask, ParseError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let due_date = self.resolve_due_date(text, &now);
        let category = self.rules.category_for(text).unwrap_or_default();
        let priority = self.resolve_priority(text, due_date, now.fixed_offset());

        let mut title = self.clean_title(text);
        if title.is_empty() {
            title = collapse_whitespace(text);
        }

        debug!(
            input = text,
            %title,
            due = ?due_date,
            %category,
            %priority,
            "interpreted task phrase"
        );

        Ok(ParsedTask {
            title,
            due_date,
            category,
            priority,
        })
    }

    /// Strip date, time and urgency phrases from `text`.
    ///
    /// Time phrases are only stripped when a date phrase is present, since a
    /// lone time is not interpreted. Runs to a fixed point, so applying it to
    /// its own output changes nothing.
    pub fn clean_title(&self, text: &str) -> String {
        let mut current = tidy(text);
        for _ in 0..MAX_CLEANUP_PASSES {
            let next = tidy(&self.strip_once(&current));
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn strip_once(&self, text: &str) -> String {
        let has_date = self.rules.dates.iter().any(|r| r.pattern.is_match(text));
        let mut out = text.to_string();
        if has_date {
            for rule in &self.rules.dates {
                out = rule.pattern.replace_all(&out, " ").into_owned();
            }
            // Only the phrase that set the due time; "at 31" stays.
            if let Some((range, _)) = self.first_clock_time(&out) {
                out.replace_range(range, " ");
            }
        }
        for rule in &self.rules.priorities {
            out = rule.pattern().replace_all(&out, " ").into_owned();
        }
        out
    }

    /// First time phrase in `text` that reads as a real clock time.
    fn first_clock_time(&self, text: &str) -> Option<(Range<usize>, NaiveTime)> {
        self.rules.time.captures_iter(text).find_map(|caps| {
            let hour = caps.get(1)?.as_str().parse().ok()?;
            let minute = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
            let time = temporal::clock_time(hour, minute, caps.get(3).map(|m| m.as_str()))?;
            Some((caps.get(0)?.range(), time))
        })
    }

    fn resolve_due_date<Tz: TimeZone>(
        &self,
        text: &str,
        now: &DateTime<Tz>,
    ) -> Option<DateTime<FixedOffset>> {
        let days = self.rules.dates.iter().find_map(|rule| {
            let caps = rule.pattern.captures(text)?;
            match rule.shift {
                DateShift::Days(n) => Some(n),
                DateShift::CapturedDays => caps.get(1)?.as_str().parse::<i64>().ok(),
                DateShift::NextWeekday(target) => {
                    Some(temporal::days_until(now.weekday(), target))
                }
            }
        })?;
        let time = self.first_clock_time(text).map(|(_, time)| time);
        temporal::local_due(now, days, time)
    }

    fn resolve_priority(
        &self,
        text: &str,
        due_date: Option<DateTime<FixedOffset>>,
        now: DateTime<FixedOffset>,
    ) -> Priority {
        let keyword = self.rules.priority_for(text).unwrap_or(self.default_priority);
        if !self.escalate_by_due_date {
            return keyword;
        }
        match due_date.map(|due| due.signed_duration_since(now)) {
            Some(until) if until <= Duration::days(1) => keyword.max(Priority::HIGH),
            Some(until) if until <= Duration::days(3) => keyword.max(Priority::NORMAL),
            _ => keyword,
        }
    }
}

/// Interpret `input` with the built-in English rules.
pub fn parse_task<Tz: TimeZone>(input: &str, now: DateTime<Tz>) -> Result<ParsedTask, ParseError> {
    TaskParser::default().parse(input, now)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tidy(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let joined = SPACE_BEFORE_PUNCT.replace_all(&collapsed, "$1");
    joined
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '!' | '.'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Weekday};

    /// US Eastern time for 2024: DST from 2024-03-10 07:00 UTC until
    /// 2024-11-03 06:00 UTC.
    #[derive(Debug, Clone, Copy)]
    struct Eastern2024;

    impl Eastern2024 {
        fn est() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }

        fn edt() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }
    }

    impl TimeZone for Eastern2024 {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            Eastern2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            // Earlier instant first, as chrono orders ambiguous results.
            let fits: Vec<FixedOffset> = [Self::edt(), Self::est()]
                .into_iter()
                .filter(|offset| {
                    let utc = *local - Duration::seconds(offset.local_minus_utc().into());
                    self.offset_from_utc_datetime(&utc) == *offset
                })
                .collect();
            match fits.as_slice() {
                [] => LocalResult::None,
                [one] => LocalResult::Single(*one),
                [earlier, later, ..] => LocalResult::Ambiguous(*earlier, *later),
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(12, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let starts = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(7, 0, 0).unwrap();
            let ends = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap().and_hms_opt(6, 0, 0).unwrap();
            if (starts..ends).contains(utc) {
                Self::edt()
            } else {
                Self::est()
            }
        }
    }

    /// Friday 2024-03-08 09:30 UTC.
    fn friday_morning() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 8, 9, 30, 0)
            .unwrap()
    }

    #[test]
    fn urgent_report_today_at_five() {
        let now = friday_morning();
        let task = parse_task("Urgent: Finish report by 5pm today", now).unwrap();
        assert_eq!(task.priority, Priority::URGENT);
        assert_eq!(task.category, Category::Work);
        let due = task.due_date.unwrap();
        assert_eq!(due.date_naive(), now.date_naive());
        assert_eq!((due.hour(), due.minute()), (17, 0));
        assert_eq!(task.title, "Finish report");
        let lower = task.title.to_lowercase();
        assert!(!lower.contains("urgent"));
        assert!(!lower.contains("by 5pm"));
        assert!(!lower.contains("today"));
    }

    #[test]
    fn weekend_is_not_a_date_phrase() {
        let task = parse_task("Buy groceries this weekend", friday_morning()).unwrap();
        assert_eq!(task.due_date, None);
        assert_eq!(task.category, Category::Shopping);
        assert_eq!(task.priority, Priority::NORMAL);
        assert_eq!(task.title, "Buy groceries this weekend");
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(parse_task("   \t ", friday_morning()), Err(ParseError::EmptyInput));
        assert_eq!(parse_task("", friday_morning()), Err(ParseError::EmptyInput));
    }

    #[test]
    fn unmatched_input_falls_back_to_defaults() {
        let task = parse_task("  water   the plants ", friday_morning()).unwrap();
        assert_eq!(task.title, "water the plants");
        assert_eq!(task.category, Category::General);
        assert_eq!(task.priority, Priority::NORMAL);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn fully_stripped_input_keeps_a_title() {
        let task = parse_task("urgent tomorrow", friday_morning()).unwrap();
        assert_eq!(task.title, "urgent tomorrow");
        assert_eq!(task.priority, Priority::URGENT);
        assert!(task.due_date.is_some());
    }

    #[test]
    fn day_after_tomorrow_beats_tomorrow() {
        let now = friday_morning();
        let task = parse_task("Dentist the day after tomorrow", now).unwrap();
        assert_eq!(task.due_date, Some(now + Duration::days(2)));
        assert_eq!(task.title, "Dentist");
        assert_eq!(task.category, Category::Health);
    }

    #[test]
    fn in_n_days_uses_captured_count() {
        let now = friday_morning();
        let task = parse_task("Renew passport in 10 days", now).unwrap();
        assert_eq!(task.due_date, Some(now + Duration::days(10)));
        assert_eq!(task.category, Category::Travel);
        assert_eq!(task.title, "Renew passport");
    }

    #[test]
    fn weekday_resolves_to_next_occurrence() {
        let now = friday_morning();
        let task = parse_task("Call mom next Tuesday", now).unwrap();
        let due = task.due_date.unwrap();
        assert_eq!(due.weekday(), Weekday::Tue);
        assert_eq!(due - now, Duration::days(4));
        assert_eq!(task.title, "Call mom");
        assert_eq!(task.category, Category::Social);

        let same_day = parse_task("Team sync on Friday", now).unwrap();
        assert_eq!(same_day.due_date, Some(now + Duration::days(7)));
        assert_eq!(same_day.title, "Team sync");
    }

    #[test]
    fn first_date_rule_wins() {
        let now = friday_morning();
        let task = parse_task("Pay rent tomorrow or next week", now).unwrap();
        assert_eq!(task.due_date, Some(now + Duration::days(1)));
        assert_eq!(task.title, "Pay rent or");
        assert_eq!(task.category, Category::Finance);
    }

    #[test]
    fn time_without_date_is_ignored_and_kept() {
        let task = parse_task("Standup at 10am", friday_morning()).unwrap();
        assert_eq!(task.due_date, None);
        assert_eq!(task.title, "Standup at 10am");
    }

    #[test]
    fn time_with_minutes_and_twenty_four_hour_clock() {
        let now = friday_morning();
        let task = parse_task("Gym workout tomorrow at 18:45", now).unwrap();
        let due = task.due_date.unwrap();
        assert_eq!(due.date_naive(), (now + Duration::days(1)).date_naive());
        assert_eq!((due.hour(), due.minute(), due.second()), (18, 45, 0));
        assert_eq!(task.title, "Gym workout");

        let noon = parse_task("Lunch tomorrow at 12 PM", now).unwrap();
        assert_eq!(noon.due_date.unwrap().hour(), 12);
        let midnight = parse_task("Deploy tomorrow at 12am", now).unwrap();
        assert_eq!(midnight.due_date.unwrap().hour(), 0);
    }

    #[test]
    fn invalid_time_leaves_date_and_title_untouched() {
        let now = friday_morning();
        let task = parse_task("Ship it tomorrow at 31", now).unwrap();
        assert_eq!(task.due_date, Some(now + Duration::days(1)));
        assert_eq!(task.title, "Ship it at 31");

        // Only the phrase that was read as the due time is removed.
        let task = parse_task("Move desk to room at 31 tomorrow at 4pm", now).unwrap();
        assert_eq!(task.due_date.unwrap().hour(), 16);
        assert_eq!(task.title, "Move desk to room at 31");
    }

    #[test]
    fn date_without_time_keeps_time_of_day() {
        let now = friday_morning();
        let task = parse_task("Submit hackathon project next week", now).unwrap();
        assert_eq!(task.due_date, Some(now + Duration::days(7)));
        assert_eq!(task.category, Category::Work);
        assert_eq!(task.priority, Priority::NORMAL);
    }

    #[test]
    fn due_time_is_local_across_dst_start() {
        // Saturday before clocks go forward.
        let now = Eastern2024.with_ymd_and_hms(2024, 3, 9, 9, 30, 0).unwrap();

        let task = parse_task("Call dentist tomorrow at 5pm", now).unwrap();
        let due = task.due_date.unwrap();
        assert_eq!(due, Eastern2024.with_ymd_and_hms(2024, 3, 10, 17, 0, 0).unwrap());
        assert_eq!((due.hour(), due.minute()), (17, 0));
        assert_eq!(*due.offset(), Eastern2024::edt());
        assert_eq!(task.title, "Call dentist");

        let task = parse_task("Call dentist tomorrow", now).unwrap();
        let due = task.due_date.unwrap();
        assert_eq!((due.hour(), due.minute()), (9, 30));
        assert_eq!(*due.offset(), Eastern2024::edt());
        assert_eq!(due - now.fixed_offset(), Duration::hours(23));
    }

    #[test]
    fn skipped_wall_time_uses_offset_before_the_gap() {
        let now = Eastern2024.with_ymd_and_hms(2024, 3, 9, 2, 30, 0).unwrap();
        let due = parse_task("Rotate backups tomorrow", now).unwrap().due_date.unwrap();
        assert_eq!((due.hour(), due.minute()), (2, 30));
        assert_eq!(*due.offset(), Eastern2024::est());
        assert_eq!(
            due.naive_utc(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(7, 30, 0).unwrap()
        );
    }

    #[test]
    fn near_due_dates_escalate_priority() {
        let now = friday_morning();
        let tomorrow = parse_task("Water plants tomorrow", now).unwrap();
        assert_eq!(tomorrow.priority, Priority::HIGH);

        let someday_soon = parse_task("Maybe tidy desk in 2 days", now).unwrap();
        assert_eq!(someday_soon.priority, Priority::NORMAL);

        let far = parse_task("Maybe tidy desk in 5 days", now).unwrap();
        assert_eq!(far.priority, Priority::MINIMAL);

        let urgent = parse_task("Rush order tomorrow", now).unwrap();
        assert_eq!(urgent.priority, Priority::URGENT);
    }

    #[test]
    fn escalation_can_be_disabled() {
        let config = ParserConfig {
            escalate_by_due_date: false,
            ..ParserConfig::default()
        };
        let parser = TaskParser::from_config(&config).unwrap();
        let task = parser.parse("Water plants tomorrow", friday_morning()).unwrap();
        assert_eq!(task.priority, Priority::NORMAL);
    }

    #[test]
    fn config_adds_keywords_and_default_priority() {
        let mut config = ParserConfig::default();
        config.default_priority = 2;
        config
            .extra_keywords
            .insert("Finance".into(), vec!["crypto".into()]);
        let parser = TaskParser::from_config(&config).unwrap();
        let task = parser.parse("Check crypto portfolio", friday_morning()).unwrap();
        assert_eq!(task.category, Category::Finance);
        assert_eq!(task.priority, Priority::LOW);
    }

    #[test]
    fn config_rejects_unknown_category_and_bad_priority() {
        let mut config = ParserConfig::default();
        config.extra_keywords.insert("Chores".into(), vec!["dishes".into()]);
        assert!(TaskParser::from_config(&config).is_err());

        let config = ParserConfig {
            default_priority: 7,
            ..ParserConfig::default()
        };
        assert!(TaskParser::from_config(&config).is_err());
    }

    #[test]
    fn cleanup_is_idempotent() {
        let parser = TaskParser::default();
        for input in [
            "Urgent: Finish report by 5pm today",
            "Quick call with Bob tomorrow, then email",
            "next next week week",
            "Read chapter 5 by Friday!",
        ] {
            let once = parser.clean_title(input);
            assert_eq!(parser.clean_title(&once), once, "input: {input}");
        }
        assert_eq!(
            parser.clean_title("Quick call with Bob tomorrow, then email"),
            "call with Bob, then email"
        );
        assert_eq!(parser.clean_title("Read chapter 5 by Friday!"), "Read chapter 5");
    }
}
