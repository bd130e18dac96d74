//! Keyword tables driving the phrase interpreter.
//!
//! Every rule is an ordered `(pattern, effect)` pair. The interpreter walks
//! each table top to bottom and applies the first rule that matches, so
//! adding a rule never requires touching control flow.

use chrono::Weekday;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;
use crate::task::{Category, Priority};

/// Optional word introducing a date phrase ("on Friday", "by tomorrow").
/// Only used so title cleanup removes the connector together with the date.
const CONNECTOR: &str = r"(?:\b(?:on|by|before|until|for|this|next)\s+)?";

static ENGLISH: LazyLock<RuleSet> = LazyLock::new(RuleSet::build_english);

/// How a matched date phrase moves the due date relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShift {
    /// Fixed number of days ahead.
    Days(i64),
    /// Number of days taken from the first capture group ("in 3 days").
    CapturedDays,
    /// Next future occurrence of a weekday, 1..=7 days ahead.
    NextWeekday(Weekday),
}

#[derive(Debug, Clone)]
pub struct DateRule {
    pub pattern: Regex,
    pub shift: DateShift,
}

/// A keyword set mapped to an effect (a category or a priority).
#[derive(Debug, Clone)]
pub struct KeywordRule<T> {
    pub effect: T,
    fragments: Vec<String>,
    pattern: Regex,
}

impl<T> KeywordRule<T> {
    /// Build from regex fragments; each fragment is one keyword alternative.
    pub fn new(effect: T, fragments: &[&str]) -> Result<Self, regex::Error> {
        let fragments: Vec<String> = fragments.iter().map(|f| f.to_string()).collect();
        let pattern = compile_keywords(&fragments)?;
        Ok(Self {
            effect,
            fragments,
            pattern,
        })
    }

    /// Append plain-text keywords (escaped, whitespace-tolerant).
    pub fn extend_plain<S: AsRef<str>>(&mut self, words: &[S]) -> Result<(), regex::Error> {
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() {
                continue;
            }
            let fragment = word
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            self.fragments.push(fragment);
        }
        self.pattern = compile_keywords(&self.fragments)?;
        Ok(())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

fn compile_keywords(fragments: &[String]) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)\b(?:{})\b", fragments.join("|")))
}

/// The complete, ordered rule set used by [`TaskParser`](super::TaskParser).
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub dates: Vec<DateRule>,
    /// `(at|by|before) H[:MM] [am|pm]`; groups: hour, minute, meridiem.
    pub time: Regex,
    pub categories: Vec<KeywordRule<Category>>,
    pub priorities: Vec<KeywordRule<Priority>>,
}

impl RuleSet {
    /// The built-in English rule set.
    pub fn english() -> Self {
        ENGLISH.clone()
    }

    fn build_english() -> Self {
        let date = |body: &str, shift: DateShift| DateRule {
            pattern: Regex::new(&format!(r"(?i){CONNECTOR}\b{body}\b"))
                .expect("built-in date pattern"),
            shift,
        };
        let mut dates = vec![
            date(r"(?:the\s+)?day\s+after\s+tomorrow", DateShift::Days(2)),
            date(r"(?:today|tonight)", DateShift::Days(0)),
            date(r"tomorrow", DateShift::Days(1)),
            date(r"next\s+week", DateShift::Days(7)),
            DateRule {
                pattern: Regex::new(r"(?i)\bin\s+(\d{1,3})\s+days?\b")
                    .expect("built-in date pattern"),
                shift: DateShift::CapturedDays,
            },
        ];
        for (name, weekday) in [
            ("monday", Weekday::Mon),
            ("tuesday", Weekday::Tue),
            ("wednesday", Weekday::Wed),
            ("thursday", Weekday::Thu),
            ("friday", Weekday::Fri),
            ("saturday", Weekday::Sat),
            ("sunday", Weekday::Sun),
        ] {
            dates.push(date(name, DateShift::NextWeekday(weekday)));
        }

        let time = Regex::new(r"(?i)\b(?:at|by|before)\s*(\d{1,2})(?::?(\d{2}))?\s*(am|pm)?\b")
            .expect("built-in time pattern");

        let category_table: [(Category, Vec<&str>); 8] = [
            (
                Category::Work,
                vec![
                    "work", "job", r"meetings?", r"projects?", r"deadlines?", "office",
                    r"reports?", r"presentations?", r"clients?", r"emails?", "boss",
                    r"colleagues?", "standup",
                ],
            ),
            (
                Category::Health,
                vec![
                    "gym", r"exercis(?:e|es|ing)", r"workouts?", "health", r"doctors?",
                    "dentist", "medical", r"medicines?", "yoga", r"meditat(?:e|ion)",
                ],
            ),
            (
                Category::Learning,
                vec![
                    r"learn(?:ing)?", r"stud(?:y|ying)", r"courses?", r"read(?:ing)?", "books",
                    r"chapters?", r"tutorials?", r"lectures?", "homework", r"class(?:es)?",
                ],
            ),
            (
                Category::Shopping,
                vec![
                    r"buy(?:ing)?", r"shop(?:ping)?", r"grocer(?:y|ies)", "store", "purchase",
                ],
            ),
            (
                Category::Social,
                vec![
                    r"friends?", "family", "call", "visit", "social", r"part(?:y|ies)",
                    "birthday", "mom", "dad",
                ],
            ),
            (
                Category::Personal,
                vec![
                    "personal", "home", r"clean(?:ing)?", r"organi[sz]e", "laundry", r"chores?",
                ],
            ),
            (
                Category::Travel,
                vec![
                    "travel", r"trips?", r"flights?", r"hotels?", "vacation", "airport",
                    "passport", r"pack(?:ing)?",
                ],
            ),
            (
                Category::Finance,
                vec![
                    "pay", r"bills?", "bank", "budget", r"tax(?:es)?", r"invoices?", "rent",
                    "finance", "insurance",
                ],
            ),
        ];

        let priority_table: [(Priority, Vec<&str>); 4] = [
            (
                Priority::URGENT,
                vec![
                    r"urgent(?:ly)?", "asap", "immediately", "critical", "emergency", "now",
                    "rush",
                ],
            ),
            (
                Priority::HIGH,
                vec!["important", r"high\s+priority", r"must\s+do", "deadline", "due"],
            ),
            (
                Priority::MINIMAL,
                vec![
                    r"when\s+i\s+have\s+time", "someday", "maybe", "eventually",
                    r"low\s+priority",
                ],
            ),
            (
                Priority::LOW,
                vec![r"quick(?:ly)?", "easy", "simple", "minor"],
            ),
        ];

        Self {
            dates,
            time,
            categories: category_table
                .into_iter()
                .map(|(c, k)| KeywordRule::new(c, &k).expect("built-in category pattern"))
                .collect(),
            priorities: priority_table
                .into_iter()
                .map(|(p, k)| KeywordRule::new(p, &k).expect("built-in priority pattern"))
                .collect(),
        }
    }

    /// Append user keywords to a category's set. `General` has no keyword
    /// set and cannot be extended.
    pub fn extend_category<S: AsRef<str>>(
        &mut self,
        category: Category,
        words: &[S],
    ) -> Result<(), ValidationError> {
        let rule = self
            .categories
            .iter_mut()
            .find(|r| r.effect == category)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "parser.extra_keywords".into(),
                message: format!("category {category} has no keyword set"),
            })?;
        rule.extend_plain(words)
            .map_err(|e| ValidationError::InvalidValue {
                field: "parser.extra_keywords".into(),
                message: e.to_string(),
            })
    }

    /// First category whose keyword set matches.
    pub fn category_for(&self, text: &str) -> Option<Category> {
        self.categories
            .iter()
            .find(|rule| rule.is_match(text))
            .map(|rule| rule.effect)
    }

    /// First priority whose keyword set matches.
    pub fn priority_for(&self, text: &str) -> Option<Priority> {
        self.priorities
            .iter()
            .find(|rule| rule.is_match(text))
            .map(|rule| rule.effect)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_match_on_word_boundaries() {
        let rules = RuleSet::english();
        assert_eq!(rules.category_for("Finish the report"), Some(Category::Work));
        assert_eq!(rules.category_for("go to the gym"), Some(Category::Health));
        // "already" must not be read as "read"; "workout" must not be "work".
        assert_eq!(rules.category_for("already done"), None);
        assert_eq!(rules.category_for("morning workout"), Some(Category::Health));
    }

    #[test]
    fn first_category_in_table_order_wins() {
        let rules = RuleSet::english();
        // Matches both Work ("meeting") and Social ("call").
        assert_eq!(rules.category_for("call before meeting"), Some(Category::Work));
    }

    #[test]
    fn priority_table_order() {
        let rules = RuleSet::english();
        assert_eq!(rules.priority_for("URGENT and important"), Some(Priority::URGENT));
        assert_eq!(rules.priority_for("important but quick"), Some(Priority::HIGH));
        assert_eq!(rules.priority_for("maybe when I have time"), Some(Priority::MINIMAL));
        assert_eq!(rules.priority_for("a quick fix"), Some(Priority::LOW));
        assert_eq!(rules.priority_for("nothing special"), None);
        assert_eq!(rules.priority_for("I know the snow"), None);
    }

    #[test]
    fn extend_category_escapes_user_words() {
        let mut rules = RuleSet::english();
        rules
            .extend_category(Category::Work, &["sprint review", "c++"])
            .unwrap();
        assert_eq!(rules.category_for("prep the Sprint  Review"), Some(Category::Work));
        assert!(rules.extend_category(Category::General, &["misc"]).is_err());
    }

    #[test]
    fn date_rules_put_day_after_tomorrow_first() {
        let rules = RuleSet::english();
        let first = rules
            .dates
            .iter()
            .find(|r| r.pattern.is_match("the day after tomorrow"))
            .unwrap();
        assert_eq!(first.shift, DateShift::Days(2));
    }
}
