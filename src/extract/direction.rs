//! Income vs. expense detection

use crate::models::Direction;
use crate::rules::RuleTable;

/// First matching income marker decides; expenses are the default.
pub fn detect_direction(text: &str, markers: &RuleTable<Direction>) -> Direction {
    markers
        .first_match(text)
        .map(|rule| rule.outcome)
        .unwrap_or(Direction::Expense)
}
