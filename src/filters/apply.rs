use chrono::NaiveTime;

use super::ast::{FilterCondition, FilterExpr, FilterOperator};
use crate::models::ConversationRecord;

/// Keep the conversations matching `filter`, preserving order.
///
/// Filter logic:
/// - Same-field OR: provider:chatgpt provider:claude → (chatgpt OR claude)
/// - Cross-field AND: provider:claude favorite:true → (claude AND favorite)
/// - Explicit operators override defaults
///
/// Conditions are evaluated left to right with no precedence between AND and OR.
pub fn apply_filters<'a, I>(conversations: I, filter: &FilterExpr) -> Vec<&'a ConversationRecord>
where
    I: IntoIterator<Item = &'a ConversationRecord>,
{
    conversations.into_iter().filter(|conversation| matches_filter(conversation, filter)).collect()
}

/// Evaluate the whole expression against one conversation. Empty matches everything.
pub fn matches_filter(conversation: &ConversationRecord, filter: &FilterExpr) -> bool {
    let Some((first, rest)) = filter.conditions.split_first() else {
        return true;
    };

    filter.operators.iter().zip(rest).fold(
        matches_condition(conversation, first),
        |result, (operator, condition)| match operator {
            FilterOperator::And => result && matches_condition(conversation, condition),
            FilterOperator::Or => result || matches_condition(conversation, condition),
        },
    )
}

fn matches_condition(conversation: &ConversationRecord, condition: &FilterCondition) -> bool {
    match condition {
        FilterCondition::Provider(provider) => conversation.provider == *provider,
        FilterCondition::Title(needle) => {
            conversation.display_title().to_lowercase().contains(needle.as_str())
        }
        FilterCondition::Since(date) => {
            conversation.created_at >= date.and_time(NaiveTime::MIN).and_utc()
        }
        FilterCondition::Favorite(wanted) => conversation.is_favorite == *wanted,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::filters::parse_filter;
    use crate::models::Provider;

    fn conversation(provider: Provider, title: &str, day: u32, favorite: bool) -> ConversationRecord {
        let created = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        ConversationRecord {
            provider,
            external_id: format!("{}-{}", provider, day),
            title: title.to_string(),
            created_at: created,
            updated_at: created,
            messages: Vec::new(),
            group: "March".to_string(),
            is_favorite: favorite,
        }
    }

    fn sample() -> Vec<ConversationRecord> {
        vec![
            conversation(Provider::ChatGpt, "Trip Plan", 1, false),
            conversation(Provider::Claude, "Rust lifetimes", 10, true),
            conversation(Provider::Claude, "", 20, false),
        ]
    }

    fn titles(conversations: &[ConversationRecord], query: &str) -> Vec<String> {
        let filter = parse_filter(query).unwrap();
        apply_filters(conversations, &filter)
            .into_iter()
            .map(|c| c.display_title().to_string())
            .collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        assert_eq!(titles(&sample(), "").len(), 3);
    }

    #[test]
    fn test_provider_and_favorite() {
        let data = sample();
        assert_eq!(titles(&data, "provider:chatgpt"), vec!["Trip Plan"]);
        assert_eq!(titles(&data, "provider:claude favorite:true"), vec!["Rust lifetimes"]);
        assert_eq!(titles(&data, "favorite:false").len(), 2);
    }

    #[test]
    fn test_title_substring_case_insensitive() {
        let data = sample();
        assert_eq!(titles(&data, "title:\"trip PLAN\""), vec!["Trip Plan"]);
        assert_eq!(titles(&data, "title:untitled"), vec!["[Untitled]"]);
    }

    #[test]
    fn test_since_is_inclusive_from_midnight() {
        let data = sample();
        assert_eq!(titles(&data, "since:2024-03-10").len(), 2);
        assert_eq!(titles(&data, "since:2024-03-21").len(), 0);
    }

    #[test]
    fn test_same_field_or_and_explicit_operators() {
        let data = sample();
        assert_eq!(titles(&data, "title:trip title:rust").len(), 2);
        assert_eq!(titles(&data, "title:trip AND title:rust").len(), 0);
        assert_eq!(titles(&data, "favorite:true OR provider:chatgpt").len(), 2);
    }

    #[test]
    fn test_left_to_right_evaluation() {
        // (chatgpt OR claude) AND favorite
        let data = sample();
        assert_eq!(
            titles(&data, "provider:chatgpt provider:claude favorite:true"),
            vec!["Rust lifetimes"]
        );
    }
}
