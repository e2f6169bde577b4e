use chrono::NaiveDate;

use crate::models::Provider;

/// Conversation fields a filter can test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Provider,
    /// Case-insensitive substring of the display title
    Title,
    /// Conversations created on or after a date (UTC)
    Since,
    Favorite,
}

impl FilterField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Title => "title",
            Self::Since => "since",
            Self::Favorite => "favorite",
        }
    }
}

/// One validated `field:value` test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCondition {
    Provider(Provider),
    /// Stored lowercased
    Title(String),
    Since(NaiveDate),
    Favorite(bool),
}

impl FilterCondition {
    pub fn field(&self) -> FilterField {
        match self {
            Self::Provider(_) => FilterField::Provider,
            Self::Title(_) => FilterField::Title,
            Self::Since(_) => FilterField::Since,
            Self::Favorite(_) => FilterField::Favorite,
        }
    }
}

/// Logical operators for combining filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Both conditions must match (default between different fields)
    And,
    /// Either condition matches (default within same field)
    Or,
}

/// Flat filter expression evaluated left to right
///
/// No parentheses:
/// - Same-field conditions are OR'd together: provider:chatgpt provider:claude
/// - Cross-field conditions are AND'd together: provider:claude favorite:true
/// - Explicit operators override defaults
///
/// `operators[i]` joins `conditions[i]` and `conditions[i + 1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpr {
    pub conditions: Vec<FilterCondition>,
    pub operators: Vec<FilterOperator>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operator: Option<FilterOperator>, condition: FilterCondition) {
        if let Some(operator) = operator {
            self.operators.push(operator);
        }
        self.conditions.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
