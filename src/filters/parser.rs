//! Filter query parser for conversation filtering.
//!
//! Parses user-provided filter expressions into a [`FilterExpr`] of validated conditions.
//!
//! # Syntax
//!
//! ```text
//! filter_expr := field_filter (operator? field_filter)*
//! field_filter := field_name:value | field_name:"quoted value"
//! operator := AND | OR (case-insensitive)
//! field_name := provider | title | since | favorite (case-insensitive)
//! ```
//!
//! # Supported Fields
//!
//! - `provider:chatgpt|claude`
//! - `title:text` - case-insensitive substring of the title (`[Untitled]` when blank)
//! - `since:YYYY-MM-DD` - conversations created on or after the date
//! - `favorite:true|false` (also `yes`/`no`)
//!
//! # Examples
//!
//! ```rust
//! # use chat_history_explorer::filters::parser::parse_filter;
//! // Same field gets implicit OR
//! let expr = parse_filter("provider:chatgpt provider:claude").unwrap();
//!
//! // Different fields get implicit AND
//! let expr = parse_filter("provider:claude favorite:true").unwrap();
//!
//! // Quoted values for spaces, explicit operators
//! let expr = parse_filter("title:\"trip plan\" OR since:2024-06-01").unwrap();
//! ```
//!
//! # Operator Precedence
//!
//! - Implicit operators (no keyword): AND for different fields, OR for same field
//! - Explicit operators (AND/OR keywords): Always respected
//! - Evaluation is strictly left to right

use std::iter::Peekable;
use std::str::Chars;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;

use super::ast::{FilterCondition, FilterExpr, FilterField, FilterOperator};
use crate::models::Provider;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Term { field: String, value: String },
    And,
    Or,
}

/// Split input into `field:value` terms and operator keywords.
fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let head = read_until(&mut chars, |ch| ch.is_whitespace() || ch == ':');
        if chars.next_if_eq(&':').is_none() {
            match head.to_uppercase().as_str() {
                "AND" => tokens.push(Token::And),
                "OR" => tokens.push(Token::Or),
                _ => bail!("Invalid token: '{}' (expected field:value or AND/OR)", head),
            }
            continue;
        }

        let value = if chars.next_if_eq(&'"').is_some() {
            read_quoted(&mut chars)?
        } else {
            read_until(&mut chars, char::is_whitespace)
        };

        if head.is_empty() || value.trim().is_empty() {
            bail!("Invalid field:value format: '{}:{}'", head, value);
        }
        tokens.push(Token::Term { field: head, value });
    }

    Ok(tokens)
}

fn read_until(chars: &mut Peekable<Chars<'_>>, stop: impl Fn(char) -> bool) -> String {
    let mut word = String::new();
    while let Some(ch) = chars.next_if(|ch| !stop(*ch)) {
        word.push(ch);
    }
    word
}

/// Read up to the closing quote, which is consumed.
fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let mut value = String::new();
    for ch in chars.by_ref() {
        if ch == '"' {
            return Ok(value);
        }
        value.push(ch);
    }
    Err(anyhow!("Unterminated quoted string"))
}

fn parse_field(field: &str) -> Result<FilterField> {
    match field.to_lowercase().as_str() {
        "provider" => Ok(FilterField::Provider),
        "title" => Ok(FilterField::Title),
        "since" => Ok(FilterField::Since),
        "favorite" | "favourite" => Ok(FilterField::Favorite),
        _ => Err(anyhow!(
            "Unknown field: '{}' (valid fields: provider, title, since, favorite)",
            field
        )),
    }
}

fn parse_condition(field: FilterField, value: &str) -> Result<FilterCondition> {
    let value = value.trim();
    match field {
        FilterField::Provider => Ok(FilterCondition::Provider(value.parse::<Provider>()?)),
        FilterField::Title => Ok(FilterCondition::Title(value.to_lowercase())),
        FilterField::Since => parse_date(value)
            .map(FilterCondition::Since)
            .ok_or_else(|| anyhow!("Invalid date format: '{}' (expected YYYY-MM-DD)", value)),
        FilterField::Favorite => match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(FilterCondition::Favorite(true)),
            "false" | "no" | "0" => Ok(FilterCondition::Favorite(false)),
            _ => Err(anyhow!("Invalid favorite value: '{}' (must be true or false)", value)),
        },
    }
}

/// Strict `YYYY-MM-DD`; semantically invalid dates such as 2024-02-31 are rejected.
fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parse a filter string into a [`FilterExpr`].
///
/// Blank input yields an empty expression, which matches everything.
///
/// # Errors
///
/// Returns an error for unknown fields, invalid values, unterminated quotes,
/// or a misplaced `AND`/`OR`.
pub fn parse_filter(input: &str) -> Result<FilterExpr> {
    let tokens = tokenize(input).context("Failed to tokenize filter")?;

    let mut expr = FilterExpr::new();
    let mut pending: Option<FilterOperator> = None;

    for token in tokens {
        match token {
            Token::Term { field, value } => {
                let condition = parse_condition(parse_field(&field)?, &value)?;
                let operator = match (pending.take(), expr.conditions.last()) {
                    (_, None) => None,
                    (Some(explicit), Some(_)) => Some(explicit),
                    (None, Some(previous)) if previous.field() == condition.field() => {
                        Some(FilterOperator::Or)
                    }
                    (None, Some(_)) => Some(FilterOperator::And),
                };
                expr.push(operator, condition);
            }
            Token::And | Token::Or => {
                let keyword = if token == Token::And { "AND" } else { "OR" };
                if expr.is_empty() || pending.is_some() {
                    bail!("Unexpected {} operator (expected field:value)", keyword);
                }
                pending =
                    Some(if token == Token::And { FilterOperator::And } else { FilterOperator::Or });
            }
        }
    }

    if pending.is_some() {
        bail!("Filter ended with operator (expected field:value)");
    }

    Ok(expr)
}
