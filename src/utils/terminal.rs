//! Terminal output sanitization utilities
//!
//! # Security: Terminal Injection Prevention
//!
//! Conversation titles, message text and warning messages come straight from
//! provider exports. Anything the CLI prints from an export goes through
//! [`strip_ansi_codes`] (or [`preview`], which calls it) so embedded escape
//! sequences cannot clear the screen, move the cursor or restyle the terminal.

/// Strips ANSI escape codes from a string
///
/// Removes ANSI CSI (Control Sequence Introducer) escape codes that could
/// affect terminal display. This prevents terminal injection attacks where
/// malicious data contains escape sequences.
///
/// # Examples
///
/// ```
/// use chat_history_explorer::utils::terminal::strip_ansi_codes;
///
/// let text = "\x1b[31mRed text\x1b[0m";
/// assert_eq!(strip_ansi_codes(text), "Red text");
/// ```
///
/// # Security Note
///
/// This function removes common ANSI CSI sequences (ESC[...m for colors/styles,
/// ESC[...H for cursor movement, etc.). It also removes other control characters
/// like bell (\x07) and backspace (\x08).
pub fn strip_ansi_codes(text: &str) -> String {
    // Remove ANSI CSI sequences: ESC [ ... (letter)
    // Pattern: \x1b\[([0-9;]*)[A-Za-z]
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            // Check for CSI sequence: ESC [
            if chars.peek() == Some(&'[') {
                chars.next(); // consume '['
                // Skip until we find a letter (end of CSI sequence)
                while let Some(&next_ch) = chars.peek() {
                    chars.next();
                    if next_ch.is_ascii_alphabetic() {
                        break;
                    }
                }
                continue;
            }
        }

        // Filter out other control characters (except tab, newline, carriage return)
        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Single-line, sanitized excerpt of `text` of at most `max_chars` characters.
///
/// Whitespace runs (including newlines) collapse to one space; an ellipsis
/// marks truncation.
///
/// ```
/// use chat_history_explorer::utils::terminal::preview;
///
/// assert_eq!(preview("first line\n\nsecond line", 14), "first line se…");
/// ```
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = strip_ansi_codes(text).split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
