//! Helpers for Telegram message text: MarkdownV2 escaping and splitting
//! long replies under the Bot API message size limit.

/// Maximum length of a single Telegram text message, in characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Escapes markdown special characters for MarkdownV2 parsing mode
/// 
/// This function escapes all characters that have special meaning in Telegram's
/// MarkdownV2 format to ensure they are displayed as literal text.
/// 
/// # Arguments
/// * `text` - The text to escape
/// 
/// # Returns
/// A string with all markdown special characters escaped with backslashes
/// 
/// # Example
/// ```
/// use conference_bot::utils::markdown::escape_markdown;
/// 
/// let text = "Hello *world* (test)";
/// let escaped = escape_markdown(text);
/// assert_eq!(escaped, "Hello \\*world\\* \\(test\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    text.replace('_', "\\_")
        .replace('*', "\\*")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('~', "\\~")
        .replace('`', "\\`")
        .replace('>', "\\>")
        .replace('#', "\\#")
        .replace('+', "\\+")
        .replace('-', "\\-")
        .replace('=', "\\=")
        .replace('|', "\\|")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('.', "\\.")
        .replace('!', "\\!")
}

/// Splits `text` into chunks of at most `limit` characters, preferring to
/// break on blank lines, then on single newlines.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 || text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for block in text.split_inclusive('\n') {
        let block_len = block.chars().count();

        if block_len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = block.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if current_len + block_len > limit {
            // Prefer cutting at the last blank line inside the current chunk.
            if let Some(pos) = current.rfind("\n\n") {
                let rest = current.split_off(pos + 2);
                chunks.push(std::mem::replace(&mut current, rest));
                current_len = current.chars().count();
            }
            if current_len + block_len > limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
        }

        current.push_str(block);
        current_len += block_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_basic_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("_italic_"), "\\_italic\\_");
        assert_eq!(escape_markdown("`code`"), "\\`code\\`");
    }

    #[test]
    fn test_escape_brackets_and_parentheses() {
        assert_eq!(escape_markdown("[link](url)"), "\\[link\\]\\(url\\)");
        assert_eq!(escape_markdown("{code}"), "\\{code\\}");
    }

    #[test]
    fn test_escape_special_symbols() {
        assert_eq!(escape_markdown("# Header"), "\\# Header");
        assert_eq!(escape_markdown("- List item"), "\\- List item");
        assert_eq!(escape_markdown("+ Plus sign"), "\\+ Plus sign");
        assert_eq!(escape_markdown("= Equal sign"), "\\= Equal sign");
        assert_eq!(escape_markdown("| Pipe"), "\\| Pipe");
        assert_eq!(escape_markdown("> Quote"), "\\> Quote");
        assert_eq!(escape_markdown("~ Tilde"), "\\~ Tilde");
        assert_eq!(escape_markdown(". Period"), "\\. Period");
        assert_eq!(escape_markdown("! Exclamation"), "\\! Exclamation");
    }

    #[test]
    fn test_escape_empty_and_plain_text() {
        assert_eq!(escape_markdown(""), "");
        assert_eq!(escape_markdown("plain text"), "plain text");
        assert_eq!(escape_markdown("123 ABC"), "123 ABC");
    }

    #[test]
    fn test_escape_complex_text() {
        let input = "Talk: *Async Rust* [2024-06-01] (room B) - Live!";
        let expected = "Talk: \\*Async Rust\\* \\[2024\\-06\\-01\\] \\(room B\\) \\- Live\\!";
        assert_eq!(escape_markdown(input), expected);
    }

    #[test]
    fn test_split_message_short_text_is_untouched() {
        assert_eq!(split_message("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn test_split_message_respects_limit_and_keeps_content() {
        let block = "Program: RustConf\nspeaker - Ada\n\n";
        let text = block.repeat(50);
        let chunks = split_message(&text, 100);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_message_breaks_on_blank_lines() {
        let text = "aaaa\nbbbb\n\ncccc\ndddd\n";
        let chunks = split_message(text, 16);
        assert_eq!(chunks[0], "aaaa\nbbbb\n\n");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_message_hard_splits_oversized_lines() {
        let text = "x".repeat(25);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), text);
    }
}