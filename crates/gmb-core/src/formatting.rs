//! Lightweight markup → Telegram HTML.
//!
//! Supports the small subset used by bot-authored texts: `**bold**`, `__bold__`,
//! `*italic*`, `_italic_`, `` `code` ``, `[label](url)` and `#` headers. Anything
//! else is escaped and passed through.

use std::sync::OnceLock;

use regex::Regex;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_markup(input: &str) -> String {
    input
        .split('\n')
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(line: &str) -> String {
    if let Some(title) = strip_header(line) {
        return format!("<b>{}</b>", render_spans(title));
    }
    render_spans(line)
}

fn strip_header(line: &str) -> Option<&str> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    line[level..].strip_prefix(' ')
}

/// Split on backtick pairs; code spans are escaped verbatim, the rest gets inline markup.
fn render_spans(line: &str) -> String {
    let mut out = String::new();
    let mut rest = line;
    while let Some(open) = rest.find('`') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('`') else {
            break;
        };
        out.push_str(&render_inline(&rest[..open]));
        out.push_str("<code>");
        out.push_str(&escape_html(&after[..close]));
        out.push_str("</code>");
        rest = &after[close + 1..];
    }
    out.push_str(&render_inline(rest));
    out
}

struct InlineRules {
    bold_stars: Regex,
    bold_underscores: Regex,
    italic_star: Regex,
    italic_underscore: Regex,
    link: Regex,
}

fn inline_rules() -> &'static InlineRules {
    static RULES: OnceLock<InlineRules> = OnceLock::new();
    RULES.get_or_init(|| InlineRules {
        bold_stars: Regex::new(r"\*\*([^*\n]+)\*\*").expect("valid regex"),
        bold_underscores: Regex::new(r"__([^_\n]+)__").expect("valid regex"),
        italic_star: Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").expect("valid regex"),
        // Word-internal underscores (snake_case) are left alone.
        italic_underscore: Regex::new(
            r"(^|[^A-Za-z0-9_])_([^_\s](?:[^_\n]*[^_\s])?)_([^A-Za-z0-9_]|$)",
        )
            .expect("valid regex"),
        link: Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("valid regex"),
    })
}

fn render_inline(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let rules = inline_rules();

    let escaped = escape_html(text);
    let s = rules.bold_stars.replace_all(&escaped, "<b>$1</b>");
    let s = rules.bold_underscores.replace_all(&s, "<b>$1</b>");
    let s = rules.italic_star.replace_all(&s, "<i>$1</i>");
    let s = rules
        .italic_underscore
        .replace_all(&s, "${1}<i>${2}</i>${3}");
    rules
        .link
        .replace_all(&s, r#"<a href="$2">$1</a>"#)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn renders_double_star_bold_with_emoji() {
        assert_eq!(
            render_markup("📜 **Group Rules** 📜"),
            "📜 <b>Group Rules</b> 📜"
        );
    }

    #[test]
    fn renders_italics_but_keeps_snake_case() {
        assert_eq!(render_markup("be _kind_ please"), "be <i>kind</i> please");
        assert_eq!(render_markup("*soft* tone"), "<i>soft</i> tone");
        assert_eq!(render_markup("see my_var_name"), "see my_var_name");
    }

    #[test]
    fn spaced_operators_are_not_emphasis() {
        assert_eq!(render_markup("2 * 3 * 4"), "2 * 3 * 4");
        assert_eq!(render_markup("a _ b _ c"), "a _ b _ c");
        assert_eq!(render_markup("*x*"), "<i>x</i>");
    }

    #[test]
    fn code_spans_are_escaped_and_not_styled() {
        assert_eq!(
            render_markup("run `a **b** <c>` now"),
            "run <code>a **b** &lt;c&gt;</code> now"
        );
    }

    #[test]
    fn unclosed_markers_pass_through() {
        assert_eq!(render_markup("2 * 3 = 6 and `x"), "2 * 3 = 6 and `x");
    }

    #[test]
    fn renders_links_and_headers() {
        assert_eq!(
            render_markup("# Read [this](https://example.com/a?b=1&c=2)"),
            r#"<b>Read <a href="https://example.com/a?b=1&amp;c=2">this</a></b>"#
        );
    }

    #[test]
    fn numbered_lines_are_left_intact() {
        let md = "1. Be respectful.\n2. No spam.";
        assert_eq!(render_markup(md), md);
    }
}
