//! Block tag whitespace control.
//!
//! Mirrors Jinja's `lstrip_blocks` and `trim_blocks` options so that
//! templates laid out with one block tag per line render the same way under
//! every engine.

const BLOCK_START: &str = "{%";
const BLOCK_END: &str = "%}";

/// Removes spaces and tabs between the start of a line and a block tag, and
/// the first newline following each block tag.
pub fn trim_block_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut at_line_start = true;
    while let Some(start) = rest.find(BLOCK_START) {
        let (before, tail) = rest.split_at(start);
        out.push_str(lstrip(before, at_line_start));
        let end = match tail.find(BLOCK_END) {
            Some(e) => e + BLOCK_END.len(),
            None => {
                // Not a tag, just text.
                out.push_str(tail);
                return out;
            }
        };
        out.push_str(&tail[..end]);
        rest = &tail[end..];
        match rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
        {
            Some(stripped) => {
                rest = stripped;
                at_line_start = true;
            }
            None => at_line_start = false,
        }
    }
    out.push_str(rest);
    out
}

// Drops trailing indentation from `before` if nothing but indentation
// separates the tag that follows from the start of its line.
fn lstrip(before: &str, at_line_start: bool) -> &str {
    let (line_start, last_line) = match before.rfind('\n') {
        Some(nl) => (nl + 1, &before[nl + 1..]),
        None if at_line_start => (0, before),
        None => return before,
    };
    if last_line.chars().all(|c| c == ' ' || c == '\t') {
        &before[..line_start]
    } else {
        before
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_indentation_and_newline_around_block_tags() {
        let text = "# Wine\n{% for style in styles %}\n  ## {{ style.title }}\n  {% for wine in style_wines[style.id] %}\n  - {{ wine.title }}\n  {% endfor %}\n{% endfor %}\n";
        assert_eq!(
            trim_block_whitespace(text),
            "# Wine\n{% for style in styles %}  ## {{ style.title }}\n{% for wine in style_wines[style.id] %}  - {{ wine.title }}\n{% endfor %}{% endfor %}"
        );
    }

    #[test]
    fn keeps_text_before_tags_on_the_same_line() {
        assert_eq!(
            trim_block_whitespace("a {% for x in xs %}b{% endfor %} c"),
            "a {% for x in xs %}b{% endfor %} c"
        );
    }

    #[test]
    fn leading_indent_at_start_of_text() {
        assert_eq!(
            trim_block_whitespace("\t {% for x in xs %}\r\nb{% endfor %}"),
            "{% for x in xs %}b{% endfor %}"
        );
    }

    #[test]
    fn only_trims_a_single_newline() {
        assert_eq!(
            trim_block_whitespace("{% endfor %}\n\nnext\n"),
            "{% endfor %}\nnext\n"
        );
    }

    #[test]
    fn variable_tags_are_untouched() {
        let text = "  {{ style.title }}\n";
        assert_eq!(trim_block_whitespace(text), text);
    }

    #[test]
    fn unterminated_tag_is_text() {
        assert_eq!(trim_block_whitespace("x {% oops"), "x {% oops");
    }
}
