//! Locating `{% for %}` ... `{% endfor %}` blocks.

use crate::Error;

/// Opens any loop, regardless of its variable or source.
pub const FOR_TOKEN: &str = "{% for ";
/// Closes the innermost open loop.
pub const ENDFOR_TOKEN: &str = "{% endfor %}";

/// A template split around one loop block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Everything up to and including the opening tag.
    pub pre: &'a str,
    /// The text between the opening tag and its matching `{% endfor %}`.
    pub body: &'a str,
    /// Everything after the matching `{% endfor %}`.
    pub post: &'a str,
}

impl<'a> Block<'a> {
    /// The literal text preceding the opening tag.
    pub fn prefix(&self, opening_tag: &str) -> &'a str {
        &self.pre[..self.pre.len() - opening_tag.len()]
    }
}

/// Splits `text` around the first occurrence of `opening_tag` and its
/// matching `{% endfor %}`, taking nested loops into account.
///
/// Fails with [`Error::TagNotFound`] if `opening_tag` does not occur in
/// `text`, and with [`Error::UnclosedBlock`] if the text ends before the
/// block is closed.
pub fn extract_block<'a>(text: &'a str, opening_tag: &str) -> Result<Block<'a>, Error> {
    let start = text
        .find(opening_tag)
        .ok_or_else(|| Error::TagNotFound(opening_tag.to_string()))?;
    let (pre, after) = text.split_at(start + opening_tag.len());

    let mut depth = 1_usize;
    let mut i = 0_usize;
    while i < after.len() {
        let next_for = after[i..].find(FOR_TOKEN).map(|p| p + i);
        let next_end = match after[i..].find(ENDFOR_TOKEN) {
            Some(p) => p + i,
            None => break,
        };
        if let Some(next_for) = next_for {
            // The two tokens differ at their fourth byte, so they can never
            // start at the same position.
            debug_assert_ne!(next_for, next_end);
            if next_for < next_end {
                depth += 1;
                i = next_for + FOR_TOKEN.len();
                continue;
            }
        }
        depth -= 1;
        if depth == 0 {
            return Ok(Block {
                pre,
                body: &after[..next_end],
                post: &after[next_end + ENDFOR_TOKEN.len()..],
            });
        }
        i = next_end + ENDFOR_TOKEN.len();
    }
    Err(Error::UnclosedBlock(opening_tag.to_string()))
}
