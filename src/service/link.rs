use std::{borrow::Cow, ops::Range, sync::LazyLock};

use regex::{Regex, RegexBuilder};

// Regex to find existing wiki links like [[target]] or [[target|label]]
static WIKI_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[[^\]\n]*\]\]").unwrap());

/// Links the first whole-word, case-insensitive occurrence of `term` in `text` to the `target` note.
///
/// The matched text is kept as the display label: `[[<target>|<matched>]]`. The term is matched literally, regex
/// metacharacters included. Occurrences inside existing `[[...]]` links are skipped, as are the ones that can't be
/// a link label (containing `|`, `[` or `]`). If no occurrence can be linked, the text is returned unmodified.
pub fn link_first_occurrence<'t>(text: &'t str, term: &str, target: &str) -> Cow<'t, str> {
    let Some(first) = term.chars().next() else {
        return Cow::Borrowed(text);
    };
    let last = term.chars().last().unwrap_or(first);

    // Word boundaries are only meaningful next to word characters, otherwise terms like "C++" would never match
    let pattern = format!(
        "{}{}{}",
        if is_word_char(first) { r"\b" } else { "" },
        regex::escape(term),
        if is_word_char(last) { r"\b" } else { "" },
    );
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(err) => {
            tracing::warn!("Couldn't build the pattern to link '{term}': {err}");
            return Cow::Borrowed(text);
        }
    };

    let links = WIKI_LINK_RE.find_iter(text).map(|m| m.range()).collect::<Vec<_>>();
    let linkable = re
        .find_iter(text)
        .find(|m| !overlaps_any(&m.range(), &links) && !m.as_str().contains(['|', '[', ']']));

    match linkable {
        Some(m) => Cow::Owned(format!(
            "{}[[{target}|{}]]{}",
            &text[..m.start()],
            m.as_str(),
            &text[m.end()..]
        )),
        None => {
            tracing::debug!("Term '{term}' not found on the selected text, or only inside links");
            Cow::Borrowed(text)
        }
    }
}

fn overlaps_any(range: &Range<usize>, spans: &[Range<usize>]) -> bool {
    spans.iter().any(|s| range.start < s.end && s.start < range.end)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
