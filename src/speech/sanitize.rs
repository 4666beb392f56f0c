//! Sentence cleanup before synthesis
//!
//! Strips markup that reads badly aloud: URLs, inline code, emphasis markers
//! and long paths. The result is whitespace-collapsed and capped in length.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Maximum number of characters handed to a speech engine
pub const MAX_SPOKEN_CHARS: usize = 200;

/// Appended when text is cut at [`MAX_SPOKEN_CHARS`]
pub const ELLIPSIS: &str = "...";

/// `scheme://` followed by a non-whitespace run
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z0-9+.\-]*://\S+").expect("valid regex")
});

/// Single-backtick code span on one line. A lone backtick never matches.
static CODE_SPAN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`\n]*`").expect("valid regex"));

/// Any whitespace-delimited token containing a path separator
static PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S*[/\\]\S*").expect("valid regex"));

/// Clean text for speech synthesis
///
/// Total: any input produces some output, and empty input yields an empty
/// string. Applying it twice gives the same result as applying it once.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();

    // Removing markers can expose a token an earlier step handles
    // (e.g. `http*://`), so run the cleanup until nothing changes
    loop {
        let cleaned = clean_once(&current);
        if cleaned == current {
            break;
        }
        current = cleaned;
    }

    truncate(current)
}

/// One pass of the cleanup steps, in order
fn clean_once(text: &str) -> String {
    let text = URL_REGEX.replace_all(text, "");
    let text = CODE_SPAN_REGEX.replace_all(&text, "");
    let text = strip_emphasis(&text);
    let text = PATH_REGEX.replace_all(&text, |caps: &Captures<'_>| {
        last_path_segment(&caps[0]).to_string()
    });

    collapse_whitespace(&text)
}

/// Drop `**` and `*` markers, keeping the text they wrap
fn strip_emphasis(text: &str) -> Cow<'_, str> {
    if text.contains('*') {
        Cow::Owned(text.replace('*', ""))
    } else {
        Cow::Borrowed(text)
    }
}

/// Final non-empty component when splitting on both `/` and `\`
fn last_path_segment(token: &str) -> &str {
    token
        .split(['/', '\\'])
        .rfind(|segment| !segment.is_empty())
        .unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_SPOKEN_CHARS {
        return text;
    }

    let mut cut: String = text.chars().take(MAX_SPOKEN_CHARS).collect();
    cut.push_str(ELLIPSIS);
    cut
}
