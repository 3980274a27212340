//! Reply markup conversion.
//!
//! Replies are written with WhatsApp-style markup (`*bold*`, `` `code` ``).
//! Telegram gets them as HTML so user data never breaks the parse mode.

use lazy_regex::lazy_regex;

/// Converts WhatsApp-style markup into Telegram HTML.
///
/// Text is HTML-escaped first; only single-line spans are converted.
///
/// # Examples
///
/// ```
/// use nota_bot_transport_telegram::bot::format::to_telegram_html;
///
/// assert_eq!(to_telegram_html("ketik *1* <ya>"), "ketik <b>1</b> &lt;ya&gt;");
/// ```
#[must_use]
pub fn to_telegram_html(text: &str) -> String {
    static RE_BOLD: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"\*([^*\n]+)\*");
    static RE_CODE: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"`([^`\n]+)`");

    let escaped = html_escape::encode_text(text);
    let with_code = RE_CODE.replace_all(&escaped, "<code>$1</code>");
    RE_BOLD.replace_all(&with_code, "<b>$1</b>").into_owned()
}
