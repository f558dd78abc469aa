//! Translation of model markdown into Slack mrkdwn.
//!
//! The rewrites are applied in a fixed order and must stay bit-exact, the
//! intake posts the result straight into a mrkdwn section block.
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MARKDOWN_LINK: Regex = Regex::new(r"\[(.*?)\]\((.*?)\)").unwrap();
    static ref MARKDOWN_BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
}

/// Rewrite `[label](url)` links into `<url|label>`
pub fn convert_links(text: &str) -> String {
    MARKDOWN_LINK.replace_all(text, "<${2}|${1}>").into_owned()
}

/// Rewrite `**text**` into `*text*`, pairing markers left to right
pub fn convert_bold(text: &str) -> String {
    MARKDOWN_BOLD.replace_all(text, "*${1}*").into_owned()
}

/// Convert a model answer into the text posted to Slack
pub fn to_slack_mrkdwn(text: &str) -> String {
    convert_bold(&convert_links(text)).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_links() {
        let converted = convert_links("See [Example](http://x) for details");
        assert_eq!(converted, "See <http://x|Example> for details");
        assert!(!MARKDOWN_LINK.is_match(&converted));
    }

    #[test]
    fn test_convert_multiple_links() {
        let converted = convert_links("[a](https://a.dev) and [b](https://b.dev/path?q=1)");
        assert_eq!(converted, "<https://a.dev|a> and <https://b.dev/path?q=1|b>");
    }

    #[test]
    fn test_convert_bold() {
        assert_eq!(convert_bold("this is **bold** text"), "this is *bold* text");
        assert_eq!(convert_bold("**one** and **two**"), "*one* and *two*");
    }

    #[test]
    fn test_convert_bold_odd_markers() {
        assert_eq!(convert_bold("**a** **b"), "*a* **b");
        assert_eq!(convert_bold("**"), "**");
        assert_eq!(convert_bold("***"), "***");
    }

    #[test]
    fn test_bold_does_not_span_lines() {
        assert_eq!(convert_bold("**open\nclose**"), "**open\nclose**");
    }

    #[test]
    fn test_to_slack_mrkdwn() {
        let text = "\n  **Tokyo** is lovely, see [JNTO](https://www.japan.travel)  \n";
        assert_eq!(
            to_slack_mrkdwn(text),
            "*Tokyo* is lovely, see <https://www.japan.travel|JNTO>"
        );
    }

    #[test]
    fn test_bold_link_label() {
        assert_eq!(
            to_slack_mrkdwn("[**Docs**](https://docs.rs)"),
            "<https://docs.rs|*Docs*>"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(to_slack_mrkdwn("nothing to do here"), "nothing to do here");
        assert_eq!(to_slack_mrkdwn("   "), "");
    }
}
