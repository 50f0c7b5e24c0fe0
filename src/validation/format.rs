//! Checks for the `format` keyword: `uri`, `uri-reference`, `email` and
//! `color-hex`. Unknown format names are ignored.
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref COLOR_HEX_RE: Regex =
        Regex::new("^#([0-9A-Fa-f]{3,4}|([0-9A-Fa-f]{2}){3,4})$").expect("Is a valid regex");
    static ref EMAIL_RE: Regex = Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#
    )
    .expect("Is a valid regex");
}

/// The failure message for `value` under the given format, or `None` when it
/// conforms (or the format is unknown).
pub(crate) fn check_format(format: &str, value: &str) -> Option<String> {
    match format {
        "uri" => check_uri(value, true),
        "uri-reference" => check_uri(value, false),
        "email" => {
            if EMAIL_RE.is_match(value) {
                None
            } else {
                Some("String is not an e-mail address.".to_string())
            }
        }
        "color-hex" => {
            if COLOR_HEX_RE.is_match(value) {
                None
            } else {
                Some("Invalid color format. Use #RGB, #RGBA, #RRGGBB or #RRGGBBAA.".to_string())
            }
        }
        _ => None,
    }
}

fn check_uri(value: &str, scheme_required: bool) -> Option<String> {
    if value.is_empty() {
        return Some("String is not a URI: URI expected.".to_string());
    }
    match Url::parse(value) {
        Ok(_) => None,
        // a scheme-less reference is fine for `uri-reference`
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if scheme_required {
                Some("String is not a URI: URI with a scheme is expected.".to_string())
            } else {
                None
            }
        }
        Err(error) => Some(format!("String is not a URI: {}", error)),
    }
}

#[cfg(test)]
mod tests {
    use super::check_format;
    use test_case::test_case;

    #[test_case("https://example.com/a?b=1#c", true)]
    #[test_case("urn:isbn:0451450523", true)]
    #[test_case("relative/path", false; "missing scheme")]
    #[test_case("", false; "empty")]
    fn uri(value: &str, valid: bool) {
        assert_eq!(check_format("uri", value).is_none(), valid);
    }

    #[test]
    fn uri_reference_accepts_scheme_less_values() {
        assert!(check_format("uri-reference", "relative/path").is_none());
        assert!(check_format("uri-reference", "").is_some());
    }

    #[test]
    fn uri_messages() {
        assert_eq!(
            check_format("uri", "").as_deref(),
            Some("String is not a URI: URI expected.")
        );
        assert_eq!(
            check_format("uri", "no-scheme").as_deref(),
            Some("String is not a URI: URI with a scheme is expected.")
        );
        assert!(check_format("uri", "http://exa mple.com")
            .expect("Malformed")
            .starts_with("String is not a URI: "));
    }

    #[test_case("simple@example.com", true)]
    #[test_case("first.last@sub.example.co", true)]
    #[test_case("\"quoted local\"@example.com", true)]
    #[test_case("a@[127.0.0.1]", true)]
    #[test_case("no-at-sign", false)]
    #[test_case("two@@example.com", false)]
    #[test_case("trailing.dot@example.", false)]
    fn email(value: &str, valid: bool) {
        assert_eq!(check_format("email", value).is_none(), valid);
    }

    #[test_case("#abc", true)]
    #[test_case("#abcd", true)]
    #[test_case("#AABBCC", true)]
    #[test_case("#aabbccdd", true)]
    #[test_case("#ab", false)]
    #[test_case("#abcde", false)]
    #[test_case("aabbcc", false; "missing hash")]
    #[test_case("#ggg", false; "not hex")]
    fn color_hex(value: &str, valid: bool) {
        assert_eq!(check_format("color-hex", value).is_none(), valid);
    }

    #[test]
    fn unknown_formats_are_ignored() {
        assert!(check_format("date-time", "not a date").is_none());
        assert!(check_format("hostname", "###").is_none());
    }
}
