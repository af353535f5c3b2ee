/// The portal leaves stray `amp;` fragments in titles after its own partial
/// entity encoding. Strip the literal substring instead of fully decoding,
/// so already-clean strings are never double-unescaped.
pub fn strip_stray_amp(text: &str) -> String {
    text.replace("amp;", "")
}

pub fn assignment_url(manada_url: &str, relative_href: &str) -> String {
    format!("{manada_url}/ct/{relative_href}")
}

/// Minimal HTML entity decoder for the RelayState hidden-field value.
/// Handles the named entities the IdP emits plus numeric references
/// (Shibboleth escapes `:` as `&#x3a;`). Unknown entities pass through.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let Some(end) = rest.find(';') else {
            break;
        };
        let decoded = match &rest[1..end] {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            entity => decode_numeric(entity),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_numeric(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_stray_amp_left_by_partial_encoding() {
        assert_eq!(strip_stray_amp("Systems &amp; Networks"), "Systems & Networks");
        assert_eq!(strip_stray_amp("Week 9 Report"), "Week 9 Report");
    }

    #[test]
    fn unescapes_shibboleth_relay_state() {
        assert_eq!(
            unescape_html("ss&#x3a;mem&#x3a;4f2c90ab"),
            "ss:mem:4f2c90ab"
        );
        assert_eq!(unescape_html("a&amp;b&lt;c&gt;"), "a&b<c>");
        assert_eq!(unescape_html("&#65;&#x42;"), "AB");
    }

    #[test]
    fn leaves_unknown_entities_and_bare_ampersands_alone() {
        assert_eq!(unescape_html("a&bogus;b"), "a&bogus;b");
        assert_eq!(unescape_html("a&b"), "a&b");
        assert_eq!(unescape_html("trailing&"), "trailing&");
    }

    #[test]
    fn builds_absolute_assignment_url() {
        assert_eq!(
            assignment_url("https://portal.example.ac.jp", "page_do?id=42"),
            "https://portal.example.ac.jp/ct/page_do?id=42"
        );
    }
}
