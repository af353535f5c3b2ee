use regex::Regex;

/// Pulls the hidden input values out of the IdP's SAML response form.
///
/// The portal's markup is non-standard enough that a strict HTML parser may
/// reject it, so raw-markup regex matching is the authoritative strategy;
/// swapping it means replacing this struct, not touching the pipeline.
pub struct SamlFormExtractor {
    hidden_value_regex: Regex,
}

impl SamlFormExtractor {
    pub fn new() -> anyhow::Result<Self> {
        let hidden_value_regex = Regex::new(r#"value="(.*)"/>"#)?;
        Ok(Self { hidden_value_regex })
    }

    /// First `value="..."` in document order is the RelayState, second is
    /// the base64 SAML assertion. Neither is unescaped here.
    pub fn relay_state_and_saml(&self, html: &str) -> Option<(String, String)> {
        let mut values = self
            .hidden_value_regex
            .captures_iter(html)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()));
        let relay_state = values.next()?;
        let saml_response = values.next()?;
        Some((relay_state, saml_response))
    }
}

/// Field extraction for one `myassignments-title` fragment.
pub struct AssignmentRowExtractor {
    period_regex: Regex,
    anchor_regex: Regex,
    course_regex: Regex,
}

impl AssignmentRowExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            period_regex: Regex::new(r#"td-period">(.*)</td>"#)?,
            anchor_regex: Regex::new(r#"<a href="(.+)">(.+?)</a>"#)?,
            course_regex: Regex::new(r#"class="mycourse-title"><.*>(.*)</a>"#)?,
        })
    }

    /// All labelled date/time cells, in document order.
    pub fn period_cells<'a>(&self, fragment: &'a str) -> Vec<&'a str> {
        self.period_regex
            .captures_iter(fragment)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Relative href and link text of the first anchor in the fragment,
    /// which the portal renders as the assignment link.
    pub fn href_and_title(&self, fragment: &str) -> Option<(String, String)> {
        let caps = self.anchor_regex.captures(fragment)?;
        Some((
            caps.get(1)?.as_str().to_string(),
            caps.get(2)?.as_str().to_string(),
        ))
    }

    pub fn course_name(&self, fragment: &str) -> Option<String> {
        let caps = self.course_regex.captures(fragment)?;
        Some(caps.get(1)?.as_str().to_string())
    }
}
