use chrono::{DateTime, FixedOffset, NaiveDateTime};
use log::debug;

use crate::{
    config::AppConfig,
    errors::FetchError,
    extractors::AssignmentRowExtractor,
    requests::RequestClient,
    shibboleth::SessionCookie,
    text_manipulators::{assignment_url, strip_stray_amp},
};

const DUE_FORMAT: &str = "%Y-%m-%d %H:%M";

// Each assignment block on the query page is preceded by this class name.
const ASSIGNMENT_BLOCK_MARKER: &str = "myassignments-title";

// Year-prefix sanity check that the cell really holds a date.
const DEADLINE_YEAR_PREFIX: &str = "202";

/// The portal's fixed locale, UTC+9.
pub fn portal_offset() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

/// One assignment row scraped off the query page.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub title: String,
    pub course: String,
    /// Trimmed `YYYY-MM-DD HH:MM` wall-clock string as the portal printed it.
    pub deadline_raw: String,
    pub deadline: DateTime<FixedOffset>,
    pub url: String,
}

/// Fetches the assignment query page with the session cookie attached and
/// parses every assignment block out of it.
pub async fn fetch(
    client: &RequestClient,
    config: &AppConfig,
    cookie: &SessionCookie,
) -> Result<Vec<Assignment>, FetchError> {
    let html = client
        .fetch_url_body_with_cookie(
            &format!("{}/ct/home_library_query", config.manada_url),
            &cookie.header_value(),
        )
        .await?;
    parse_assignments(&html, &config.manada_url)
}

/// Splits the page on the block marker (the part before the first marker
/// carries no assignment data) and keeps every fragment that parses.
/// Malformed fragments are skipped, never fatal: header rows and blocks
/// with missing fields are expected in the wild.
pub fn parse_assignments(html: &str, manada_url: &str) -> Result<Vec<Assignment>, FetchError> {
    let extractor = AssignmentRowExtractor::new()?;
    let mut assignments = Vec::new();
    for fragment in html.split(ASSIGNMENT_BLOCK_MARKER).skip(1) {
        match parse_fragment(&extractor, fragment, manada_url) {
            Some(assignment) => assignments.push(assignment),
            None => debug!("Skipping fragment without a parseable assignment row"),
        }
    }
    Ok(assignments)
}

fn parse_fragment(
    extractor: &AssignmentRowExtractor,
    fragment: &str,
    manada_url: &str,
) -> Option<Assignment> {
    let periods = extractor.period_cells(fragment);
    // The first period cell is an opaque field (probably the assigned
    // date); the second is the deadline.
    if periods.len() < 2 || !periods[1].starts_with(DEADLINE_YEAR_PREFIX) {
        return None;
    }
    let deadline_raw = periods[1].trim().to_string();
    let naive = NaiveDateTime::parse_from_str(&deadline_raw, DUE_FORMAT).ok()?;
    let deadline = naive.and_local_timezone(portal_offset()).single()?;

    let (href, title) = extractor.href_and_title(fragment)?;
    let course = extractor.course_name(fragment)?;

    Some(Assignment {
        title: strip_stray_amp(&title),
        course: strip_stray_amp(&course),
        deadline_raw,
        deadline,
        url: assignment_url(manada_url, &href),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTAL_URL: &str = "https://portal.example.ac.jp";

    fn block(deadline: &str, title: &str, course: &str) -> String {
        format!(
            "<td class=\"myassignments-title\">\n\
             <td class=\"td-period\">2025-02-20 09:00</td>\n\
             <td class=\"td-period\">{deadline}</td>\n\
             <td><a href=\"page_do?id=42\">{title}</a></td>\n\
             <div class=\"mycourse-title\"><a href=\"course_123\">{course}</a></div>\n"
        )
    }

    #[test]
    fn parses_a_well_formed_block() {
        let page = format!(
            "<html><div>no assignments up here</div>{}",
            block("2025-03-01 10:00", "Week 9 Report", "Systems Programming")
        );
        let assignments = parse_assignments(&page, PORTAL_URL).unwrap();
        assert_eq!(assignments.len(), 1);
        let a = &assignments[0];
        assert_eq!(a.title, "Week 9 Report");
        assert_eq!(a.course, "Systems Programming");
        assert_eq!(a.deadline_raw, "2025-03-01 10:00");
        assert_eq!(a.url, format!("{PORTAL_URL}/ct/page_do?id=42"));
        assert_eq!(
            a.deadline,
            NaiveDateTime::parse_from_str("2025-03-01 10:00", DUE_FORMAT)
                .unwrap()
                .and_local_timezone(portal_offset())
                .unwrap()
        );
    }

    #[test]
    fn strips_stray_amp_from_title_and_course() {
        let page = block("2025-03-01 10:00", "Q&amp;A sheet", "Signals &amp; Systems");
        let assignments = parse_assignments(&page, PORTAL_URL).unwrap();
        assert_eq!(assignments[0].title, "Q&A sheet");
        assert_eq!(assignments[0].course, "Signals & Systems");
    }

    #[test]
    fn skips_fragment_without_second_dated_period_cell() {
        // A header block: one period cell, and it isn't a date.
        let page = "myassignments-title\">\n\
                    <td class=\"td-period\">Deadline</td>\n"
            .to_string();
        assert!(parse_assignments(&page, PORTAL_URL).unwrap().is_empty());
    }

    #[test]
    fn skips_fragment_missing_the_anchor_without_aborting_the_batch() {
        let broken = "<td class=\"myassignments-title\">\n\
                      <td class=\"td-period\">2025-02-20 09:00</td>\n\
                      <td class=\"td-period\">2025-03-02 12:00</td>\n\
                      <div>anchor went missing</div>\n";
        let page = format!(
            "{broken}{}",
            block("2025-03-01 10:00", "Week 9 Report", "Systems Programming")
        );
        let assignments = parse_assignments(&page, PORTAL_URL).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].title, "Week 9 Report");
    }

    #[test]
    fn skips_fragment_whose_deadline_cell_is_not_a_real_date() {
        let page = block("202X-03-01 10:00", "Week 9 Report", "Systems Programming");
        assert!(parse_assignments(&page, PORTAL_URL).unwrap().is_empty());
    }

    #[test]
    fn page_without_markers_yields_nothing() {
        let page = "<html><body>welcome to the portal</body></html>";
        assert!(parse_assignments(page, PORTAL_URL).unwrap().is_empty());
    }
}
