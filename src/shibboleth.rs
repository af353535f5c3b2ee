use log::debug;

use crate::{
    config::AppConfig, errors::AuthError, extractors::SamlFormExtractor, requests::RequestClient,
    text_manipulators::unescape_html,
};

/// The cookie pair proving an authenticated portal session. Produced per
/// request, handed straight to the assignment fetch, then dropped.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

const SESSION_COOKIE_PREFIX: &str = "_shibsession_";

// Browser local-storage negotiation for the e1s1 step. No real browser
// storage exists here, so every field reports "not supported".
const LS_NEGOTIATION_FORM: &[(&str, &str)] = &[
    ("shib_idp_ls_exception.shib_idp_session_ss", ""),
    ("shib_idp_ls_success.shib_idp_session_ss", "true"),
    ("shib_idp_ls_value.shib_idp_session_ss", ""),
    ("shib_idp_ls_exception.shib_idp_persistent_ss", ""),
    ("shib_idp_ls_success.shib_idp_persistent_ss", "true"),
    ("shib_idp_ls_value.shib_idp_persistent_ss", ""),
    ("shib_idp_ls_supported", "true"),
    ("_eventId_proceed", ""),
];

// The shorter e1s3 payload that closes out the IdP leg.
const LS_COMPLETION_FORM: &[(&str, &str)] = &[
    ("shib_idp_ls_exception.shib_idp_session_ss", ""),
    ("shib_idp_ls_success.shib_idp_session_ss", "true"),
    ("_eventId_proceed", ""),
];

/// Runs the 4-step Shibboleth handshake and returns the portal session
/// cookie. Step order matters: the portal home GET seeds the cookie store,
/// e1s1/e1s2/e1s3 walk the IdP's login flow, and the SAML consumer POST
/// trades the assertion for a `_shibsession_` cookie. Any HTTP failure or
/// missing markup fails the whole handshake; there is no retry.
pub async fn authenticate(
    client: &RequestClient,
    config: &AppConfig,
) -> Result<SessionCookie, AuthError> {
    debug!("Priming portal session at {}/ct/home", config.manada_url);
    client
        .fetch_url_response(&format!("{}/ct/home", config.manada_url))
        .await?;

    client
        .post_form(
            &format!("{}?execution=e1s1", config.auth_url),
            LS_NEGOTIATION_FORM,
        )
        .await?;

    let credential_form = [
        ("j_username", config.manada_user.as_str()),
        ("j_password", config.manada_pwd.as_str()),
        ("_eventId_proceed", ""),
    ];
    client
        .post_form(
            &format!("{}?execution=e1s2", config.auth_url),
            &credential_form,
        )
        .await?;

    let response = client
        .post_form(
            &format!("{}?execution=e1s3", config.auth_url),
            LS_COMPLETION_FORM,
        )
        .await?;
    let body = response.text().await?;

    let extractor = SamlFormExtractor::new()?;
    let (relay_state, saml_response) = extractor
        .relay_state_and_saml(&body)
        .ok_or_else(|| AuthError::new("IdP response did not contain a SAML response form"))?;

    // Only the RelayState comes back entity-escaped; the base64 assertion
    // is posted through untouched.
    let relay_state = unescape_html(&relay_state);
    let consumer_form = [
        ("RelayState", relay_state.as_str()),
        ("SAMLResponse", saml_response.as_str()),
    ];
    client
        .post_form(
            &format!("{}/Shibboleth.sso/SAML2/POST", config.manada_url),
            &consumer_form,
        )
        .await?;

    // The SP sets the session cookie on the 302 hop of the consumer
    // exchange, before redirecting to the target page. Read it from the
    // cookie jar, which saw every hop, not from the final response.
    let cookie = client
        .cookies_for(&config.manada_url)
        .into_iter()
        .find(|(name, _)| name.starts_with(SESSION_COOKIE_PREFIX))
        .map(|(name, value)| SessionCookie { name, value })
        .ok_or_else(|| AuthError::new("portal did not set a _shibsession_ cookie"))?;

    debug!("Obtained portal session cookie {}", cookie.name);
    Ok(cookie)
}
