//! Console routes, login form selectors, and the authentication rule.

use std::time::Duration;

/// Help Center sign-in entry point.
pub const SIGNIN_ROUTE: &str = "/hc/signin";
/// Administrative theming route that hosts the console.
pub const WORKBENCH_ROUTE: &str = "/theming/workbench";
/// Element present once the workbench finished rendering its theme list.
pub const WORKBENCH_READY_SELECTOR: &str = r#"a[href^="/theming/theme"]"#;

pub const LOGIN_FORM_SELECTOR: &str = "#login-form";
pub const EMAIL_FIELD_SELECTOR: &str = "#user_email";
pub const PASSWORD_FIELD_SELECTOR: &str = "#user_password";

/// Cookie whose presence with [`AUTH_COOKIE_VALUE`] proves the login.
pub const AUTH_COOKIE_NAME: &str = "_zendesk_authenticated";
pub const AUTH_COOKIE_VALUE: &str = "1";

/// Default ceiling for page navigations.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Default ceiling for selector waits.
pub const DEFAULT_SELECTOR_TIMEOUT: Duration = Duration::from_secs(30);

/// A browser cookie, reduced to what authentication looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Whether the cookie jar proves an authenticated session.
///
/// This is the only login signal; page content and status codes are ignored.
#[must_use]
pub fn is_authenticated(cookies: &[Cookie]) -> bool {
    cookies
        .iter()
        .any(|c| c.name == AUTH_COOKIE_NAME && c.value == AUTH_COOKIE_VALUE)
}
