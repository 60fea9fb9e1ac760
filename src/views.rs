//! Minimal HTML rendering. Two pages and a flashed message don't warrant a
//! template engine.

use crate::registry::UserProfile;

pub fn index(user: Option<&UserProfile>, message: Option<&str>) -> String {
    let greeting = match user {
        Some(user) => format!(
            "<p>Hello, {}.</p>\n<p><a href=\"/account\">Account</a> | <a href=\"/logout\">Sign out</a></p>",
            escape(user.name.as_deref().unwrap_or(&user.sub))
        ),
        None => "<p>Welcome, please <a href=\"/login\">Sign in</a>.</p>".to_string(),
    };
    let flash = match message {
        Some(message) => format!("<p class=\"error\">{}</p>\n", escape(message)),
        None => String::new(),
    };

    page(
        "OIDC Probe",
        &format!("{flash}<h1>OIDC sample application</h1>\n{greeting}"),
    )
}

pub fn account(user: &UserProfile) -> String {
    let rows = [
        ("sub", Some(user.sub.as_str())),
        ("issuer", Some(user.issuer.as_str())),
        ("name", user.name.as_deref()),
        ("email", user.email.as_deref()),
    ]
    .iter()
    .map(|(label, value)| {
        format!(
            "<tr><th>{label}</th><td>{}</td></tr>",
            escape(value.unwrap_or("-"))
        )
    })
    .collect::<String>();

    page(
        "Account",
        &format!(
            "<h1>Account</h1>\n<table>{rows}</table>\n<p><a href=\"/\">Home</a> | <a href=\"/logout\">Sign out</a></p>"
        ),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_in_claims_is_escaped() {
        let user = UserProfile {
            sub: "subject-1".to_string(),
            issuer: "https://issuer.example.com".to_string(),
            name: Some("<script>alert(1)</script>".to_string()),
            email: None,
        };
        let html = index(Some(&user), None);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn anonymous_landing_page_offers_sign_in() {
        let html = index(None, Some("boom"));
        assert!(html.contains("Sign in"));
        assert!(html.contains("boom"));
    }
}
