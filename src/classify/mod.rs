//! Maps decoded barcode payloads to a semantic type and the presentation
//! payload the result dialog renders from.

pub mod wifi;

use serde::Serialize;

use crate::db::models::ScanKind;
use wifi::WifiCredentials;

/// UPI payment URIs bypass the result dialog entirely and are handed
/// straight to the system opener.
pub fn is_upi(raw: &str) -> bool {
    raw.starts_with("upi://")
}

/// Classify a decoded payload. Total: every input maps to a kind, with
/// `Text` as the fallback.
pub fn classify(raw: &str) -> ScanKind {
    let value = raw.trim();
    if starts_with_ignore_case(value, "http://") || starts_with_ignore_case(value, "https://") {
        ScanKind::Url
    } else if starts_with_ignore_case(value, "WIFI:") {
        ScanKind::Wifi
    } else {
        ScanKind::Text
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Dialog payload for an admitted scan: title, primary action and any
/// type-specific data the frontend needs to render the buttons.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPresentation {
    pub title: &'static str,
    pub primary_action: Option<&'static str>,
    /// Short form shown in place of the raw content (URL host, network name).
    pub display_text: String,
    pub wifi: Option<WifiCredentials>,
}

pub fn presentation_for(raw: &str, kind: ScanKind) -> ResultPresentation {
    let value = raw.trim();
    match kind {
        ScanKind::Url => ResultPresentation {
            title: "Website Link",
            primary_action: Some("Open Link"),
            display_text: url_host(value).unwrap_or_else(|| value.to_string()),
            wifi: None,
        },
        ScanKind::Wifi => {
            let credentials = wifi::parse(value);
            let display_text = if credentials.ssid.is_empty() {
                value.to_string()
            } else {
                format!("Network: {}", credentials.ssid)
            };
            ResultPresentation {
                title: "Wi-Fi Network",
                primary_action: Some("Connect"),
                display_text,
                wifi: Some(credentials),
            }
        }
        ScanKind::Text => {
            if looks_like_email(value) {
                ResultPresentation {
                    title: "Email Address",
                    primary_action: Some("Send Email"),
                    display_text: value.to_string(),
                    wifi: None,
                }
            } else if looks_like_phone(value) {
                ResultPresentation {
                    title: "Phone Number",
                    primary_action: Some("Call"),
                    display_text: value.to_string(),
                    wifi: None,
                }
            } else {
                ResultPresentation {
                    title: "Text Result",
                    primary_action: None,
                    display_text: value.to_string(),
                    wifi: None,
                }
            }
        }
    }
}

/// Extract the host from an http(s) URL for the dialog headline.
fn url_host(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .or_else(|| {
            if starts_with_ignore_case(url, "http://") {
                Some(&url[7..])
            } else if starts_with_ignore_case(url, "https://") {
                Some(&url[8..])
            } else {
                None
            }
        })?;

    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(rest)
        .split('@')
        .next_back()
        .unwrap_or(rest)
        .split(':')
        .next()
        .unwrap_or(rest);

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

pub fn looks_like_email(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((name, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !name.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn looks_like_phone(value: &str) -> bool {
    let trimmed = value.trim();
    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    let rest = digits.strip_prefix('+').unwrap_or(&digits);
    (5..=15).contains(&rest.len()) && rest.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_urls_case_insensitively() {
        assert_eq!(classify("https://example.com"), ScanKind::Url);
        assert_eq!(classify("HTTP://EXAMPLE.COM/path"), ScanKind::Url);
        assert_eq!(classify("  https://spaced.example  "), ScanKind::Url);
    }

    #[test]
    fn classifies_wifi_payloads() {
        assert_eq!(classify("WIFI:S:MyNet;T:WPA;P:secret;;"), ScanKind::Wifi);
        assert_eq!(classify("wifi:S:LowerNet;;"), ScanKind::Wifi);
    }

    #[test]
    fn everything_else_is_text() {
        assert_eq!(classify("hello world"), ScanKind::Text);
        assert_eq!(classify("ftp://example.com"), ScanKind::Text);
        assert_eq!(classify(""), ScanKind::Text);
        assert_eq!(classify("upi://pay?pa=x@bank"), ScanKind::Text);
    }

    #[test]
    fn detects_upi_prefix() {
        assert!(is_upi("upi://pay?pa=merchant@bank&pn=Shop"));
        assert!(!is_upi("UPI://pay"));
        assert!(!is_upi("https://upi.example"));
    }

    #[test]
    fn url_presentation_shows_host() {
        let p = presentation_for("https://news.example.org/a/b?c=1", ScanKind::Url);
        assert_eq!(p.title, "Website Link");
        assert_eq!(p.display_text, "news.example.org");
        assert_eq!(p.primary_action, Some("Open Link"));
    }

    #[test]
    fn url_presentation_falls_back_to_raw() {
        let p = presentation_for("https://", ScanKind::Url);
        assert_eq!(p.display_text, "https://");
    }

    #[test]
    fn wifi_presentation_carries_credentials() {
        let p = presentation_for("WIFI:S:MyNet;T:WPA;P:secret;H:false;;", ScanKind::Wifi);
        assert_eq!(p.display_text, "Network: MyNet");
        let creds = p.wifi.expect("credentials");
        assert_eq!(creds.ssid, "MyNet");
    }

    #[test]
    fn text_presentation_refines_email_and_phone() {
        let email = presentation_for("person@example.com", ScanKind::Text);
        assert_eq!(email.title, "Email Address");
        assert_eq!(email.primary_action, Some("Send Email"));

        let phone = presentation_for("+1 (555) 123-4567", ScanKind::Text);
        assert_eq!(phone.title, "Phone Number");
        assert_eq!(phone.primary_action, Some("Call"));

        let plain = presentation_for("just some text", ScanKind::Text);
        assert_eq!(plain.title, "Text Result");
        assert_eq!(plain.primary_action, None);
    }

    #[test]
    fn email_detection_rejects_near_misses() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("two words@example.com"));
        assert!(!looks_like_email("a@b.123"));
    }

    #[test]
    fn phone_detection_bounds() {
        assert!(looks_like_phone("5551234"));
        assert!(looks_like_phone("+44 20 7946 0958"));
        assert!(!looks_like_phone("123"));
        assert!(!looks_like_phone("call me maybe"));
        assert!(!looks_like_phone("12345678901234567890"));
    }
}
