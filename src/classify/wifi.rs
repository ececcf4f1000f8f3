use serde::{Deserialize, Serialize};

/// Security type carried in a `WIFI:` payload's `T:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WifiSecurity {
    Open,
    Wep,
    Wpa,
    Wpa2,
    Wpa3,
}

impl WifiSecurity {
    pub fn from_field(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "WEP" => Self::Wep,
            "WPA" => Self::Wpa,
            "WPA2" => Self::Wpa2,
            "WPA3" | "SAE" => Self::Wpa3,
            "NOPASS" | "" => Self::Open,
            // Unknown types are overwhelmingly PSK networks in practice
            _ => Self::Wpa2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::Wpa2 => "WPA2",
            Self::Wpa3 => "WPA3",
        }
    }
}

/// Credentials parsed from a `WIFI:S:<ssid>;T:<type>;P:<password>;H:<hidden>;;` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiCredentials {
    pub ssid: String,
    pub security: WifiSecurity,
    pub password: Option<String>,
    pub hidden: bool,
}

impl Default for WifiCredentials {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            security: WifiSecurity::Open,
            password: None,
            hidden: false,
        }
    }
}

/// Parse Wi-Fi credentials out of a scanned payload.
///
/// Total: any input yields credentials. Missing fields keep their defaults
/// (empty SSID, open security, no password, not hidden), so callers must
/// check `ssid` before acting. Field order is free and the `\;` `\:` `\\`
/// `\,` escapes of the format are honoured.
pub fn parse(raw: &str) -> WifiCredentials {
    let content = raw.trim();
    let content = if content.len() >= 5 && content.as_bytes()[..5].eq_ignore_ascii_case(b"WIFI:") {
        &content[5..]
    } else {
        content
    };

    let mut creds = WifiCredentials::default();

    for field in split_fields(content) {
        let Some((key, value)) = field.split_once(':') else {
            continue;
        };
        match key {
            "S" => creds.ssid = value.to_string(),
            "T" => creds.security = WifiSecurity::from_field(value),
            "P" => {
                creds.password = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "H" => creds.hidden = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    creds
}

/// Split on `;` separators, resolving backslash escapes within each field.
fn split_fields(content: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = content.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            ';' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        fields.push(current);
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_payload() {
        let creds = parse("WIFI:S:MyNet;T:WPA;P:secret;H:false;;");
        assert_eq!(creds.ssid, "MyNet");
        assert_eq!(creds.security, WifiSecurity::Wpa);
        assert_eq!(creds.password.as_deref(), Some("secret"));
        assert!(!creds.hidden);
    }

    #[test]
    fn field_order_is_free() {
        let creds = parse("WIFI:T:WPA2;S:HiddenNet;P:hunter2;H:true;;");
        assert_eq!(creds.ssid, "HiddenNet");
        assert_eq!(creds.security, WifiSecurity::Wpa2);
        assert_eq!(creds.password.as_deref(), Some("hunter2"));
        assert!(creds.hidden);
    }

    #[test]
    fn missing_fields_default() {
        let creds = parse("WIFI:S:OpenCafe;;");
        assert_eq!(creds.ssid, "OpenCafe");
        assert_eq!(creds.security, WifiSecurity::Open);
        assert_eq!(creds.password, None);
        assert!(!creds.hidden);
    }

    #[test]
    fn empty_password_field_means_open() {
        let creds = parse("WIFI:S:Net;T:nopass;P:;;");
        assert_eq!(creds.password, None);
        assert_eq!(creds.security, WifiSecurity::Open);
    }

    #[test]
    fn escaped_separators_stay_in_values() {
        let creds = parse(r"WIFI:S:Caf\;e\:Bar;T:WPA;P:p\\ss\,wd;;");
        assert_eq!(creds.ssid, "Caf;e:Bar");
        assert_eq!(creds.password.as_deref(), Some(r"p\ss,wd"));
    }

    #[test]
    fn garbage_input_yields_defaults() {
        let creds = parse("not a wifi code at all");
        assert_eq!(creds.ssid, "");
        assert_eq!(creds.password, None);
    }

    #[test]
    fn security_field_variants() {
        assert_eq!(WifiSecurity::from_field("WEP"), WifiSecurity::Wep);
        assert_eq!(WifiSecurity::from_field("sae"), WifiSecurity::Wpa3);
        assert_eq!(WifiSecurity::from_field("nopass"), WifiSecurity::Open);
        assert_eq!(WifiSecurity::from_field(""), WifiSecurity::Open);
        assert_eq!(WifiSecurity::from_field("WPA2-EAP"), WifiSecurity::Wpa2);
    }
}
