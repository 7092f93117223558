use std::fmt;

/// Every key that must be present (with `EMAIL_ENABLED=true`) before notifications go out.
pub const EMAIL_KEYS: [&str; 7] = [
    "EMAIL_ENABLED",
    "SMTP_HOST",
    "SMTP_PORT",
    "SMTP_USER",
    "SMTP_PASS",
    "EMAIL_FROM",
    "EMAIL_TO",
];

const IMPLICIT_TLS_PORT: u16 = 465;

/// Resolved state of the e-mail notification options.
///
/// Only [`EmailConfig::Enabled`] activates notifications. The other states describe why the
/// feature is inactive so the server can say so in its logs; none of them is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailConfig {
    Disabled,
    Incomplete { missing: Vec<&'static str> },
    Invalid { reason: String },
    Enabled(EmailSettings),
}

impl EmailConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup("EMAIL_ENABLED").as_deref() != Some("true") {
            return Self::Disabled;
        }

        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let host = read("SMTP_HOST");
        let port = read("SMTP_PORT");
        let username = read("SMTP_USER");
        let password = read("SMTP_PASS");
        let from = read("EMAIL_FROM");
        let to = read("EMAIL_TO");

        let missing: Vec<&'static str> = [
            ("SMTP_HOST", host.is_none()),
            ("SMTP_PORT", port.is_none()),
            ("SMTP_USER", username.is_none()),
            ("SMTP_PASS", password.is_none()),
            ("EMAIL_FROM", from.is_none()),
            ("EMAIL_TO", to.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(host), Some(port), Some(username), Some(password), Some(from), Some(to)) =
            (host, port, username, password, from, to)
        else {
            return Self::Incomplete { missing };
        };

        let port = match port.trim().parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                return Self::Invalid {
                    reason: format!("SMTP_PORT '{port}' is not a valid port number"),
                }
            }
        };

        Self::Enabled(EmailSettings {
            host,
            port,
            implicit_tls: port == IMPLICIT_TLS_PORT,
            username,
            password,
            from,
            to,
        })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn settings(&self) -> Option<&EmailSettings> {
        match self {
            Self::Enabled(settings) => Some(settings),
            _ => None,
        }
    }
}

/// Complete SMTP delivery settings for inquiry notifications.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub host: String,
    pub port: u16,
    /// TLS from the first byte (port 465) rather than a STARTTLS upgrade.
    pub implicit_tls: bool,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("implicit_tls", &self.implicit_tls)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("EMAIL_ENABLED", "true"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "587"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASS", "app-password"),
            ("EMAIL_FROM", "noreply@sgglobaladvisors.com"),
            ("EMAIL_TO", "contact@sgglobaladvisors.com"),
        ])
    }

    fn resolve(map: &HashMap<&'static str, &'static str>) -> EmailConfig {
        EmailConfig::from_lookup(|key| map.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn complete_options_enable_notifications() {
        let config = resolve(&complete());
        let settings = config.settings().expect("email enabled");
        assert_eq!(settings.host, "smtp.example.com");
        assert_eq!(settings.port, 587);
        assert!(!settings.implicit_tls);
        assert_eq!(settings.to, "contact@sgglobaladvisors.com");
    }

    #[test]
    fn port_465_uses_implicit_tls() {
        let mut map = complete();
        map.insert("SMTP_PORT", "465");
        let config = resolve(&map);
        assert!(config.settings().expect("enabled").implicit_tls);
    }

    #[test]
    fn enabled_flag_must_be_exactly_true() {
        for flag in ["TRUE", "1", "yes", ""] {
            let mut map = complete();
            map.insert("EMAIL_ENABLED", flag);
            assert_eq!(resolve(&map), EmailConfig::Disabled, "flag {flag:?}");
        }

        let mut map = complete();
        map.remove("EMAIL_ENABLED");
        assert_eq!(resolve(&map), EmailConfig::Disabled);
    }

    #[test]
    fn missing_keys_are_reported() {
        let mut map = complete();
        map.remove("SMTP_PASS");
        map.insert("EMAIL_TO", "   ");
        match resolve(&map) {
            EmailConfig::Incomplete { missing } => {
                assert_eq!(missing, vec!["SMTP_PASS", "EMAIL_TO"]);
            }
            other => panic!("expected incomplete config, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_port_is_invalid() {
        let mut map = complete();
        map.insert("SMTP_PORT", "smtp");
        assert!(matches!(resolve(&map), EmailConfig::Invalid { .. }));
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = resolve(&complete());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("app-password"));
        assert!(rendered.contains("<redacted>"));
    }
}
