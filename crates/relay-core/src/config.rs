use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    domain::{ChatId, UserId},
    errors::Error,
    Result,
};

/// Typed, immutable configuration for the relay.
///
/// Built once at startup and shared as `Arc<Config>`.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub source_chat_id: ChatId,
    pub target_chat_id: ChatId,

    // Admins
    pub main_admin_id: UserId,
    pub admin_ids: Vec<UserId>,

    // Storage
    pub replacement_file: PathBuf,
    pub blocked_file: PathBuf,

    // Outbound
    pub dispatch_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process env in `load`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let bot_token = get("BOT_TOKEN")
            .or_else(|| get("TELEGRAM_BOT_TOKEN"))
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let main_admin_id = UserId(required_id("MAIN_ADMIN_ID", get("MAIN_ADMIN_ID"))?);
        let source_chat_id = ChatId(required_id("SOURCE_CHAT_ID", get("SOURCE_CHAT_ID"))?);
        let target_chat_id = ChatId(required_id("TARGET_CHAT_ID", get("TARGET_CHAT_ID"))?);

        let admin_ids = parse_csv_i64("ADMIN_IDS", get("ADMIN_IDS"))?
            .into_iter()
            .map(UserId)
            .collect();

        let replacement_file =
            PathBuf::from(get("REPLACEMENT_FILE").unwrap_or("replacements.json".to_string()));
        let blocked_file = PathBuf::from(get("BLOCKED_FILE").unwrap_or("blocked.json".to_string()));

        let dispatch_timeout = match get("DISPATCH_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(Error::Config(format!(
                        "DISPATCH_TIMEOUT_MS must be a positive integer, got {raw:?}"
                    )))
                }
            },
            None => Duration::from_millis(30_000),
        };

        Ok(Self {
            bot_token,
            source_chat_id,
            target_chat_id,
            main_admin_id,
            admin_ids,
            replacement_file,
            blocked_file,
            dispatch_timeout,
        })
    }

    /// Primary admin first, then any additional ids (deduplicated).
    pub fn authorized_admins(&self) -> Vec<UserId> {
        let mut out = vec![self.main_admin_id];
        for id in &self.admin_ids {
            if !out.contains(id) {
                out.push(*id);
            }
        }
        out
    }
}

fn required_id(key: &str, raw: Option<String>) -> Result<i64> {
    let raw = raw.ok_or_else(|| Error::Config(format!("{key} environment variable is required")))?;
    match raw.trim().parse::<i64>() {
        Ok(0) => Err(Error::Config(format!("{key} must be non-zero"))),
        Ok(v) => Ok(v),
        Err(_) => Err(Error::Config(format!(
            "{key} must be a numeric Telegram id, got {raw:?}"
        ))),
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn parse_csv_i64(key: &str, v: Option<String>) -> Result<Vec<i64>> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                Error::Config(format!("{key} must be a comma-separated list of ids, got {s:?}"))
            })
        })
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("BOT_TOKEN", "123:abc"),
        ("MAIN_ADMIN_ID", "42"),
        ("SOURCE_CHAT_ID", "-1001"),
        ("TARGET_CHAT_ID", "-1002"),
    ];

    fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut v: Vec<_> = BASE
            .iter()
            .filter(|(k, _)| !extra.iter().any(|(ek, _)| ek == k))
            .copied()
            .collect();
        v.extend_from_slice(extra);
        v
    }

    #[test]
    fn loads_required_values_and_defaults() {
        let cfg = Config::from_lookup(lookup(BASE)).unwrap();
        assert_eq!(cfg.bot_token, "123:abc");
        assert_eq!(cfg.source_chat_id, ChatId(-1001));
        assert_eq!(cfg.target_chat_id, ChatId(-1002));
        assert_eq!(cfg.replacement_file, PathBuf::from("replacements.json"));
        assert_eq!(cfg.blocked_file, PathBuf::from("blocked.json"));
        assert_eq!(cfg.dispatch_timeout, Duration::from_secs(30));
        assert_eq!(cfg.authorized_admins(), vec![UserId(42)]);
    }

    #[test]
    fn admin_ids_extend_the_main_admin() {
        let cfg = Config::from_lookup(lookup(&with(&[("ADMIN_IDS", "7, 42,9")]))).unwrap();
        assert_eq!(
            cfg.authorized_admins(),
            vec![UserId(42), UserId(7), UserId(9)]
        );
    }

    #[test]
    fn missing_required_value_is_a_config_error() {
        let pairs: Vec<_> = BASE
            .iter()
            .filter(|(k, _)| *k != "TARGET_CHAT_ID")
            .copied()
            .collect();
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("TARGET_CHAT_ID")));
    }

    #[test]
    fn malformed_values_are_config_errors() {
        for bad in [
            ("MAIN_ADMIN_ID", "abc"),
            ("MAIN_ADMIN_ID", "0"),
            ("SOURCE_CHAT_ID", "-100x"),
            ("ADMIN_IDS", "1,two"),
            ("DISPATCH_TIMEOUT_MS", "0"),
        ] {
            let err = Config::from_lookup(lookup(&with(&[bad]))).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "expected config error for {bad:?}");
        }
    }

    #[test]
    fn blank_token_is_rejected() {
        let err = Config::from_lookup(lookup(&with(&[("BOT_TOKEN", "   ")]))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
