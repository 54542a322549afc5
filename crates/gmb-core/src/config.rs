use std::{env, io, path::Path};

use crate::{domain::ChatId, errors::Error, scheduler::RepeatingJob, Result};

pub const TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const CHAT_ID_VAR: &str = "GROUP_CHAT_ID";

/// Typed configuration, read once at startup and shared read-only afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    /// The managed group; rules broadcasts go here.
    pub target_chat_id: ChatId,
    pub rules_schedule: RepeatingJob,
}

impl Config {
    /// Load from the process environment, seeding it from `./.env` first.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup(TOKEN_VAR)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if telegram_bot_token.is_empty() {
            return Err(Error::Config(format!(
                "{TOKEN_VAR} environment variable is required"
            )));
        }

        let raw_chat_id = lookup(CHAT_ID_VAR).ok_or_else(|| {
            Error::Config(format!("{CHAT_ID_VAR} environment variable is required"))
        })?;
        let target_chat_id = raw_chat_id.trim().parse::<i64>().map_err(|e| {
            Error::Config(format!(
                "{CHAT_ID_VAR} must be an integer chat id (got {raw_chat_id:?}): {e}"
            ))
        })?;

        Ok(Self {
            telegram_bot_token,
            target_chat_id: ChatId(target_chat_id),
            rules_schedule: RepeatingJob::rules(),
        })
    }
}

fn load_dotenv_if_present(path: &Path) -> Result<()> {
    for (key, val) in dotenv_overlay(path, |key| env::var_os(key).is_some())? {
        env::set_var(key, val);
    }
    Ok(())
}

/// Entries of the dotenv file at `path` that are not already set. A missing file yields none.
fn dotenv_overlay(path: &Path, is_set: impl Fn(&str) -> bool) -> Result<Vec<(String, String)>> {
    let entries = match dotenv::from_path_iter(path) {
        Ok(entries) => entries,
        Err(dotenv::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(dotenv::Error::Io(e)) => return Err(e.into()),
        Err(e) => return Err(Error::Config(format!("{}: {e}", path.display()))),
    };

    let mut out = Vec::new();
    for entry in entries {
        let (key, val) = entry.map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        if is_set(&key) {
            continue; // do not override existing env
        }
        out.push((key, val));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn loads_token_and_negative_group_id() {
        let cfg = Config::from_lookup(lookup_from(&[
            (TOKEN_VAR, "123:abc"),
            (CHAT_ID_VAR, " -1001234567890 "),
        ]))
        .unwrap();
        assert_eq!(cfg.telegram_bot_token, "123:abc");
        assert_eq!(cfg.target_chat_id, ChatId(-1001234567890));
        assert_eq!(cfg.rules_schedule.first, Duration::from_secs(10));
        assert_eq!(cfg.rules_schedule.interval, Duration::from_secs(172_800));
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[(CHAT_ID_VAR, "100")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains(TOKEN_VAR)));
    }

    #[test]
    fn blank_token_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "   "), (CHAT_ID_VAR, "100")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_chat_id_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "t")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains(CHAT_ID_VAR)));
    }

    #[test]
    fn non_integer_chat_id_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "t"), (CHAT_ID_VAR, "@mygroup")]))
            .unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains("must be an integer")),
            other => panic!("unexpected error: {other}"),
        }
    }

    fn write_dotenv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("gmb-{name}-{}.env", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn dotenv_skips_comments_and_strips_quotes() {
        let path = write_dotenv(
            "quotes",
            "# comment\n\nTELEGRAM_TOKEN=\"abc\"\nGROUP_CHAT_ID='-42'\n",
        );
        let overlay = dotenv_overlay(&path, |_| false).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(
            overlay,
            vec![
                ("TELEGRAM_TOKEN".to_string(), "abc".to_string()),
                ("GROUP_CHAT_ID".to_string(), "-42".to_string()),
            ]
        );
    }

    #[test]
    fn dotenv_never_overrides_existing_variables() {
        let path = write_dotenv("existing", "TELEGRAM_TOKEN=abc\nGROUP_CHAT_ID=-42\n");
        let overlay = dotenv_overlay(&path, |key| key == CHAT_ID_VAR).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(
            overlay,
            vec![("TELEGRAM_TOKEN".to_string(), "abc".to_string())]
        );
    }

    #[test]
    fn missing_dotenv_file_is_fine() {
        let path = std::env::temp_dir().join(format!("gmb-absent-{}.env", std::process::id()));
        assert!(dotenv_overlay(&path, |_| false).unwrap().is_empty());
        assert!(load_dotenv_if_present(&path).is_ok());
    }
}
