use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::WrapErr;

use rollcall_directory::{LdapSettings, Secret};
use rollcall_provisioner::{PasswordPolicy, Prompter, SessionOptions};
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "ROLLCALL_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollcallConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub bind_credentials: BindCredentialSource,
    #[serde(default)]
    pub password_policy: PasswordPolicy,
    /// Container for permission-probe objects. Defaults to the domain's
    /// default user container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_container: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub url: String,
    pub bind_dn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dn: Option<String>,
    #[serde(default)]
    pub starttls: bool,
    #[serde(default)]
    pub no_tls_verify: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BindCredentialSource {
    Inline {
        password: String,
    },
    Environment {
        variable: String,
    },
    #[default]
    Prompt,
}

impl RollcallConfig {
    pub fn ldap_settings(&self) -> LdapSettings {
        LdapSettings {
            url: self.directory.url.clone(),
            bind_dn: self.directory.bind_dn.clone(),
            base_dn: self.directory.base_dn.clone(),
            starttls: self.directory.starttls,
            no_tls_verify: self.directory.no_tls_verify,
            timeout: Duration::from_secs(self.directory.timeout_secs),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            policy: self.password_policy,
            probe_container: self.probe_container.clone(),
        }
    }

    /// Password for the bind DN, from wherever the config says to get it.
    pub fn bind_password(&self, prompter: &dyn Prompter) -> eyre::Result<Secret> {
        let secret = match &self.bind_credentials {
            BindCredentialSource::Inline { password } => Secret::new(password.clone()),
            BindCredentialSource::Environment { variable } => std::env::var(variable)
                .map(Secret::new)
                .map_err(|e| eyre::eyre!("failed to read bind password from ${variable}: {e}"))?,
            BindCredentialSource::Prompt => {
                prompter.ask_secret(&format!("Password for {}", self.directory.bind_dn))?
            }
        };
        if secret.is_empty() {
            return Err(eyre::eyre!("bind password is empty"));
        }
        Ok(secret)
    }
}

/// `$ROLLCALL_CONFIG`, else `<config dir>/rollcall/config.json`.
pub fn config_path() -> eyre::Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("rollcall").join("config.json"))
}

pub fn load_config() -> eyre::Result<RollcallConfig> {
    load_config_from(&config_path()?)
}

/// Load and migrate the config at `path`.
///
/// A config written by an older version is rewritten in the current shape
/// when possible. Failing to rewrite it is only a warning; the migrated
/// config is still returned.
pub fn load_config_from(path: &Path) -> eyre::Result<RollcallConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    let (config, migrated) = parse_config(&contents)?;
    if migrated && let Err(e) = save_config(&config, path) {
        tracing::warn!(
            path = %path.display(),
            error = %format!("{e:#}"),
            "could not rewrite migrated config, continuing with it in memory"
        );
    }
    Ok(config)
}

/// Parse raw JSON, running migrations first. The flag reports whether any
/// migration ran.
pub fn parse_config(contents: &str) -> eyre::Result<(RollcallConfig, bool)> {
    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(contents)?;
    let on_disk_version = match json.get("config_version") {
        None | Some(serde_json::Value::Null) => 0,
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| eyre::eyre!("config_version {value} is not a valid version number"))?,
    };

    let migrated = migrate(json, on_disk_version)?;
    let mut config: RollcallConfig = serde_json::from_value(migrated)?;
    config.config_version = CURRENT_VERSION;
    Ok((config, on_disk_version < CURRENT_VERSION))
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update rollcall."
        ));
    }

    // v0 → v1: top-level `password_length` moved into `password_policy.length`
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        if let Some(length) = obj.remove("password_length") {
            let policy = obj
                .entry("password_policy")
                .or_insert_with(|| serde_json::json!({}));
            let policy = policy
                .as_object_mut()
                .ok_or_else(|| eyre::eyre!("password_policy is not a JSON object"))?;
            policy.entry("length").or_insert(length);
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (moved password_length)");
    }

    Ok(json)
}

pub fn save_config(config: &RollcallConfig, path: &Path) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent", path.display()))?;
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("failed to create config directory {}", dir.display()))?;

    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())
        .wrap_err_with(|| format!("failed to write {}", tmp_path.display()))?;

    // May hold an inline bind password.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))
            .wrap_err_with(|| format!("failed to restrict permissions on {}", tmp_path.display()))?;
    }

    std::fs::rename(&tmp_path, path).wrap_err_with(|| {
        format!("failed to move {} to {}", tmp_path.display(), path.display())
    })?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
