use kestrel_core::config::AppConfig;
use kestrel_core::record::{EngineKind, ProfileRecord, ProxySettings};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Automation-detection suppression flag passed to chromium launches.
pub const AUTOMATION_FLAG: &str = "--disable-blink-features=AutomationControlled";

/// Everything an engine adapter needs to start a profile's browser.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub profile_id: String,
    pub profile_dir: PathBuf,
    pub executable: PathBuf,
    pub engine: EngineKind,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Full proxy settings as stored, credentials included; the flags
    /// in `args` only cover the server and bypass list.
    pub proxy: Option<ProxySettings>,
    pub start_url: Option<String>,
    /// Script registered to run before any page script; chromium only.
    pub init_script: Option<String>,
}

/// Assembles the launch configuration for a profile.
///
/// Chromium launches carry the automation-suppression flag, extension
/// flags for the resolved unpacked extensions, proxy flags, and the
/// fingerprint's user agent and language. Firefox loads extensions from
/// the bundles staged in the profile directory instead of flags, so its
/// argument list is only the config, per-profile and per-invocation
/// extras. Argument order is fixed: built-ins, config defaults,
/// per-profile custom args, then per-invocation extras.
pub fn build_launch_spec(
    record: &ProfileRecord,
    config: &AppConfig,
    executable: PathBuf,
    extensions: &[PathBuf],
    extra_args: &[String],
) -> LaunchSpec {
    let mut args = Vec::new();
    if record.engine == EngineKind::Chromium {
        args.push(AUTOMATION_FLAG.to_string());
        if !extensions.is_empty() {
            let joined = extensions
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(",");
            args.push(format!("--disable-extensions-except={joined}"));
            args.push(format!("--load-extension={joined}"));
        }
        if let Some(proxy) = &record.proxy {
            args.push(format!("--proxy-server={}", proxy.server));
            if let Some(bypass) = &proxy.bypass {
                args.push(format!("--proxy-bypass-list={bypass}"));
            }
        }
        if record.fingerprint_enabled {
            if let Some(fingerprint) = &record.fingerprint {
                args.push(format!("--user-agent={}", fingerprint.user_agent));
                args.push(format!("--lang={}", fingerprint.language));
            }
        }
    }
    args.extend(config.default_args.iter().cloned());
    if let Some(custom) = &record.custom_args {
        args.extend(custom.split_whitespace().map(str::to_string));
    }
    args.extend(extra_args.iter().cloned());

    let init_script = (record.engine == EngineKind::Chromium && record.fingerprint_enabled)
        .then(|| record.fingerprint.as_ref().map(|fp| fp.evasion_script()))
        .flatten();

    LaunchSpec {
        profile_id: record.id.clone(),
        profile_dir: record.path.clone(),
        executable,
        engine: record.engine,
        args,
        env: config.env.clone(),
        proxy: record.proxy.clone(),
        start_url: record.start_url.clone(),
        init_script,
    }
}
