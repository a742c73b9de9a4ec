use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::Handler;
use futures::StreamExt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::launch::LaunchSpec;
use crate::{Error, Result};

/// File chromium writes its ephemeral debugging port into.
pub const DEVTOOLS_PORT_FILE: &str = "DevToolsActivePort";

const PORT_POLL_ATTEMPTS: u32 = 50;
const PORT_POLL_INTERVAL: Duration = Duration::from_millis(200);
const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);
const EXIT_GRACE: Duration = Duration::from_secs(5);

/// One launch strategy per engine family.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    async fn launch(&self, spec: LaunchSpec) -> Result<LaunchedEngine>;
}

/// Handle to a browser started by an [`EngineLauncher`].
#[async_trait]
pub trait EngineSession: Send {
    fn pid(&self) -> Option<u32>;

    /// Shuts the browser down and reaps its process.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A started engine: the controllable session plus a signal that fires
/// when the underlying process exits on its own.
pub struct LaunchedEngine {
    pub session: Box<dyn EngineSession>,
    pub exited: oneshot::Receiver<()>,
}

/// Launches chromium-family engines and drives them over the DevTools
/// protocol: the fingerprint script is registered before any page
/// navigates, so it runs in every document of the session.
#[derive(Debug, Default)]
pub struct CdpEngine;

struct CdpSession {
    browser: Browser,
    pid: Option<u32>,
    handler_task: JoinHandle<()>,
    wait_task: JoinHandle<()>,
}

#[async_trait]
impl EngineLauncher for CdpEngine {
    async fn launch(&self, spec: LaunchSpec) -> Result<LaunchedEngine> {
        // A port file left by a previous run would make the poll below
        // pick up a dead endpoint.
        let port_file = spec.profile_dir.join(DEVTOOLS_PORT_FILE);
        let _ = std::fs::remove_file(&port_file);

        let mut child = spawn_engine(&spec, build_cdp_args(&spec))?;
        let pid = child.id();

        let port = match wait_for_devtools_port(&port_file, &mut child).await {
            Ok(port) => port,
            Err(e) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(e);
            }
        };

        let (browser, handler) = match connect_with_retry(port).await {
            Ok(pair) => pair,
            Err(e) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(e);
            }
        };

        let handler_task = drain_events(handler);
        let (wait_task, exited) = watch_exit(child);
        let session = CdpSession {
            browser,
            pid,
            handler_task,
            wait_task,
        };

        if let Err(e) = arrange_first_tab(&session.browser, &spec).await {
            if let Err(close_err) = Box::new(session).close().await {
                tracing::debug!("cleanup after failed launch also failed: {close_err}");
            }
            return Err(e);
        }

        Ok(LaunchedEngine {
            session: Box::new(session),
            exited,
        })
    }
}

#[async_trait]
impl EngineSession for CdpSession {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        let close_result = this.browser.close().await;
        if let Err(e) = &close_result {
            tracing::debug!("browser close command failed, killing process: {e}");
            if let Some(pid) = this.pid {
                terminate_pid(pid);
            }
        }
        if tokio::time::timeout(EXIT_GRACE, &mut this.wait_task)
            .await
            .is_err()
        {
            if let Some(pid) = this.pid {
                terminate_pid(pid);
            }
            let _ = this.wait_task.await;
        }
        this.handler_task.abort();
        match close_result {
            Ok(_) => Ok(()),
            // With a known pid the kill fallback finished the job.
            Err(_) if this.pid.is_some() => Ok(()),
            Err(e) => Err(Error::Cdp(format!("failed to close browser: {e}"))),
        }
    }
}

/// Launches engines that expose no debugging protocol hook we use;
/// firefox profiles run through this one. The start page is handed over
/// on the command line and extensions load from the profile directory.
#[derive(Debug, Default)]
pub struct ProcessEngine;

struct ProcessSession {
    pid: Option<u32>,
    wait_task: JoinHandle<()>,
}

#[async_trait]
impl EngineLauncher for ProcessEngine {
    async fn launch(&self, spec: LaunchSpec) -> Result<LaunchedEngine> {
        if spec.init_script.is_some() {
            tracing::debug!(
                "engine {} has no document-script hook; skipping fingerprint script",
                spec.engine
            );
        }

        let child = spawn_engine(&spec, build_process_args(&spec))?;
        let pid = child.id();
        let (wait_task, exited) = watch_exit(child);

        Ok(LaunchedEngine {
            session: Box::new(ProcessSession { pid, wait_task }),
            exited,
        })
    }
}

#[async_trait]
impl EngineSession for ProcessSession {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        if let Some(pid) = this.pid {
            terminate_pid(pid);
        }
        match tokio::time::timeout(EXIT_GRACE, &mut this.wait_task).await {
            Ok(_) => Ok(()),
            Err(_) => Err(Error::Engine(
                "engine process did not exit after terminate".to_string(),
            )),
        }
    }
}

fn build_cdp_args(spec: &LaunchSpec) -> Vec<String> {
    let mut args = vec![
        // Port 0 lets the engine pick a free port; concurrent profiles
        // would collide on a fixed one.
        "--remote-debugging-port=0".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        format!("--user-data-dir={}", spec.profile_dir.display()),
    ];
    args.extend(spec.args.iter().cloned());
    // The start url is opened over the debugging session after the
    // fingerprint script is registered, never on the command line.
    args.push("about:blank".to_string());
    args
}

fn build_process_args(spec: &LaunchSpec) -> Vec<String> {
    let mut args = vec![
        "-profile".to_string(),
        spec.profile_dir.display().to_string(),
        "-no-remote".to_string(),
    ];
    args.extend(spec.args.iter().cloned());
    if let Some(url) = &spec.start_url {
        args.push(url.clone());
    }
    args
}

fn spawn_engine(spec: &LaunchSpec, args: Vec<String>) -> Result<Child> {
    tracing::debug!(
        "starting {} for profile {}",
        spec.executable.display(),
        spec.profile_id
    );
    Command::new(&spec.executable)
        .args(&args)
        .envs(&spec.env)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            Error::Engine(format!(
                "failed to start {}: {e}",
                spec.executable.display()
            ))
        })
}

/// Waits for the engine to publish its debugging port, bailing out as
/// soon as the process dies instead of polling into the void.
async fn wait_for_devtools_port(port_file: &Path, child: &mut Child) -> Result<u16> {
    for _ in 0..PORT_POLL_ATTEMPTS {
        if let Some(status) = child.try_wait()? {
            return Err(Error::Engine(format!(
                "engine exited during startup ({status})"
            )));
        }
        if let Ok(contents) = std::fs::read_to_string(port_file) {
            if let Some(port) = parse_devtools_port(&contents) {
                return Ok(port);
            }
        }
        tokio::time::sleep(PORT_POLL_INTERVAL).await;
    }
    Err(Error::Engine(format!(
        "engine never reported a debugging port (checked {})",
        port_file.display()
    )))
}

/// First line of the port file holds the chosen port; the second is a
/// browser endpoint path we do not need.
fn parse_devtools_port(contents: &str) -> Option<u16> {
    contents.lines().next()?.trim().parse().ok()
}

async fn connect_with_retry(port: u16) -> Result<(Browser, Handler)> {
    let url = format!("http://localhost:{port}");
    let mut retries = CONNECT_ATTEMPTS;
    loop {
        tracing::debug!("attempting debugging connection to {url}");
        match Browser::connect(&url).await {
            Ok(pair) => {
                tracing::debug!("debugging connection established");
                return Ok(pair);
            }
            Err(e) => {
                retries -= 1;
                if retries == 0 {
                    return Err(Error::Cdp(format!(
                        "failed to connect to the engine after {CONNECT_ATTEMPTS} attempts: {e}"
                    )));
                }
                tracing::debug!("connection attempt failed, retrying ({retries} left)");
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }
}

/// The handler stream must be pumped for any browser command to make
/// progress.
fn drain_events(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::debug!("devtools handler event error (continuing): {e}");
            }
        }
    })
}

fn watch_exit(mut child: Child) -> (JoinHandle<()>, oneshot::Receiver<()>) {
    let (exit_tx, exit_rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => tracing::debug!("engine process exited: {status}"),
            Err(e) => tracing::warn!("failed to wait on engine process: {e}"),
        }
        let _ = exit_tx.send(());
    });
    (task, exit_rx)
}

/// Registers the fingerprint script on the first tab and only then
/// opens the start url, so no page ever runs without the spoofed
/// identity in place.
async fn arrange_first_tab(browser: &Browser, spec: &LaunchSpec) -> Result<()> {
    // Give the engine a moment to create its initial tab.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let page = if let Some(page) = browser.pages().await?.first() {
        page.clone()
    } else {
        browser.new_page("about:blank").await?
    };

    if let Some(script) = &spec.init_script {
        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(script.clone()))
            .await
            .map_err(|e| Error::Cdp(format!("failed to register fingerprint script: {e}")))?;
    }

    if let Some(url) = &spec.start_url {
        if let Err(e) = page.goto(url.as_str()).await {
            tracing::warn!("could not open start url {url}: {e}");
        }
    }
    if let Err(e) = page.bring_to_front().await {
        tracing::debug!("bring_to_front failed: {e}");
    }
    Ok(())
}

fn terminate_pid(pid: u32) {
    #[cfg(unix)]
    {
        use std::process::Command;
        let _ = Command::new("kill").arg(pid.to_string()).output();
    }

    #[cfg(windows)]
    {
        use std::process::Command;
        let _ = Command::new("taskkill")
            .args(["/PID", &pid.to_string(), "/F"])
            .output();
    }
}
