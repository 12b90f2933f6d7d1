use async_channel::Sender;
use notify::{recommended_watcher, EventKind, RecursiveMode, Result as NotifyResult, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clipboard_stack::EngineEvent;
use crate::config::Config;

/// Quiet period after the last write before the config is reloaded.
const DEBOUNCE: Duration = Duration::from_millis(500);

/// How often the watch loop checks for shutdown.
const STOP_POLL: Duration = Duration::from_millis(250);

/// Watches the config file and sends `ConfigChanged` into the engine inbox
pub struct ConfigWatcher {
    config_path: PathBuf,
    stop: Arc<AtomicBool>,
    watcher_thread: Option<thread::JoinHandle<()>>,
}

impl ConfigWatcher {
    pub fn new(config_path: PathBuf) -> Self {
        ConfigWatcher {
            config_path,
            stop: Arc::new(AtomicBool::new(false)),
            watcher_thread: None,
        }
    }

    /// Start watching.
    ///
    /// `reload` turns the file into a `Config` (the loader plus any
    /// command-line overrides) and runs on a background thread.
    pub fn start<F>(&mut self, sender: Sender<EngineEvent>, reload: F) -> NotifyResult<()>
    where
        F: Fn(&Path) -> Config + Send + Sync + 'static,
    {
        if self.watcher_thread.is_some() {
            return Err(std::io::Error::other("watcher already started").into());
        }

        let watch_dir = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        // The directory must exist to be watched; the file itself may not yet
        std::fs::create_dir_all(&watch_dir).map_err(notify::Error::io)?;

        let config_path = self.config_path.clone();
        let stop = Arc::clone(&self.stop);
        let reload = Arc::new(reload);

        let thread_handle = thread::Builder::new()
            .name("stack-clip-config-watcher".into())
            .spawn(move || {
                if let Err(e) = Self::watch_loop(&watch_dir, &config_path, sender, reload, stop) {
                    warn!(error = %e, watcher = "config", "Config watcher error");
                }
            })
            .map_err(notify::Error::io)?;

        self.watcher_thread = Some(thread_handle);
        Ok(())
    }

    /// Stop watching and wait for the watch thread.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.watcher_thread.take() {
            let _ = handle.join();
        }
    }

    /// Internal watch loop running in background thread
    fn watch_loop<F>(
        watch_dir: &Path,
        config_path: &Path,
        sender: Sender<EngineEvent>,
        reload: Arc<F>,
        stop: Arc<AtomicBool>,
    ) -> NotifyResult<()>
    where
        F: Fn(&Path) -> Config + Send + Sync + 'static,
    {
        let (watch_tx, watch_rx) = channel();
        let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = watch_tx.send(res);
        })?;
        watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

        info!(
            path = %config_path.display(),
            "Config watcher started"
        );

        let debounce_active = Arc::new(AtomicBool::new(false));

        while !stop.load(Ordering::SeqCst) {
            let event = match watch_rx.recv_timeout(STOP_POLL) {
                Ok(Ok(event)) => event,
                Ok(Err(e)) => {
                    warn!(error = %e, watcher = "config", "File watcher error");
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            if !is_config_event(&event.kind, &event.paths, config_path) {
                continue;
            }
            // One reload per burst of writes
            if debounce_active
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                continue;
            }

            let sender = sender.clone();
            let reload = Arc::clone(&reload);
            let debounce_flag = Arc::clone(&debounce_active);
            let path = config_path.to_path_buf();
            thread::spawn(move || {
                thread::sleep(DEBOUNCE);
                debounce_flag.store(false, Ordering::SeqCst);
                let config = reload(&path);
                info!(path = %path.display(), "Config file changed, reloading");
                if sender.send_blocking(EngineEvent::ConfigChanged(config)).is_err() {
                    debug!("Engine inbox closed, dropping config reload");
                }
            });
        }

        info!(watcher = "config", "Config watcher shutting down");
        Ok(())
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Whether a notify event is a create/modify/remove of the config file.
fn is_config_event(kind: &EventKind, paths: &[PathBuf], config_path: &Path) -> bool {
    let relevant_kind = matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    let file_name = config_path.file_name();
    relevant_kind
        && paths
            .iter()
            .any(|path| path == config_path || (file_name.is_some() && path.file_name() == file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    fn config_path() -> PathBuf {
        PathBuf::from("/home/user/.stackclip/config.json")
    }

    #[test]
    fn test_modify_of_config_file_is_relevant() {
        assert!(is_config_event(
            &EventKind::Modify(ModifyKind::Any),
            &[config_path()],
            &config_path()
        ));
        assert!(is_config_event(
            &EventKind::Create(CreateKind::File),
            &[PathBuf::from("/private/home/user/.stackclip/config.json")],
            &config_path()
        ));
    }

    #[test]
    fn test_other_files_are_ignored() {
        assert!(!is_config_event(
            &EventKind::Modify(ModifyKind::Any),
            &[PathBuf::from("/home/user/.stackclip/logs/stack-clip.jsonl")],
            &config_path()
        ));
    }

    #[test]
    fn test_access_events_are_ignored() {
        assert!(!is_config_event(
            &EventKind::Access(AccessKind::Any),
            &[config_path()],
            &config_path()
        ));
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut watcher = ConfigWatcher::new(config_path());
        watcher.stop();
    }
}
