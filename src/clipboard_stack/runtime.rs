//! Engine thread, poll ticker, and paste timers.
//!
//! The engine lives on one dedicated thread and owns all stack and detector
//! state. Everything else (the ticker, hotkey forwarder, config watcher, and
//! paste timers) only sends [`EngineEvent`]s into its inbox.

use anyhow::{Context, Result};
use async_channel::{Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::engine::{ClipboardEngine, Effect, EngineEvent, StackListener};
use super::restore::PendingPaste;
use super::stack::StackEntryView;
use crate::config::SharedConfig;
use crate::logging;
use crate::platform::{ClipboardPlatform, PasteSimulator};

/// Interval between clipboard change-counter polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

const INBOX_CAPACITY: usize = 256;

/// Builder for the engine thread.
pub struct EngineRuntime {
    config: SharedConfig,
    poll_interval: Duration,
    listener: Option<StackListener>,
}

impl EngineRuntime {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            config,
            poll_interval: POLL_INTERVAL,
            listener: None,
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn on_stack_changed<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&[StackEntryView]) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Spawn the engine and ticker threads.
    ///
    /// `make_platform` runs on the engine thread, so the clipboard backend
    /// never has to cross threads. Fails if the backend cannot be opened.
    pub fn start<F>(self, make_platform: F, simulator: Box<dyn PasteSimulator>) -> Result<EngineHandle>
    where
        F: FnOnce() -> crate::error::Result<Box<dyn ClipboardPlatform>> + Send + 'static,
    {
        let (sender, inbox) = async_channel::bounded::<EngineEvent>(INBOX_CAPACITY);
        let (ready_tx, ready_rx) = async_channel::bounded::<std::result::Result<(), String>>(1);
        let stop = Arc::new(AtomicBool::new(false));

        let EngineRuntime {
            config,
            poll_interval,
            listener,
        } = self;

        let timer_sender = sender.clone();
        let engine_thread = thread::Builder::new()
            .name("stack-clip-engine".into())
            .spawn(move || {
                let platform = match make_platform() {
                    Ok(platform) => platform,
                    Err(e) => {
                        let _ = ready_tx.send_blocking(Err(e.to_string()));
                        return;
                    }
                };
                let mut engine = ClipboardEngine::new(config, platform);
                if let Some(listener) = listener {
                    engine.set_listener(listener);
                }
                let _ = ready_tx.send_blocking(Ok(()));
                run_engine_loop(engine, inbox, timer_sender, simulator);
            })
            .context("Failed to spawn engine thread")?;

        match ready_rx.recv_blocking() {
            Ok(Ok(())) => {}
            Ok(Err(message)) => {
                let _ = engine_thread.join();
                anyhow::bail!("Failed to open clipboard backend: {}", message);
            }
            Err(_) => {
                let _ = engine_thread.join();
                anyhow::bail!("Engine thread exited during startup");
            }
        }

        let ticker_sender = sender.clone();
        let ticker_stop = Arc::clone(&stop);
        let ticker_thread = thread::Builder::new()
            .name("stack-clip-ticker".into())
            .spawn(move || run_ticker(ticker_sender, ticker_stop, poll_interval))
            .context("Failed to spawn poll ticker thread")?;

        info!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Clipboard engine started"
        );

        Ok(EngineHandle {
            sender,
            stop,
            engine_thread: Some(engine_thread),
            ticker_thread: Some(ticker_thread),
        })
    }
}

fn run_engine_loop(
    mut engine: ClipboardEngine,
    inbox: Receiver<EngineEvent>,
    sender: Sender<EngineEvent>,
    simulator: Box<dyn PasteSimulator>,
) {
    while let Ok(event) = inbox.recv_blocking() {
        if matches!(event, EngineEvent::Shutdown) {
            break;
        }
        for effect in engine.handle(event) {
            match effect {
                Effect::SchedulePaste(paste) => schedule_paste(sender.clone(), paste),
                Effect::SimulatePaste(paste) => perform_paste(simulator.as_ref(), &paste),
            }
        }
    }
    info!(depth = engine.stack().len(), "Clipboard engine stopped");
}

fn run_ticker(sender: Sender<EngineEvent>, stop: Arc<AtomicBool>, interval: Duration) {
    loop {
        thread::sleep(interval);
        if stop.load(Ordering::SeqCst) {
            break;
        }
        match sender.try_send(EngineEvent::Tick) {
            Ok(()) => {}
            // Engine is busy; the next tick will catch up
            Err(TrySendError::Full(_)) => debug!("Engine inbox full, skipping poll tick"),
            Err(TrySendError::Closed(_)) => break,
        }
    }
    debug!("Poll ticker stopped");
}

fn schedule_paste(sender: Sender<EngineEvent>, paste: PendingPaste) {
    let spawned = thread::Builder::new()
        .name("stack-clip-paste-timer".into())
        .spawn(move || {
            thread::sleep(paste.delay);
            let id = paste.id;
            if sender.send_blocking(EngineEvent::PasteDue(paste)).is_err() {
                debug!(correlation_id = %id, "Engine gone before paste was due");
            }
        });
    if let Err(e) = spawned {
        logging::log_error("PASTE", &e.to_string(), Some("spawning paste timer"));
    }
}

fn perform_paste(simulator: &dyn PasteSimulator, paste: &PendingPaste) {
    match simulator.simulate_paste() {
        Ok(()) => info!(
            correlation_id = %paste.id,
            digest = %paste.digest,
            delay_ms = paste.delay.as_millis() as u64,
            "Synthetic paste posted"
        ),
        Err(e) if e.is_degraded_mode() => warn!(
            correlation_id = %paste.id,
            error = %e,
            "Clipboard updated but auto-paste unavailable"
        ),
        Err(e) => logging::log_error("PASTE", &e.to_string(), Some(&paste.id.to_string())),
    }
}

/// Running engine. Dropping it shuts the threads down.
pub struct EngineHandle {
    sender: Sender<EngineEvent>,
    stop: Arc<AtomicBool>,
    engine_thread: Option<JoinHandle<()>>,
    ticker_thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Inbox sender for other event sources.
    pub fn sender(&self) -> Sender<EngineEvent> {
        self.sender.clone()
    }

    /// Queue an event, waiting if the inbox is full. False once stopped.
    pub fn send(&self, event: EngineEvent) -> bool {
        self.sender.send_blocking(event).is_ok()
    }

    /// Block until the engine thread exits.
    pub fn wait(&mut self) {
        if let Some(handle) = self.engine_thread.take() {
            let _ = handle.join();
        }
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.ticker_thread.take() {
            let _ = handle.join();
        }
    }

    /// Stop the ticker and the engine and wait for both.
    pub fn shutdown(&mut self) {
        if self.engine_thread.is_none() && self.ticker_thread.is_none() {
            return;
        }
        self.stop.store(true, Ordering::SeqCst);
        let _ = self.sender.send_blocking(EngineEvent::Shutdown);
        self.wait();
        info!("Clipboard engine shut down");
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
