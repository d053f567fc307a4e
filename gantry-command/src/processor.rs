//! Tick-driven command processor.

use crate::command::Command;
use crate::error::CommandError;
use crate::queue::CommandQueue;
use crate::tick::TickSource;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Processor configuration.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Maximum number of commands dequeued per tick. Guard-rejected
    /// commands count: the budget bounds dequeues, not completions.
    pub max_commands_per_tick: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_commands_per_tick: 1,
        }
    }
}

impl ProcessorConfig {
    /// Set the per-tick command budget.
    pub fn with_max_commands_per_tick(mut self, max: usize) -> Self {
        self.max_commands_per_tick = max;
        self
    }
}

struct CurrentCommand {
    name: String,
    token: CancellationToken,
}

/// Tick-driven command scheduler.
///
/// Subscribes to a [`TickSource`] on [`CommandProcessor::start`] and
/// drains its [`CommandQueue`] once per tick, up to the configured
/// budget. Commands never overlap: each tick spawns at most one drain
/// task, which executes its commands one after another while the tick
/// handler itself returns immediately. Commands mutate shared
/// application state, so serializing them avoids races without
/// per-command locking — throughput is bounded by input rate anyway.
///
/// `start` must be called within a tokio runtime; the runtime handle is
/// captured there so [`CommandProcessor::tick`] may also be driven
/// directly from a non-runtime engine callback.
#[derive(Clone)]
pub struct CommandProcessor {
    queue: CommandQueue,
    config: ProcessorConfig,
    running: Arc<AtomicBool>,
    draining: Arc<AtomicBool>,
    current: Arc<Mutex<Option<CurrentCommand>>>,
    lifetime: Arc<Mutex<Option<CancellationToken>>>,
    runtime: Arc<Mutex<Option<tokio::runtime::Handle>>>,
    listener: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl CommandProcessor {
    /// Create a processor with the default configuration.
    pub fn new(queue: CommandQueue) -> Self {
        Self::with_config(queue, ProcessorConfig::default())
    }

    /// Create a processor with custom configuration.
    pub fn with_config(queue: CommandQueue, config: ProcessorConfig) -> Self {
        debug!(
            max_commands_per_tick = config.max_commands_per_tick,
            "Creating command processor"
        );
        Self {
            queue,
            config,
            running: Arc::new(AtomicBool::new(false)),
            draining: Arc::new(AtomicBool::new(false)),
            current: Arc::new(Mutex::new(None)),
            lifetime: Arc::new(Mutex::new(None)),
            runtime: Arc::new(Mutex::new(None)),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Start processing: subscribe to the tick source.
    ///
    /// Starting an already-running processor logs a warning and is a
    /// no-op — the tick subscription is never duplicated.
    pub fn start(&self, ticks: &TickSource) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Command processor already running");
            return;
        }

        let lifetime = CancellationToken::new();
        *self.lifetime.lock() = Some(lifetime.clone());
        *self.runtime.lock() = Some(tokio::runtime::Handle::current());

        let mut receiver = ticks.subscribe();
        let processor = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = lifetime.cancelled() => break,
                    received = receiver.recv() => match received {
                        Ok(()) => processor.tick(),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            trace!(missed, "Tick listener lagged; ticks coalesce");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
        *self.listener.lock() = Some(handle);

        info!("Command processor started");
    }

    /// Stop processing: unsubscribe from the tick source and cancel any
    /// in-flight command.
    ///
    /// Stopping an already-stopped processor logs a warning and is a
    /// no-op.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Command processor already stopped");
            return;
        }

        if let Some(lifetime) = self.lifetime.lock().take() {
            lifetime.cancel();
        }
        if let Some(current) = self.current.lock().as_ref() {
            debug!(command = %current.name, "Cancelling in-flight command");
            current.token.cancel();
        }
        if let Some(listener) = self.listener.lock().take() {
            listener.abort();
        }
        *self.runtime.lock() = None;

        info!("Command processor stopped");
    }

    /// Process one tick.
    ///
    /// Invoked by the tick listener; public so an engine's per-frame
    /// callback can drive the processor directly. No-op while stopped,
    /// and no-op while a previous tick's commands are still executing —
    /// command execution never overlaps.
    pub fn tick(&self) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        if self.draining.swap(true, Ordering::SeqCst) {
            trace!("Command in flight, skipping tick");
            return;
        }
        if !self.queue.has_commands() {
            self.draining.store(false, Ordering::SeqCst);
            return;
        }

        let lifetime = self.lifetime.lock().clone();
        let runtime = self.runtime.lock().clone();
        let (Some(lifetime), Some(runtime)) = (lifetime, runtime) else {
            self.draining.store(false, Ordering::SeqCst);
            return;
        };

        let processor = self.clone();
        runtime.spawn(async move {
            processor.drain(lifetime).await;
        });
    }

    /// Serially execute up to the per-tick budget of commands.
    async fn drain(&self, lifetime: CancellationToken) {
        for _ in 0..self.config.max_commands_per_tick.max(1) {
            if !self.running.load(Ordering::SeqCst) || lifetime.is_cancelled() {
                break;
            }
            let Some(command) = self.queue.dequeue() else {
                break;
            };

            if !command.can_execute() {
                warn!(command = command.name(), "Guard rejected command, dropping");
                continue;
            }

            let token = lifetime.child_token();
            *self.current.lock() = Some(CurrentCommand {
                name: command.name().to_string(),
                token: token.clone(),
            });
            debug!(command = command.name(), "Executing command");

            // Run the body in its own task so a panic is contained and
            // routed like any other failure.
            let execution = {
                let command = command.clone();
                tokio::spawn(async move { command.execute(token).await })
            };

            match execution.await {
                Ok(Ok(())) => {
                    debug!(command = command.name(), "Command completed");
                    command.on_complete();
                }
                Ok(Err(CommandError::Cancelled)) => {
                    debug!(command = command.name(), "Command cancelled");
                }
                Ok(Err(failure)) => {
                    error!(command = command.name(), error = %failure, "Command failed");
                    command.on_failed(&failure);
                }
                Err(join_error) => {
                    let failure = CommandError::Execution(join_error.to_string());
                    error!(command = command.name(), error = %failure, "Command panicked");
                    command.on_failed(&failure);
                }
            }

            *self.current.lock() = None;
        }
        self.draining.store(false, Ordering::SeqCst);
    }

    /// Whether the processor is started.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether a tick's commands are currently executing.
    pub fn is_busy(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Name of the command currently executing, if any.
    pub fn current_command_name(&self) -> Option<String> {
        self.current.lock().as_ref().map(|c| c.name.clone())
    }

    /// The queue this processor drains.
    pub fn queue(&self) -> CommandQueue {
        self.queue.clone()
    }
}

impl gantry_core::Provider for CommandProcessor {}
