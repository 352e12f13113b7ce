//! Async drivers for the search and lookup coordinators.
//!
//! Each coordinator is owned by one task. Intents arrive over an `mpsc`
//! channel, the debounce timer is a single `sleep_until` re-armed from the
//! coordinator's deadline, fetches run as spawned tasks that report back
//! over a result channel, and the current view goes out on a `watch`
//! channel. Starting a new fetch aborts the previous one.

use std::sync::Arc;

use smp_core::pagination::{LookupPage, PageResult};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::backend::RegistryBackend;
use crate::config::ClientConfig;
use crate::coordinator::{Effect, SearchCoordinator, SearchIntent, SearchView};
use crate::error::ClientError;
use crate::lookup::{LookupCoordinator, LookupEffect};
use crate::model::{InspectionRecord, SmpOption};

const INTENT_BUFFER: usize = 64;

type SearchOutcome = (u64, Result<PageResult<InspectionRecord>, ClientError>);
type LookupOutcome = (u64, Result<LookupPage<SmpOption>, ClientError>);

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Handle to a running search driver.
///
/// Dropping the handle closes the intent channel, which stops the driver.
pub struct SearchHandle {
    intents: mpsc::Sender<SearchIntent>,
    view: watch::Receiver<SearchView>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SearchHandle {
    pub async fn send(&self, intent: SearchIntent) -> Result<(), ClientError> {
        self.intents.send(intent).await.map_err(|_| ClientError::Stopped)
    }

    /// Receiver for view snapshots; `changed()` fires on every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view.clone()
    }

    /// The latest published view.
    pub fn view(&self) -> SearchView {
        self.view.borrow().clone()
    }

    /// Stop the driver and wait for it to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Search driver task failed");
        }
    }
}

/// Spawn the search driver. The initial query is dispatched immediately.
pub fn spawn_search<B: RegistryBackend>(
    backend: Arc<B>,
    config: &ClientConfig,
    cancel: CancellationToken,
) -> SearchHandle {
    let coordinator = SearchCoordinator::new(config.search_debounce, config.default_per_page);
    let (intent_tx, intent_rx) = mpsc::channel(INTENT_BUFFER);
    let (view_tx, view_rx) = watch::channel(coordinator.view().clone());

    let task = tokio::spawn(run_search(
        backend,
        coordinator,
        intent_rx,
        view_tx,
        cancel.clone(),
    ));

    SearchHandle {
        intents: intent_tx,
        view: view_rx,
        cancel,
        task,
    }
}

async fn run_search<B: RegistryBackend>(
    backend: Arc<B>,
    mut coordinator: SearchCoordinator,
    mut intents: mpsc::Receiver<SearchIntent>,
    view_tx: watch::Sender<SearchView>,
    cancel: CancellationToken,
) {
    let (result_tx, mut results) = mpsc::unbounded_channel::<SearchOutcome>();
    let mut in_flight: Option<JoinHandle<()>> = None;

    tracing::debug!("Search driver started");
    let effect = coordinator.start();
    perform_search(effect, &backend, &result_tx, &mut in_flight);
    publish(&view_tx, coordinator.view());

    loop {
        let effect = tokio::select! {
            _ = cancel.cancelled() => break,
            intent = intents.recv() => match intent {
                Some(intent) => coordinator.on_intent(Instant::now(), intent),
                None => break,
            },
            _ = until(coordinator.deadline()) => coordinator.on_deadline(Instant::now()),
            Some((seq, result)) = results.recv() => {
                coordinator.on_result(seq, result);
                Effect::None
            }
        };
        perform_search(effect, &backend, &result_tx, &mut in_flight);
        publish(&view_tx, coordinator.view());
    }

    if let Some(task) = in_flight.take() {
        task.abort();
    }
    tracing::debug!("Search driver stopped");
}

fn perform_search<B: RegistryBackend>(
    effect: Effect,
    backend: &Arc<B>,
    result_tx: &mpsc::UnboundedSender<SearchOutcome>,
    in_flight: &mut Option<JoinHandle<()>>,
) {
    let Effect::Dispatch { seq, query } = effect else {
        return;
    };
    let backend = Arc::clone(backend);
    let tx = result_tx.clone();
    replace_in_flight(
        in_flight,
        tokio::spawn(async move {
            let result = backend.search(&query).await;
            // The driver may already be gone; nothing to report to.
            let _ = tx.send((seq, result));
        }),
    );
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCommand {
    Input(String),
    Preset(SmpOption),
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupView {
    pub items: Vec<SmpOption>,
    pub has_more: bool,
}

pub struct LookupHandle {
    commands: mpsc::Sender<LookupCommand>,
    view: watch::Receiver<LookupView>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl LookupHandle {
    pub async fn input(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.send(LookupCommand::Input(text.into())).await
    }

    pub async fn send(&self, command: LookupCommand) -> Result<(), ClientError> {
        self.commands.send(command).await.map_err(|_| ClientError::Stopped)
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupView> {
        self.view.clone()
    }

    pub fn view(&self) -> LookupView {
        self.view.borrow().clone()
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Lookup driver task failed");
        }
    }
}

pub fn spawn_lookup<B: RegistryBackend>(
    backend: Arc<B>,
    config: &ClientConfig,
    cancel: CancellationToken,
) -> LookupHandle {
    let coordinator = LookupCoordinator::new(config.lookup_debounce, config.lookup_min_chars);
    let (command_tx, command_rx) = mpsc::channel(INTENT_BUFFER);
    let (view_tx, view_rx) = watch::channel(LookupView::default());

    let task = tokio::spawn(run_lookup(
        backend,
        coordinator,
        command_rx,
        view_tx,
        cancel.clone(),
    ));

    LookupHandle {
        commands: command_tx,
        view: view_rx,
        cancel,
        task,
    }
}

async fn run_lookup<B: RegistryBackend>(
    backend: Arc<B>,
    mut coordinator: LookupCoordinator,
    mut commands: mpsc::Receiver<LookupCommand>,
    view_tx: watch::Sender<LookupView>,
    cancel: CancellationToken,
) {
    let (result_tx, mut results) = mpsc::unbounded_channel::<LookupOutcome>();
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        let effect = tokio::select! {
            _ = cancel.cancelled() => break,
            command = commands.recv() => match command {
                Some(LookupCommand::Input(text)) => coordinator.on_input(Instant::now(), &text),
                Some(LookupCommand::Preset(option)) => {
                    coordinator.preset(option);
                    LookupEffect::None
                }
                Some(LookupCommand::Reset) => {
                    coordinator.reset();
                    LookupEffect::None
                }
                None => break,
            },
            _ = until(coordinator.deadline()) => coordinator.on_deadline(Instant::now()),
            Some((seq, result)) = results.recv() => {
                coordinator.on_result(seq, result);
                LookupEffect::None
            }
        };

        if let LookupEffect::Dispatch { seq, term } = effect {
            let backend = Arc::clone(&backend);
            let tx = result_tx.clone();
            replace_in_flight(
                &mut in_flight,
                tokio::spawn(async move {
                    let result = backend.lookup_smp(&term, 1).await;
                    let _ = tx.send((seq, result));
                }),
            );
        }

        publish(
            &view_tx,
            &LookupView {
                items: coordinator.items().to_vec(),
                has_more: coordinator.has_more(),
            },
        );
    }

    if let Some(task) = in_flight.take() {
        task.abort();
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolves at `deadline`, or never when there is none.
async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn replace_in_flight(slot: &mut Option<JoinHandle<()>>, next: JoinHandle<()>) {
    if let Some(previous) = slot.replace(next) {
        previous.abort();
    }
}

/// Publish `view` only when it differs from the current snapshot.
fn publish<V: Clone + PartialEq>(tx: &watch::Sender<V>, view: &V) {
    tx.send_if_modified(|current| {
        if current == view {
            false
        } else {
            *current = view.clone();
            true
        }
    });
}
