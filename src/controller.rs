//! Threaded front-end for [`ChatSession`].
//!
//! The session itself is synchronous; this controller runs each transport
//! call on a named worker thread so a caller can keep rendering while an
//! exchange is in flight. The worker holds only a weak handle back to the
//! controller, so a reply that lands after the controller was dropped is
//! discarded instead of resurrecting it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread::{self, JoinHandle};

use crate::error::SessionError;
use crate::session::{ChatSession, SessionConfig};
use crate::transcript::Transcript;
use crate::transport::{AgentReply, AgentTransport, ExchangeId, ExchangeRequest, TransportError};
use crate::ui::UiState;

struct ActiveExchange {
    exchange_id: ExchangeId,
    join_handle: Option<JoinHandle<()>>,
}

pub struct ChatSessionController {
    session: Mutex<ChatSession>,
    transport: Arc<dyn AgentTransport>,
    active_exchange: Mutex<Option<ActiveExchange>>,
}

impl ChatSessionController {
    pub fn new(transport: Arc<dyn AgentTransport>, config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(ChatSession::with_config(config)),
            transport,
            active_exchange: Mutex::new(None),
        })
    }

    /// Opens an exchange for `text` and dispatches it on a worker thread.
    ///
    /// Returns `Ok(None)` for blank input and `Err(SessionError::Busy)` while
    /// an exchange is in flight, mirroring [`ChatSession::begin_send`]. When
    /// the worker cannot be spawned the exchange fails immediately; the user
    /// turn stays committed and the failure is reported through the session
    /// phase like any transport error.
    pub fn send(self: &Arc<Self>, text: &str) -> Result<Option<ExchangeId>, SessionError> {
        let mut active_exchange = self.lock_active_exchange();
        reap_finished_exchange(&mut active_exchange);

        let request = {
            let mut session = lock_unpoisoned(&self.session);
            match session.begin_send(text)? {
                Some(request) => request,
                None => return Ok(None),
            }
        };

        let exchange_id = request.exchange_id;
        match self.spawn_worker(request) {
            Ok(join_handle) => {
                *active_exchange = Some(ActiveExchange {
                    exchange_id,
                    join_handle: Some(join_handle),
                });
            }
            Err(error) => {
                let mut session = lock_unpoisoned(&self.session);
                session.fail_send(exchange_id, error);
            }
        }

        Ok(Some(exchange_id))
    }

    /// Blocks until the in-flight exchange, if any, has been folded into the
    /// session.
    pub fn wait_until_settled(&self) {
        let taken = {
            let mut active_exchange = self.lock_active_exchange();
            active_exchange.take()
        };

        let Some(mut active) = taken else {
            return;
        };

        if let Some(join_handle) = active.join_handle.take() {
            if join_handle.thread().id() != thread::current().id() {
                let _ = join_handle.join();
            }
        }
    }

    #[must_use]
    pub fn ui_state(&self) -> UiState {
        lock_unpoisoned(&self.session).ui_state()
    }

    /// Runs `read` against the session transcript under the session lock.
    pub fn with_transcript<R>(&self, read: impl FnOnce(&Transcript) -> R) -> R {
        let session = lock_unpoisoned(&self.session);
        read(session.transcript())
    }

    fn spawn_worker(self: &Arc<Self>, request: ExchangeRequest) -> Result<JoinHandle<()>, String> {
        let exchange_id = request.exchange_id;
        let transport = Arc::clone(&self.transport);
        let controller = Arc::downgrade(self);

        thread::Builder::new()
            .name(format!("chat-exchange-{exchange_id}"))
            .spawn(move || exchange_worker(controller, transport, request))
            .map_err(|error| format!("Failed to start exchange worker: {error}"))
    }

    fn apply_outcome(
        &self,
        exchange_id: ExchangeId,
        outcome: thread::Result<Result<AgentReply, TransportError>>,
    ) {
        let mut session = lock_unpoisoned(&self.session);
        match outcome {
            Ok(Ok(reply)) => {
                if let Err(error) = session.complete_send(exchange_id, &reply) {
                    session.fail_send(exchange_id, error.to_string());
                }
            }
            Ok(Err(error)) => session.fail_send(exchange_id, error.to_string()),
            Err(_) => session.fail_send(exchange_id, "Agent transport panicked"),
        }
    }

    fn clear_active_if_matching(&self, exchange_id: ExchangeId) {
        let mut active_exchange = self.lock_active_exchange();
        let matches =
            active_exchange.as_ref().map(|active| active.exchange_id) == Some(exchange_id);
        if !matches {
            return;
        }

        let Some(mut completed) = active_exchange.take() else {
            return;
        };

        if let Some(join_handle) = completed.join_handle.take() {
            let is_current_thread = join_handle.thread().id() == thread::current().id();
            if !is_current_thread && join_handle.is_finished() {
                let _ = join_handle.join();
            }
        }
    }

    fn lock_active_exchange(&self) -> MutexGuard<'_, Option<ActiveExchange>> {
        lock_unpoisoned(&self.active_exchange)
    }
}

fn exchange_worker(
    controller: Weak<ChatSessionController>,
    transport: Arc<dyn AgentTransport>,
    request: ExchangeRequest,
) {
    let exchange_id = request.exchange_id;
    let outcome = catch_unwind(AssertUnwindSafe(|| transport.send(&request)));

    let Some(controller) = controller.upgrade() else {
        return;
    };

    controller.apply_outcome(exchange_id, outcome);
    controller.clear_active_if_matching(exchange_id);
}

fn reap_finished_exchange(active_exchange: &mut Option<ActiveExchange>) {
    let finished = match active_exchange.as_ref() {
        Some(active) => match active.join_handle.as_ref() {
            Some(join_handle) => join_handle.is_finished(),
            None => true,
        },
        None => return,
    };

    if !finished {
        return;
    }

    if let Some(mut completed) = active_exchange.take() {
        if let Some(join_handle) = completed.join_handle.take() {
            let _ = join_handle.join();
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
