//! The screen controller: observable state plus the dispatch sequence.
//!
//! # Design
//! `Screen` is a cheap `Clone` handle over shared state, so a button handler
//! can move a copy into a spawned task. Each dispatch:
//!
//! 1. raises the loading flag and clears the response panel,
//! 2. builds the request from the form as it is at that moment,
//! 3. awaits exactly one call through the transport,
//! 4. publishes the decoded response (or the error marker),
//! 5. lowers the loading flag.
//!
//! Step 5 runs on every exit path, including a panicking transport or an
//! aborted `spawn_dispatch` task. Under `ResultPolicy::LatestOnly` a
//! superseded dispatch skips steps 4 and 5, leaving them to the newest one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use echo_core::{
    decode_response, DispatchError, EchoClient, FormState, HttpResponse, Operation, ResponseState,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::{ReqwestTransport, Transport};

/// What happens when dispatches overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultPolicy {
    /// Every completion writes its result and clears the loading flag, even
    /// if a newer dispatch is still in flight.
    #[default]
    LastWriteWins,
    /// Only the most recently started dispatch may write; older completions
    /// are dropped.
    LatestOnly,
}

/// Controller for the request screen. Clones share the same state.
#[derive(Clone)]
pub struct Screen {
    inner: Arc<Inner>,
}

struct Inner {
    client: EchoClient,
    transport: Arc<dyn Transport>,
    policy: ResultPolicy,
    sequence: AtomicU64,
    form: watch::Sender<FormState>,
    response: watch::Sender<ResponseState>,
    loading: watch::Sender<bool>,
}

impl Screen {
    /// Screen bound to httpbin.org through reqwest.
    pub fn httpbin() -> Result<Self, DispatchError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new()?)))
    }

    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_options(EchoClient::new(), transport, ResultPolicy::default())
    }

    pub fn with_options(
        client: EchoClient,
        transport: Arc<dyn Transport>,
        policy: ResultPolicy,
    ) -> Self {
        let (form, _) = watch::channel(FormState::default());
        let (response, _) = watch::channel(ResponseState::Absent);
        let (loading, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                client,
                transport,
                policy,
                sequence: AtomicU64::new(0),
                form,
                response,
                loading,
            }),
        }
    }

    pub fn policy(&self) -> ResultPolicy {
        self.inner.policy
    }

    // --- form bindings ---

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.inner.form.send_modify(|form| form.name = name);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.inner.form.send_modify(|form| form.message = message);
    }

    pub fn set_status_code(&self, status_code: impl Into<String>) {
        let status_code = status_code.into();
        self.inner.form.send_modify(|form| form.status_code = status_code);
    }

    // --- snapshots ---

    pub fn form(&self) -> FormState {
        self.inner.form.borrow().clone()
    }

    pub fn response(&self) -> ResponseState {
        self.inner.response.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.inner.loading.borrow()
    }

    // --- subscriptions ---

    pub fn subscribe_form(&self) -> watch::Receiver<FormState> {
        self.inner.form.subscribe()
    }

    pub fn subscribe_response(&self) -> watch::Receiver<ResponseState> {
        self.inner.response.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    // --- dispatch ---

    /// Run one operation to completion. Results land in the observable state.
    pub async fn dispatch(&self, operation: Operation) {
        self.run(Ok(operation)).await
    }

    /// Dispatch by button label. Anything but the five labels shows the
    /// error marker without touching the network.
    pub async fn dispatch_named(&self, label: &str) {
        self.run(label.parse()).await
    }

    /// Fire-and-forget dispatch on the current tokio runtime.
    pub fn spawn_dispatch(&self, operation: Operation) -> JoinHandle<()> {
        let screen = self.clone();
        tokio::spawn(async move { screen.dispatch(operation).await })
    }

    async fn run(&self, operation: Result<Operation, DispatchError>) {
        let seq = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.loading.send_replace(true);
        // Lowers the flag when this future finishes, panics or is dropped.
        let _loading = LoadingGuard {
            inner: &self.inner,
            seq,
        };
        self.inner.response.send_replace(ResponseState::Absent);

        let state = match self.call(operation).await {
            Ok(response) => decode_response(&response),
            Err(err) => {
                warn!(seq, %err, "dispatch failed");
                ResponseState::Failed
            }
        };

        if self.inner.policy == ResultPolicy::LatestOnly && !self.inner.is_current(seq) {
            debug!(seq, "dropping superseded result");
            return;
        }
        self.inner.response.send_replace(state);
    }

    async fn call(
        &self,
        operation: Result<Operation, DispatchError>,
    ) -> Result<HttpResponse, DispatchError> {
        let operation = operation?;
        let request = {
            let form = self.inner.form.borrow();
            self.inner.client.build_request(operation, &form)?
        };
        debug!(%operation, method = %request.method, url = %request.url, "dispatching");
        let response = self.inner.transport.execute(request).await?;
        debug!(%operation, status = response.status, "response received");
        Ok(response)
    }
}

impl Inner {
    fn is_current(&self, seq: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == seq
    }
}

struct LoadingGuard<'a> {
    inner: &'a Inner,
    seq: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.inner.policy == ResultPolicy::LatestOnly && !self.inner.is_current(self.seq) {
            return;
        }
        self.inner.loading.send_replace(false);
    }
}
