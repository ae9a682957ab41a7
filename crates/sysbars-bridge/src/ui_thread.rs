// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// UI-thread execution.
//
// `run_on_ui` marshals a closure onto whatever dispatcher owns the window and
// awaits its result through a oneshot channel. `DedicatedUiThread` is the
// dispatcher used where the platform does not provide a UI thread of its own
// (desktop, CI, tests).

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread::{self, JoinHandle, ThreadId};

use sysbars_core::error::{Result, SysBarsError};
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::traits::{UiDispatcher, UiTask};

/// Run `f` on the UI thread and await its return value.
pub async fn run_on_ui<T, F>(dispatcher: &dyn UiDispatcher, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    dispatcher.dispatch(Box::new(move || {
        // The receiver may already be gone if the caller was cancelled.
        let _ = tx.send(f());
    }))?;
    rx.await.map_err(|_| SysBarsError::UiTaskDropped)
}

/// A named OS thread that runs queued tasks one at a time.
pub struct DedicatedUiThread {
    sender: Mutex<Option<mpsc::Sender<UiTask>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl DedicatedUiThread {
    /// Spawn the thread. It lives until [`DedicatedUiThread::shutdown`] or drop.
    pub fn spawn(name: &str) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<UiTask>();
        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                for task in rx {
                    if catch_unwind(AssertUnwindSafe(task)).is_err() {
                        error!("UI task panicked");
                    }
                }
                debug!("UI thread queue closed");
            })?;
        let thread_id = handle.thread().id();
        debug!(name, "UI thread started");

        Ok(Self {
            sender: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            thread_id,
        })
    }

    /// Whether the calling thread is this UI thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Stop accepting tasks, drain the queue and join the thread.
    pub fn shutdown(&self) {
        self.sender.lock().expect("UI sender lock poisoned").take();
        let handle = self.handle.lock().expect("UI handle lock poisoned").take();
        if let Some(handle) = handle {
            // Joining from the UI thread itself would deadlock.
            if !self.is_current() && handle.join().is_err() {
                error!("UI thread terminated abnormally");
            }
        }
    }
}

impl UiDispatcher for DedicatedUiThread {
    fn dispatch(&self, task: UiTask) -> Result<()> {
        let guard = self.sender.lock().expect("UI sender lock poisoned");
        let sender = guard.as_ref().ok_or(SysBarsError::UiThreadUnavailable)?;
        sender
            .send(task)
            .map_err(|_| SysBarsError::UiThreadUnavailable)
    }
}

impl Drop for DedicatedUiThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
