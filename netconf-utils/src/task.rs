//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task;
use tracing::{Instrument, trace};

/// Handle of a task created by [`Task::spawn`].
///
/// Dropping this handle cancels the task.
#[derive(Debug)]
pub struct Task<T> {
    join_handle: task::JoinHandle<T>,
}

// ===== impl Task =====

impl<T> Task<T> {
    /// Spawns a new asynchronous task, returning a handle for it.
    ///
    /// The task inherits the current tracing span.
    pub fn spawn<Fut>(future: Fut) -> Task<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Task {
            join_handle: task::spawn(future.in_current_span()),
        }
    }
}

impl Task<()> {
    /// Runs the provided future to completion in the background, without
    /// keeping a handle to it.
    ///
    /// Unlike [`Task::spawn`], this doesn't panic when called outside of a
    /// Tokio runtime. In that case the future is dropped without being
    /// polled.
    pub fn background<Fut>(future: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(future.in_current_span());
            }
            Err(_) => {
                trace!("no runtime available, dropping background task");
            }
        }
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        self.join_handle.abort();
    }
}
