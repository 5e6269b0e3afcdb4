//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod task;

pub type Responder<T> = tokio::sync::oneshot::Sender<T>;
pub type UnboundedSender<T> = tokio::sync::mpsc::UnboundedSender<T>;
pub type UnboundedReceiver<T> = tokio::sync::mpsc::UnboundedReceiver<T>;
