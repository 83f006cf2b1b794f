// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::errors::StageError;

/// Sending side of a stage: fans every value out to all its destinations.
///
/// Values reach each destination in the order they were sent. A destination
/// that stopped receiving is dropped; once none is left, [`Outbound::send`]
/// returns [`StageError::Closed`].
pub struct Outbound<O> {
    senders: Vec<mpsc::Sender<O>>,
    token: CancellationToken,
}

impl<O> Outbound<O> {
    pub(crate) fn new(senders: Vec<mpsc::Sender<O>>, token: CancellationToken) -> Self {
        Self { senders, token }
    }

    /// Number of destinations still receiving.
    pub fn destinations(&self) -> usize {
        self.senders.len()
    }

    pub fn is_closed(&self) -> bool {
        self.senders.is_empty()
    }
}

impl<O: Clone + Send + 'static> Outbound<O> {
    /// Sends `value` to every destination, waiting for room in each channel.
    ///
    /// Returns [`StageError::Cancelled`] if the execution token is cancelled
    /// while waiting.
    pub async fn send(&mut self, value: O) -> Result<(), StageError> {
        if self.token.is_cancelled() {
            return Err(StageError::Cancelled);
        }

        let mut closed = Vec::new();
        for (index, sender) in self.senders.iter().enumerate() {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return Err(StageError::Cancelled),
                sent = sender.send(value.clone()) => {
                    if sent.is_err() {
                        closed.push(index);
                    }
                }
            }
        }

        for index in closed.into_iter().rev() {
            self.senders.remove(index);
        }

        if self.senders.is_empty() {
            return Err(StageError::Closed);
        }
        Ok(())
    }
}

impl<O> Clone for Outbound<O> {
    fn clone(&self) -> Self {
        Self {
            senders: self.senders.clone(),
            token: self.token.clone(),
        }
    }
}

/// Receiving side of a stage, merging every upstream stage into one sequence.
pub struct Inbound<I> {
    receiver: mpsc::Receiver<I>,
    token: CancellationToken,
}

impl<I> Inbound<I> {
    pub(crate) fn new(receiver: mpsc::Receiver<I>, token: CancellationToken) -> Self {
        Self { receiver, token }
    }

    /// Next value, or `None` once every upstream finished or the execution
    /// token was cancelled.
    pub async fn recv(&mut self) -> Option<I> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            value = self.receiver.recv() => value,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
