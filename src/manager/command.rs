//! Commands sent to a running manager.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use super::engine::{ChartDispatch, ManagerSnapshot, PreloadOutcome, SwitchOutcome};
use crate::core::{CurrencyPair, Period, Side, SwitchError};

/// Request handled by `CurrencyManager::run`
#[derive(Debug)]
pub enum Command {
    SwitchPair {
        pair: CurrencyPair,
        reply: oneshot::Sender<Result<SwitchOutcome, SwitchError>>,
    },
    Swap {
        reply: oneshot::Sender<Result<SwitchOutcome, SwitchError>>,
    },
    SetPending {
        side: Side,
        code: String,
        reply: oneshot::Sender<Result<(), SwitchError>>,
    },
    CancelPending {
        reply: oneshot::Sender<()>,
    },
    Confirm {
        reply: oneshot::Sender<Result<SwitchOutcome, SwitchError>>,
    },
    SelectPeriod {
        period: Period,
        reply: oneshot::Sender<Result<ChartDispatch, SwitchError>>,
    },
    Preload {
        reply: oneshot::Sender<PreloadOutcome>,
    },
    Snapshot {
        reply: oneshot::Sender<ManagerSnapshot>,
    },
}

/// Failure of a command sent through a handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Rejected(#[from] SwitchError),
    #[error("currency manager has stopped")]
    Closed,
}

/// Cloneable sender side of a manager
#[derive(Debug, Clone)]
pub struct ManagerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ManagerHandle {
    /// Create a handle and the receiver to pass to `CurrencyManager::run`
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, CommandError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).map_err(|_| CommandError::Closed)?;
        rx.await.map_err(|_| CommandError::Closed)
    }

    pub async fn switch_pair(&self, pair: CurrencyPair) -> Result<SwitchOutcome, CommandError> {
        Ok(self
            .request(|reply| Command::SwitchPair { pair, reply })
            .await??)
    }

    pub async fn swap(&self) -> Result<SwitchOutcome, CommandError> {
        Ok(self.request(|reply| Command::Swap { reply }).await??)
    }

    pub async fn set_pending(&self, side: Side, code: &str) -> Result<(), CommandError> {
        let code = code.to_string();
        Ok(self
            .request(|reply| Command::SetPending { side, code, reply })
            .await??)
    }

    pub async fn cancel_pending(&self) -> Result<(), CommandError> {
        self.request(|reply| Command::CancelPending { reply }).await
    }

    pub async fn confirm(&self) -> Result<SwitchOutcome, CommandError> {
        Ok(self.request(|reply| Command::Confirm { reply }).await??)
    }

    pub async fn select_period(&self, period: Period) -> Result<ChartDispatch, CommandError> {
        Ok(self
            .request(|reply| Command::SelectPeriod { period, reply })
            .await??)
    }

    pub async fn preload(&self) -> Result<PreloadOutcome, CommandError> {
        self.request(|reply| Command::Preload { reply }).await
    }

    pub async fn snapshot(&self) -> Result<ManagerSnapshot, CommandError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_manager() {
        let (handle, rx) = ManagerHandle::channel();
        drop(rx);
        assert_eq!(handle.swap().await, Err(CommandError::Closed));
        assert!(matches!(handle.snapshot().await, Err(CommandError::Closed)));
    }

    #[tokio::test]
    async fn test_rejection_is_passed_through() {
        let (handle, mut rx) = ManagerHandle::channel();
        tokio::spawn(async move {
            if let Some(Command::Confirm { reply }) = rx.recv().await {
                let _ = reply.send(Err(SwitchError::NoPendingChanges));
            }
        });
        assert_eq!(
            handle.confirm().await,
            Err(CommandError::Rejected(SwitchError::NoPendingChanges))
        );
    }
}
