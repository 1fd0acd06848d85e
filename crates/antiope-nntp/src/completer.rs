//! Write-once result slot shared between the inbound message handler and the
//! callers awaiting a response.

use tokio::sync::watch;

use crate::framer::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState<T> {
    Unresolved,
    Resolved(T),
    Failed(ProtoError),
}

impl<T> SlotState<T> {
    pub fn is_settled(&self) -> bool {
        !matches!(self, SlotState::Unresolved)
    }
}

/// Producer half of a result slot.
///
/// Settling consumes the completer, so a slot can transition out of
/// `Unresolved` only once.
#[derive(Debug)]
pub struct Completer<T> {
    tx: watch::Sender<SlotState<T>>,
}

/// Consumer half of a result slot. Clone it to add readers.
#[derive(Debug, Clone)]
pub struct Completion<T> {
    rx: watch::Receiver<SlotState<T>>,
}

impl<T: Clone> Completer<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SlotState::Unresolved);
        Self { tx }
    }

    pub fn completion(&self) -> Completion<T> {
        Completion {
            rx: self.tx.subscribe(),
        }
    }

    pub fn complete(self, value: T) {
        self.tx.send_replace(SlotState::Resolved(value));
    }

    pub fn fail(self, err: ProtoError) {
        self.tx.send_replace(SlotState::Failed(err));
    }

    pub fn settle(self, outcome: Result<T, ProtoError>) {
        match outcome {
            Ok(value) => self.complete(value),
            Err(err) => self.fail(err),
        }
    }
}

impl<T: Clone> Default for Completer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Completion<T> {
    /// Wait until the slot settles and return its value.
    ///
    /// Returns immediately once settled. A completer dropped without settling
    /// yields [`ProtoError::Abandoned`].
    pub async fn wait(&self) -> Result<T, ProtoError> {
        let mut rx = self.rx.clone();
        let state = match rx.wait_for(SlotState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => return Err(ProtoError::Abandoned),
        };
        match state {
            SlotState::Resolved(value) => Ok(value),
            SlotState::Failed(err) => Err(err),
            SlotState::Unresolved => Err(ProtoError::Abandoned),
        }
    }

    /// Current state without suspending.
    pub fn peek(&self) -> SlotState<T> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    #[test]
    fn unresolved_slot_does_not_yield() {
        let completer = Completer::<u32>::new();
        let completion = completer.completion();
        assert_eq!(completion.peek(), SlotState::Unresolved);
        assert!(completion.wait().now_or_never().is_none());
    }

    #[tokio::test]
    async fn every_reader_sees_the_same_value() {
        let completer = Completer::new();
        let first = completer.completion();
        let second = first.clone();
        let third = completer.completion();

        let waiter = tokio::spawn(async move { first.wait().await });
        tokio::task::yield_now().await;
        completer.complete("done".to_string());

        assert_eq!(waiter.await.unwrap(), Ok("done".to_string()));
        assert_eq!(second.wait().await, Ok("done".to_string()));
        assert_eq!(third.wait().await, Ok("done".to_string()));
    }

    #[test]
    fn settled_slot_answers_without_suspending() {
        let completer = Completer::new();
        let completion = completer.completion();
        completer.complete(7u32);

        for _ in 0..3 {
            let value = completion.wait().now_or_never().expect("ready");
            assert_eq!(value, Ok(7));
        }
    }

    #[tokio::test]
    async fn failure_is_delivered_to_readers() {
        let completer = Completer::<u32>::new();
        let completion = completer.completion();
        completer.fail(ProtoError::ConnectionClosed("gone".into()));
        assert_eq!(
            completion.wait().await,
            Err(ProtoError::ConnectionClosed("gone".into()))
        );
    }

    #[tokio::test]
    async fn dropped_completer_abandons_readers() {
        let completer = Completer::<u32>::new();
        let completion = completer.completion();
        drop(completer);
        assert_eq!(completion.wait().await, Err(ProtoError::Abandoned));
    }

    #[test]
    fn settle_routes_errors_to_failed_state() {
        let completer = Completer::<u32>::new();
        let completion = completer.completion();
        completer.settle(Err(ProtoError::MalformedStatusLine("oops".into())));
        assert_eq!(
            completion.peek(),
            SlotState::Failed(ProtoError::MalformedStatusLine("oops".into()))
        );
    }
}
