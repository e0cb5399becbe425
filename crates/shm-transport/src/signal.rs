use crate::{FrameSignal, Result, TransportError, WaitResult};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Producer half of an in-process signal.
#[derive(Clone)]
pub struct SignalNotifier {
    tx: Sender<()>,
}

impl SignalNotifier {
    /// Announce a completed write. Returns false once the receiver is gone.
    pub fn notify(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// Consumer half of an in-process signal, for producers living in the same
/// process (bridges, replayers, tests).
pub struct ChannelSignal {
    rx: Receiver<()>,
}

impl ChannelSignal {
    pub fn pair() -> (SignalNotifier, ChannelSignal) {
        let (tx, rx) = mpsc::channel();
        (SignalNotifier { tx }, ChannelSignal { rx })
    }
}

impl FrameSignal for ChannelSignal {
    fn wait(&mut self, timeout: Duration) -> Result<WaitResult> {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => {
                // Coalesce notifications that piled up while we were busy;
                // only the latest write matters.
                loop {
                    match self.rx.try_recv() {
                        Ok(()) => continue,
                        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                    }
                }
                Ok(WaitResult::Signaled)
            }
            Err(RecvTimeoutError::Timeout) => Ok(WaitResult::TimedOut),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_out_without_notification() -> anyhow::Result<()> {
        let (_tx, mut sig) = ChannelSignal::pair();
        assert_eq!(sig.wait(Duration::from_millis(5))?, WaitResult::TimedOut);
        Ok(())
    }

    #[test]
    fn test_pending_notifications_coalesce() -> anyhow::Result<()> {
        let (tx, mut sig) = ChannelSignal::pair();
        assert!(tx.notify());
        assert!(tx.notify());
        assert!(tx.notify());
        assert_eq!(sig.wait(Duration::from_millis(5))?, WaitResult::Signaled);
        assert_eq!(sig.wait(Duration::from_millis(5))?, WaitResult::TimedOut);
        Ok(())
    }

    #[test]
    fn test_disconnect_is_an_error() {
        let (tx, mut sig) = ChannelSignal::pair();
        drop(tx);
        assert!(matches!(
            sig.wait(Duration::from_millis(5)),
            Err(TransportError::Disconnected)
        ));
    }
}
