//! Platform accessibility signal: the "reduce motion" setting.

use tokio::sync::watch;

/// Read access to the reduce-motion setting plus change notifications.
pub trait MotionPreference: Send + Sync {
    /// Current value.
    fn reduce_motion(&self) -> bool;

    /// Live subscription; the receiver always sees the latest value.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Host-owned reduce-motion setting.
#[derive(Debug)]
pub struct MotionSettings {
    tx: watch::Sender<bool>,
}

impl MotionSettings {
    pub fn new(reduce_motion: bool) -> Self {
        let (tx, _rx) = watch::channel(reduce_motion);
        Self { tx }
    }

    /// Update the setting, notifying subscribers only on change.
    pub fn set_reduce_motion(&self, reduce_motion: bool) {
        self.tx.send_if_modified(|current| {
            if *current == reduce_motion {
                false
            } else {
                tracing::info!(reduce_motion, "Reduce motion changed");
                *current = reduce_motion;
                true
            }
        });
    }
}

impl MotionPreference for MotionSettings {
    fn reduce_motion(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_changes() {
        let settings = MotionSettings::new(false);
        let mut rx = settings.subscribe();
        assert!(!*rx.borrow());

        settings.set_reduce_motion(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
        assert!(settings.reduce_motion());

        // Same value again is not a change.
        settings.set_reduce_motion(true);
        assert!(!rx.has_changed().unwrap());
    }
}
