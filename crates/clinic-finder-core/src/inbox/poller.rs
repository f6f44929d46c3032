//! Recurring inbox refresh.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::DecodeErrorPolicy;
use crate::db::{DbError, KeyValueStore};
use crate::models::SosRequest;
use crate::poll::{PollHandle, Poller};

use super::SosInbox;

/// Rescan the live inbox every `interval` and hand each listing to `on_refresh`.
///
/// Every tick is a full rescan; listings are not diffed. A failed tick is
/// logged and skipped. The store lock is released before `on_refresh` runs.
pub fn spawn_inbox_poller<S, F>(
    store: Arc<Mutex<S>>,
    policy: DecodeErrorPolicy,
    interval: Duration,
    mut on_refresh: F,
) -> PollHandle
where
    S: KeyValueStore + Send + 'static,
    F: FnMut(Vec<SosRequest>) + Send + 'static,
{
    Poller::spawn("sos-inbox", interval, move || -> Result<(), DbError> {
        let requests = {
            let store = store.lock()?;
            // History limit is irrelevant for listing.
            SosInbox::new(&*store, policy, 0).list_live()?
        };
        on_refresh(requests);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, SosRepository};
    use crate::test_support::sos_at;
    use std::sync::mpsc;

    #[test]
    fn test_poller_sees_new_requests_and_acknowledgements() {
        let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let (tx, rx) = mpsc::channel();

        let handle = spawn_inbox_poller(
            db.clone(),
            DecodeErrorPolicy::Skip,
            Duration::from_millis(5),
            move |requests| {
                let _ = tx.send(requests.len());
            },
        );

        let wait_for = |count: usize| {
            loop {
                let seen = rx.recv_timeout(Duration::from_secs(2)).unwrap();
                if seen == count {
                    break;
                }
            }
        };

        wait_for(0);
        {
            let store = db.lock().unwrap();
            SosRepository::new(&*store).file(&sos_at("a@mail.com", 1)).unwrap();
        }
        wait_for(1);
        {
            let store = db.lock().unwrap();
            SosInbox::new(&*store, DecodeErrorPolicy::Skip, 7)
                .acknowledge("a@mail.com")
                .unwrap();
        }
        wait_for(0);

        handle.stop();
    }
}
