use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;
use gloo_timers::callback::Timeout;
use log::{error, info};
use serde::Serialize;
use thiserror::Error;
use yew::prelude::*;
use yew_hooks::use_unmount;

use crate::config;
use crate::storage::{KeyValueStore, LocalStore, StorageError};

#[derive(Debug, Error)]
pub enum AutosaveError {
    #[error("failed to serialize draft: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone, Debug, PartialEq)]
pub enum AutosaveStatus {
    Idle,
    Pending,
    SavedLocally,
    Saved,
    Failed(String),
}

/// Async save run after the local write, with the unserialized payload.
pub type RemoteSave<T> = Rc<dyn Fn(T) -> LocalBoxFuture<'static, Result<(), String>>>;

type StatusListener = Rc<dyn Fn(AutosaveStatus)>;

/// Timers and task spawning. Dropping a handle cancels its timer.
pub trait Scheduler {
    type Handle;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, task)
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Snapshot {
    key: String,
    serialized: String,
}

struct State<H> {
    // Handle of the latest timer. It may already have fired; dropping a
    // fired handle is a no-op, and we never drop it from inside its callback.
    timer: Option<H>,
    awaiting_fire: bool,
    scheduled: Option<Snapshot>,
    persisted: Option<Snapshot>,
}

/// Trailing-edge debounced writer. At most one timer is pending per
/// instance; each new snapshot replaces it.
pub struct Autosaver<T, S: Scheduler, K> {
    state: Rc<RefCell<State<S::Handle>>>,
    scheduler: Rc<S>,
    store: Rc<K>,
    delay_ms: u32,
    remote_save: RefCell<Option<RemoteSave<T>>>,
    on_status: Option<StatusListener>,
}

impl<T, S, K> Autosaver<T, S, K>
where
    T: Serialize + Clone + 'static,
    S: Scheduler + 'static,
    K: KeyValueStore + 'static,
{
    pub fn new(scheduler: Rc<S>, store: Rc<K>, delay_ms: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                timer: None,
                awaiting_fire: false,
                scheduled: None,
                persisted: None,
            })),
            scheduler,
            store,
            delay_ms,
            remote_save: RefCell::new(None),
            on_status: None,
        }
    }

    pub fn with_status_listener(mut self, listener: StatusListener) -> Self {
        self.on_status = Some(listener);
        self
    }

    pub fn set_remote_save(&self, remote_save: Option<RemoteSave<T>>) {
        *self.remote_save.borrow_mut() = remote_save;
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.state.borrow().awaiting_fire
    }

    /// Feeds the latest inputs. Clean input cancels whatever is pending;
    /// dirty input schedules a write unless the same snapshot already is.
    pub fn observe(&self, key: &str, payload: &T, is_dirty: bool) -> Result<(), AutosaveError> {
        if !is_dirty {
            self.cancel();
            return Ok(());
        }

        let snapshot = Snapshot {
            key: key.to_string(),
            serialized: serde_json::to_string(payload)?,
        };

        {
            let mut state = self.state.borrow_mut();
            if state.scheduled.as_ref() == Some(&snapshot) {
                return Ok(());
            }
            state.timer = None;
            state.scheduled = Some(snapshot.clone());
            state.awaiting_fire = true;
        }

        let task = self.fire_task(snapshot, payload.clone());
        let handle = self.scheduler.schedule(self.delay_ms, task);
        self.state.borrow_mut().timer = Some(handle);
        emit(&self.on_status, AutosaveStatus::Pending);
        Ok(())
    }

    /// Drops the pending timer, if any. The cancelled snapshot is forgotten
    /// so the same content can be scheduled again later.
    pub fn cancel(&self) {
        let (handle, was_pending) = {
            let mut state = self.state.borrow_mut();
            let was_pending = state.awaiting_fire;
            if was_pending {
                state.scheduled = state.persisted.clone();
                state.awaiting_fire = false;
            }
            (state.timer.take(), was_pending)
        };
        drop(handle);
        if was_pending {
            emit(&self.on_status, AutosaveStatus::Idle);
        }
    }

    fn fire_task(&self, snapshot: Snapshot, payload: T) -> Box<dyn FnOnce()> {
        let state: Weak<RefCell<State<S::Handle>>> = Rc::downgrade(&self.state);
        let store = Rc::clone(&self.store);
        let scheduler = Rc::clone(&self.scheduler);
        let remote_save = self.remote_save.borrow().clone();
        let on_status = self.on_status.clone();

        Box::new(move || {
            let Some(state) = state.upgrade() else {
                return;
            };

            let local = store.set(&snapshot.key, &snapshot.serialized);
            {
                let mut state = state.borrow_mut();
                state.awaiting_fire = false;
                if local.is_ok() {
                    state.persisted = Some(snapshot.clone());
                } else {
                    state.scheduled = state.persisted.clone();
                }
            }

            match local {
                Ok(()) => {
                    info!("Draft saved locally under {}", snapshot.key);
                    emit(&on_status, AutosaveStatus::SavedLocally);
                }
                Err(e) => {
                    error!("Failed to save draft {} locally: {}", snapshot.key, e);
                    emit(&on_status, AutosaveStatus::Failed(e.to_string()));
                }
            }

            if let Some(remote_save) = remote_save {
                scheduler.spawn(Box::pin(async move {
                    match remote_save(payload).await {
                        Ok(()) => emit(&on_status, AutosaveStatus::Saved),
                        Err(e) => {
                            error!("Remote save for {} failed: {}", snapshot.key, e);
                            emit(&on_status, AutosaveStatus::Failed(e));
                        }
                    }
                }));
            }
        })
    }
}

fn emit(listener: &Option<StatusListener>, status: AutosaveStatus) {
    if let Some(listener) = listener {
        listener(status);
    }
}

/// Debounced draft persistence for a component. Writes `payload` to local
/// storage under `key` once it has been dirty and unchanged for `delay_ms`,
/// then runs `remote_save` if given.
#[hook]
pub fn use_autosave<T>(
    key: String,
    payload: T,
    is_dirty: bool,
    remote_save: Option<RemoteSave<T>>,
    delay_ms: Option<u32>,
) -> AutosaveStatus
where
    T: Serialize + Clone + PartialEq + 'static,
{
    let status = use_state(|| AutosaveStatus::Idle);
    let autosaver = {
        let set_status = status.setter();
        let delay_ms = delay_ms.unwrap_or(config::AUTOSAVE_DELAY_MS);
        use_mut_ref(move || {
            Autosaver::<T, _, _>::new(Rc::new(BrowserScheduler), Rc::new(LocalStore), delay_ms)
                .with_status_listener(Rc::new(move |s: AutosaveStatus| set_status.set(s)))
        })
    };

    {
        let autosaver = autosaver.clone();
        use_effect_with_deps(
            move |(key, payload, is_dirty)| {
                let autosaver = autosaver.borrow();
                autosaver.set_remote_save(remote_save);
                if let Err(e) = autosaver.observe(key, payload, *is_dirty) {
                    error!("Autosave skipped for {}: {}", key, e);
                }
                || ()
            },
            (key, payload, is_dirty),
        );
    }

    use_unmount(move || autosaver.borrow().cancel());

    (*status).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use futures::FutureExt;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// Test scheduler: timers fire only when `run_timers` is called and
    /// spawned futures are driven to completion on the spot.
    #[derive(Default)]
    struct ManualScheduler {
        timers: RefCell<Vec<(Rc<Cell<bool>>, Option<Box<dyn FnOnce()>>)>>,
        scheduled: Cell<usize>,
    }

    struct ManualHandle(Rc<Cell<bool>>);

    impl Drop for ManualHandle {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    impl ManualScheduler {
        fn run_timers(&self) {
            let timers: Vec<_> = self.timers.borrow_mut().drain(..).collect();
            for (cancelled, task) in timers {
                if !cancelled.get() {
                    if let Some(task) = task {
                        task();
                    }
                }
            }
        }

        fn live_timers(&self) -> usize {
            self.timers.borrow().iter().filter(|(c, _)| !c.get()).count()
        }
    }

    impl Scheduler for ManualScheduler {
        type Handle = ManualHandle;

        fn schedule(&self, _delay_ms: u32, task: Box<dyn FnOnce()>) -> ManualHandle {
            let cancelled = Rc::new(Cell::new(false));
            self.timers
                .borrow_mut()
                .push((Rc::clone(&cancelled), Some(task)));
            self.scheduled.set(self.scheduled.get() + 1);
            ManualHandle(cancelled)
        }

        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            futures::executor::block_on(task);
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize)]
    struct Draft {
        notes: String,
    }

    fn draft(notes: &str) -> Draft {
        Draft { notes: notes.to_string() }
    }

    struct Harness {
        scheduler: Rc<ManualScheduler>,
        store: Rc<MemoryStore>,
        statuses: Rc<RefCell<Vec<AutosaveStatus>>>,
        saver: Autosaver<Draft, ManualScheduler, MemoryStore>,
    }

    fn harness() -> Harness {
        let scheduler = Rc::new(ManualScheduler::default());
        let store = Rc::new(MemoryStore::new());
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&statuses);
        let saver = Autosaver::new(Rc::clone(&scheduler), Rc::clone(&store), 900)
            .with_status_listener(Rc::new(move |s: AutosaveStatus| sink.borrow_mut().push(s)));
        Harness { scheduler, store, statuses, saver }
    }

    #[test]
    fn rapid_changes_coalesce_into_latest_write() {
        let h = harness();
        h.saver.observe("draft", &draft("fir"), true).unwrap();
        h.saver.observe("draft", &draft("first"), true).unwrap();
        assert_eq!(h.scheduler.live_timers(), 1);

        h.scheduler.run_timers();
        assert_eq!(h.store.writes(), 1);
        assert_eq!(h.store.get("draft"), Some(r#"{"notes":"first"}"#.to_string()));
        assert!(!h.saver.is_pending());
    }

    #[test]
    fn clean_payloads_are_never_written() {
        let h = harness();
        h.saver.observe("draft", &draft("a"), false).unwrap();
        h.saver.observe("draft", &draft("b"), false).unwrap();
        h.scheduler.run_timers();
        assert_eq!(h.scheduler.scheduled.get(), 0);
        assert_eq!(h.store.writes(), 0);
    }

    #[test]
    fn identical_snapshot_only_schedules_once() {
        let h = harness();
        h.saver.observe("draft", &draft("same"), true).unwrap();
        h.saver.observe("draft", &draft("same"), true).unwrap();
        assert_eq!(h.scheduler.scheduled.get(), 1);

        h.scheduler.run_timers();
        h.saver.observe("draft", &draft("same"), true).unwrap();
        h.scheduler.run_timers();
        assert_eq!(h.scheduler.scheduled.get(), 1);
        assert_eq!(h.store.writes(), 1);
    }

    #[test]
    fn going_clean_cancels_pending_write() {
        let h = harness();
        h.saver.observe("draft", &draft("typed"), true).unwrap();
        h.saver.observe("draft", &draft("typed"), false).unwrap();
        h.scheduler.run_timers();
        assert_eq!(h.store.writes(), 0);

        // the cancelled snapshot can be scheduled again
        h.saver.observe("draft", &draft("typed"), true).unwrap();
        h.scheduler.run_timers();
        assert_eq!(h.store.writes(), 1);
    }

    #[test]
    fn cancel_on_unmount_drops_the_cycle() {
        let h = harness();
        h.saver.observe("draft", &draft("bye"), true).unwrap();
        h.saver.cancel();
        h.scheduler.run_timers();
        assert_eq!(h.store.get("draft"), None);
        assert_eq!(
            *h.statuses.borrow(),
            vec![AutosaveStatus::Pending, AutosaveStatus::Idle]
        );
    }

    #[test]
    fn key_change_schedules_new_write() {
        let h = harness();
        h.saver.observe("draft:1", &draft("x"), true).unwrap();
        h.scheduler.run_timers();
        h.saver.observe("draft:2", &draft("x"), true).unwrap();
        h.scheduler.run_timers();
        assert_eq!(h.store.get("draft:2"), Some(r#"{"notes":"x"}"#.to_string()));
        assert_eq!(h.store.writes(), 2);
    }

    #[test]
    fn remote_save_receives_original_payload() {
        let h = harness();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        h.saver.set_remote_save(Some(Rc::new(move |d: Draft| {
            sink.borrow_mut().push(d);
            async { Ok::<(), String>(()) }.boxed_local()
        })));

        h.saver.observe("draft", &draft("remote"), true).unwrap();
        h.scheduler.run_timers();
        assert_eq!(*seen.borrow(), vec![draft("remote")]);
        assert_eq!(
            *h.statuses.borrow(),
            vec![
                AutosaveStatus::Pending,
                AutosaveStatus::SavedLocally,
                AutosaveStatus::Saved
            ]
        );
    }

    #[test]
    fn remote_failure_keeps_local_copy() {
        let h = harness();
        h.saver.set_remote_save(Some(Rc::new(|_: Draft| {
            async { Err::<(), String>("503 Service Unavailable".to_string()) }.boxed_local()
        })));

        h.saver.observe("draft", &draft("kept"), true).unwrap();
        h.scheduler.run_timers();
        assert_eq!(h.store.get("draft"), Some(r#"{"notes":"kept"}"#.to_string()));
        assert_eq!(
            h.statuses.borrow().last(),
            Some(&AutosaveStatus::Failed("503 Service Unavailable".to_string()))
        );
    }

    #[test]
    fn failed_local_write_is_retried_on_next_change() {
        let h = harness();
        h.store.set_read_only(true);
        h.saver.observe("draft", &draft("one"), true).unwrap();
        h.scheduler.run_timers();
        assert!(matches!(
            h.statuses.borrow().last(),
            Some(AutosaveStatus::Failed(_))
        ));

        h.store.set_read_only(false);
        h.saver.observe("draft", &draft("two"), true).unwrap();
        h.scheduler.run_timers();
        assert_eq!(h.store.get("draft"), Some(r#"{"notes":"two"}"#.to_string()));
    }

    #[test]
    fn dropped_saver_does_not_write() {
        let h = harness();
        h.saver.observe("draft", &draft("late"), true).unwrap();
        let Harness { scheduler, store, saver, .. } = h;
        drop(saver);
        scheduler.run_timers();
        assert_eq!(store.writes(), 0);
    }
}
