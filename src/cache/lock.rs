//! Poison-tolerant lock acquisition.
//!
//! A panic while a namespace is locked must not take the whole cache down
//! with it: the guard is recovered and the event is logged instead.

use std::sync::{
    LockResult, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use tracing::warn;

pub(crate) fn rw_read<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), op, "rwlock.read")
}

pub(crate) fn rw_write<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), op, "rwlock.write")
}

pub(crate) fn mutex_lock<'a, T>(lock: &'a Mutex<T>, op: &'static str) -> MutexGuard<'a, T> {
    recover(lock.lock(), op, "mutex.lock")
}

fn recover<G>(result: LockResult<G>, op: &'static str, lock_kind: &'static str) -> G {
    result.unwrap_or_else(|poisoned: PoisonError<G>| {
        warn!(
            op,
            lock_kind,
            result = "poisoned_recovered",
            hint = "entries may reflect a write interrupted by a panic",
            "Recovered from poisoned cache lock"
        );
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn mutex_guard_survives_poisoning() {
        let lock = Mutex::new(1_u32);

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.lock().expect("fresh mutex");
            panic!("poison the mutex");
        }));

        assert!(lock.is_poisoned());
        *mutex_lock(&lock, "test") += 1;
        assert_eq!(*mutex_lock(&lock, "test"), 2);
    }

    #[test]
    fn rwlock_guards_survive_poisoning() {
        let lock = RwLock::new(vec!["a"]);

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.write().expect("fresh rwlock");
            panic!("poison the rwlock");
        }));

        rw_write(&lock, "test").push("b");
        assert_eq!(rw_read(&lock, "test").len(), 2);
    }
}
