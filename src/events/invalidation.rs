//! Cache invalidation on entity mutation.

use tracing::{debug, warn};

use super::{Mutation, MutationObserver};
use crate::cache::PkInvalidator;
use crate::database::Entity;

/// Drops an entity's cached values whenever it is saved or deleted.
///
/// Invalidation failures are logged and swallowed: the mutation already
/// succeeded and stays that way.
#[derive(Debug, Clone)]
pub struct InvalidationHook<I> {
    invalidator: I,
}

impl<I: PkInvalidator> InvalidationHook<I> {
    pub fn new(invalidator: I) -> Self {
        Self { invalidator }
    }
}

impl<E, I> MutationObserver<E> for InvalidationHook<I>
where
    E: Entity,
    I: PkInvalidator,
{
    fn on_mutation(&self, mutation: Mutation, entity: &E) {
        let pk = entity.pk();
        match self.invalidator.invalidate_by_pk(pk) {
            Ok(()) => debug!("{} {} {}, cache invalidated", E::COLLECTION, pk, mutation),
            Err(e) => warn!(
                "Failed to invalidate cache for {} {} after it was {}: {}",
                E::COLLECTION,
                pk,
                mutation,
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::cache::CacheError;
    use crate::database::User;
    use crate::events::Signals;

    #[derive(Default)]
    struct RecordingInvalidator {
        calls: Mutex<Vec<i64>>,
        fail: bool,
    }

    impl PkInvalidator for Arc<RecordingInvalidator> {
        fn invalidate_by_pk(&self, pk: i64) -> Result<(), CacheError> {
            self.calls.lock().push(pk);
            if self.fail {
                return Err(CacheError::Unavailable("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_each_mutation_invalidates_once() {
        let invalidator = Arc::new(RecordingInvalidator::default());
        let signals: Signals<User> = Signals::new();
        signals.connect(Arc::new(InvalidationHook::new(invalidator.clone())));

        let user = User::new(11, "carol");
        signals.send(Mutation::Saved, &user);
        assert_eq!(*invalidator.calls.lock(), vec![11]);

        signals.send(Mutation::Deleted, &user);
        assert_eq!(*invalidator.calls.lock(), vec![11, 11]);
    }

    #[test]
    fn test_invalidation_failure_is_swallowed() {
        let invalidator = Arc::new(RecordingInvalidator {
            fail: true,
            ..Default::default()
        });
        let hook = InvalidationHook::new(invalidator.clone());

        MutationObserver::<User>::on_mutation(&hook, Mutation::Saved, &User::new(3, "dave"));

        assert_eq!(*invalidator.calls.lock(), vec![3]);
    }
}
