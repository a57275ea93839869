//! In-memory store for tests and local development.
//!
//! A single [`Mutex`] over all three tables gives the same serialization
//! the production store gets from database transactions: the duplicate and
//! capacity checks in [`RegistrationStore::create_confirmed`] run while the
//! lock is held, so no interleaving can overshoot capacity.

use crate::error::{Error, Result};
use crate::model::{
    Event, EventDetail, EventPatch, EventSummary, NewEvent, NewUser, Registration,
    RegistrationDetail, RegistrationStatus, StoredUser, User, UserSummary,
};
use crate::store::{EventStore, RegistrationStore, UserStore};
use crate::types::{EventId, RegistrationId, UserId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, StoredUser>,
    events: HashMap<EventId, Event>,
    registrations: HashMap<RegistrationId, Registration>,
    // Insertion order, for stable newest-first listings even when two
    // records share a timestamp.
    seq: u64,
    order: HashMap<RegistrationId, u64>,
    event_order: HashMap<EventId, u64>,
}

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn confirmed_count(&self, event_id: EventId) -> i64 {
        self.registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status == RegistrationStatus::Confirmed)
            .count() as i64
    }

    fn user_summary(&self, id: UserId) -> Result<UserSummary> {
        self.users
            .get(&id)
            .map(|stored| stored.user.summary())
            .ok_or(Error::not_found("User"))
    }

    fn event_detail(&self, event: &Event) -> Result<EventDetail> {
        Ok(EventDetail {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            location: event.location.clone(),
            capacity: event.capacity,
            organizer: self.user_summary(event.organizer_id)?,
            registered: self.confirmed_count(event.id),
            created_at: event.created_at,
            updated_at: event.updated_at,
        })
    }

    fn registration_detail(&self, registration: &Registration) -> Result<RegistrationDetail> {
        let event = self
            .events
            .get(&registration.event_id)
            .ok_or(Error::not_found("Event"))?;
        Ok(RegistrationDetail {
            id: registration.id,
            status: registration.status,
            registration_date: registration.registration_date,
            user: self.user_summary(registration.user_id)?,
            event: EventSummary {
                id: event.id,
                title: event.title.clone(),
                description: event.description.clone(),
                date: event.date,
                location: event.location.clone(),
                capacity: event.capacity,
            },
            created_at: registration.created_at,
            updated_at: registration.updated_at,
        })
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut inner = self.lock();
        if inner
            .users
            .values()
            .any(|stored| stored.user.email == new_user.email)
        {
            return Err(Error::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let inner = self.lock();
        Ok(inner
            .users
            .values()
            .find(|stored| stored.user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let inner = self.lock();
        Ok(inner.users.get(&id).map(|stored| stored.user.clone()))
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create(&self, new_event: NewEvent) -> Result<EventDetail> {
        let mut inner = self.lock();
        let now = Utc::now();
        let event = Event {
            id: EventId::new(),
            title: new_event.title,
            description: new_event.description,
            date: new_event.date,
            location: new_event.location,
            capacity: new_event.capacity,
            organizer_id: new_event.organizer_id,
            created_at: now,
            updated_at: now,
        };
        let seq = inner.next_seq();
        inner.event_order.insert(event.id, seq);
        inner.events.insert(event.id, event.clone());
        inner.event_detail(&event)
    }

    async fn get(&self, id: EventId) -> Result<Option<EventDetail>> {
        let inner = self.lock();
        inner
            .events
            .get(&id)
            .map(|event| inner.event_detail(event))
            .transpose()
    }

    async fn list(&self) -> Result<Vec<EventDetail>> {
        let inner = self.lock();
        let mut events: Vec<&Event> = inner.events.values().collect();
        events.sort_by(|a, b| {
            let a_seq = inner.event_order.get(&a.id).copied().unwrap_or(0);
            let b_seq = inner.event_order.get(&b.id).copied().unwrap_or(0);
            b_seq.cmp(&a_seq)
        });
        events
            .into_iter()
            .map(|event| inner.event_detail(event))
            .collect()
    }

    async fn update(&self, id: EventId, patch: EventPatch) -> Result<Option<EventDetail>> {
        let mut inner = self.lock();
        let Some(mut event) = inner.events.get(&id).cloned() else {
            return Ok(None);
        };
        // Shrinking below the current confirmed count would strand
        // registrations past the ceiling; checked under the same lock
        // that serializes registration.
        if let Some(capacity) = patch.capacity {
            if i64::from(capacity) < inner.confirmed_count(id) {
                return Err(Error::validation(
                    "Capacity cannot be below the number of confirmed registrations",
                ));
            }
        }
        patch.apply(&mut event);
        event.updated_at = Utc::now();
        inner.events.insert(id, event.clone());
        inner.event_detail(&event).map(Some)
    }

    async fn delete(&self, id: EventId) -> Result<bool> {
        let mut inner = self.lock();
        if inner.events.remove(&id).is_none() {
            return Ok(false);
        }
        inner.event_order.remove(&id);
        // Cascade, mirroring the foreign-key behavior of the real store.
        let orphaned: Vec<RegistrationId> = inner
            .registrations
            .values()
            .filter(|r| r.event_id == id)
            .map(|r| r.id)
            .collect();
        for registration_id in orphaned {
            inner.registrations.remove(&registration_id);
            inner.order.remove(&registration_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn create_confirmed(&self, user_id: UserId, event_id: EventId) -> Result<Registration> {
        let mut inner = self.lock();
        let Some(event) = inner.events.get(&event_id) else {
            return Err(Error::not_found("Event"));
        };
        let capacity = i64::from(event.capacity);

        if inner
            .registrations
            .values()
            .any(|r| r.user_id == user_id && r.event_id == event_id)
        {
            return Err(Error::AlreadyRegistered);
        }
        if inner.confirmed_count(event_id) >= capacity {
            return Err(Error::CapacityReached);
        }

        let now = Utc::now();
        let registration = Registration {
            id: RegistrationId::new(),
            user_id,
            event_id,
            status: RegistrationStatus::Confirmed,
            registration_date: now,
            created_at: now,
            updated_at: now,
        };
        let seq = inner.next_seq();
        inner.order.insert(registration.id, seq);
        inner.registrations.insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn find(&self, id: RegistrationId) -> Result<Option<Registration>> {
        let inner = self.lock();
        Ok(inner.registrations.get(&id).cloned())
    }

    async fn for_user(&self, user_id: UserId) -> Result<Vec<RegistrationDetail>> {
        let inner = self.lock();
        let mut registrations: Vec<&Registration> = inner
            .registrations
            .values()
            .filter(|r| r.user_id == user_id)
            .collect();
        registrations.sort_by(|a, b| {
            let a_seq = inner.order.get(&a.id).copied().unwrap_or(0);
            let b_seq = inner.order.get(&b.id).copied().unwrap_or(0);
            b_seq.cmp(&a_seq)
        });
        registrations
            .into_iter()
            .map(|r| inner.registration_detail(r))
            .collect()
    }

    async fn all(&self) -> Result<Vec<RegistrationDetail>> {
        let inner = self.lock();
        let mut registrations: Vec<&Registration> = inner.registrations.values().collect();
        registrations.sort_by(|a, b| {
            let a_seq = inner.order.get(&a.id).copied().unwrap_or(0);
            let b_seq = inner.order.get(&b.id).copied().unwrap_or(0);
            b_seq.cmp(&a_seq)
        });
        registrations
            .into_iter()
            .map(|r| inner.registration_detail(r))
            .collect()
    }

    async fn delete(&self, id: RegistrationId) -> Result<bool> {
        let mut inner = self.lock();
        inner.order.remove(&id);
        Ok(inner.registrations.remove(&id).is_some())
    }

    async fn attendees(&self, event_id: EventId) -> Result<Vec<UserSummary>> {
        let inner = self.lock();
        let mut registrations: Vec<&Registration> = inner
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status == RegistrationStatus::Confirmed)
            .collect();
        registrations.sort_by(|a, b| {
            let a_seq = inner.order.get(&a.id).copied().unwrap_or(0);
            let b_seq = inner.order.get(&b.id).copied().unwrap_or(0);
            a_seq.cmp(&b_seq)
        });
        registrations
            .into_iter()
            .map(|r| inner.user_summary(r.user_id))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::Role;
    use std::sync::Arc;

    async fn seed_user(store: &MemoryStore, email: &str) -> User {
        UserStore::create(
            store,
            NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            },
        )
        .await
        .unwrap()
    }

    async fn seed_event(store: &MemoryStore, organizer: UserId, capacity: i32) -> EventId {
        EventStore::create(
            store,
            NewEvent {
                title: "Meetup".to_string(),
                description: "Monthly meetup".to_string(),
                date: Utc::now(),
                location: "Online".to_string(),
                capacity,
                organizer_id: organizer,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "a@example.com").await;
        let err = UserStore::create(
            &store,
            NewUser {
                name: "Other".to_string(),
                email: "a@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, Error::DuplicateEmail);
    }

    #[tokio::test]
    async fn registered_count_is_derived() {
        let store = MemoryStore::new();
        let organizer = seed_user(&store, "admin@example.com").await;
        let attendee = seed_user(&store, "user@example.com").await;
        let event = seed_event(&store, organizer.id, 10).await;

        assert_eq!(store.get(event).await.unwrap().unwrap().registered, 0);
        store.create_confirmed(attendee.id, event).await.unwrap();
        assert_eq!(store.get(event).await.unwrap().unwrap().registered, 1);
    }

    #[tokio::test]
    async fn deleting_an_event_removes_its_registrations() {
        let store = MemoryStore::new();
        let organizer = seed_user(&store, "admin@example.com").await;
        let attendee = seed_user(&store, "user@example.com").await;
        let event = seed_event(&store, organizer.id, 10).await;
        let other = seed_event(&store, organizer.id, 10).await;

        store.create_confirmed(attendee.id, event).await.unwrap();
        let kept = store.create_confirmed(attendee.id, other).await.unwrap();

        assert!(EventStore::delete(&store, event).await.unwrap());
        let remaining = store.for_user(attendee.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
    }

    #[tokio::test]
    async fn attendees_lists_confirmed_users_in_registration_order() {
        let store = MemoryStore::new();
        let organizer = seed_user(&store, "admin@example.com").await;
        let alice = seed_user(&store, "alice@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let event = seed_event(&store, organizer.id, 10).await;

        store.create_confirmed(alice.id, event).await.unwrap();
        store.create_confirmed(bob.id, event).await.unwrap();

        let attendees = store.attendees(event).await.unwrap();
        assert_eq!(attendees.len(), 2);
        assert_eq!(attendees[0].id, alice.id);
        assert_eq!(attendees[1].id, bob.id);
    }

    #[tokio::test]
    async fn capacity_cannot_shrink_below_confirmed_count() {
        let store = MemoryStore::new();
        let organizer = seed_user(&store, "admin@example.com").await;
        let alice = seed_user(&store, "alice@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let event = seed_event(&store, organizer.id, 2).await;

        store.create_confirmed(alice.id, event).await.unwrap();
        store.create_confirmed(bob.id, event).await.unwrap();

        let patch = EventPatch {
            capacity: Some(1),
            ..EventPatch::default()
        };
        let err = store.update(event, patch).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // Unchanged after the rejected shrink; matching the count is fine.
        let detail = store.get(event).await.unwrap().unwrap();
        assert_eq!(detail.capacity, 2);
        assert_eq!(detail.registered, 2);

        let patch = EventPatch {
            capacity: Some(2),
            ..EventPatch::default()
        };
        assert!(store.update(event, patch).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_duplicates_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let organizer = seed_user(&store, "admin@example.com").await;
        let user = seed_user(&store, "user@example.com").await;
        let event = seed_event(&store, organizer.id, 10).await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_confirmed(user.id, event).await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(err) => assert_eq!(err, Error::AlreadyRegistered),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(store.get(event).await.unwrap().unwrap().registered, 1);
    }

    #[tokio::test]
    async fn capacity_is_never_overshot_under_concurrency() {
        let store = Arc::new(MemoryStore::new());
        let organizer = seed_user(&store, "admin@example.com").await;
        let event = seed_event(&store, organizer.id, 3).await;

        let mut users = Vec::new();
        for i in 0..20 {
            users.push(seed_user(&store, &format!("user{i}@example.com")).await);
        }

        let mut handles = Vec::new();
        for user in users {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_confirmed(user.id, event).await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        assert_eq!(store.get(event).await.unwrap().unwrap().registered, 3);
    }
}
