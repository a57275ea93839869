//! Domain entities and their read models.

pub mod event;
pub mod registration;
pub mod user;

pub use event::{Event, EventDetail, EventPatch, EventSummary, NewEvent};
pub use registration::{Registration, RegistrationDetail, RegistrationStatus};
pub use user::{NewUser, Role, StoredUser, User, UserSummary};
