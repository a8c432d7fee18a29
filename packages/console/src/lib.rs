// ABOUTME: Live view of one release-test cycle
// ABOUTME: Cached cycle and records with a generation guard, periodic refresh task, notifications

pub mod notify;
pub mod refresh;
pub mod view;

pub use notify::{Notification, NotificationLevel};
pub use refresh::{spawn_refresh, DetailSource, RefreshHandle, ViewEvent};
pub use view::{ApplyOutcome, FetchTicket, ViewState};
