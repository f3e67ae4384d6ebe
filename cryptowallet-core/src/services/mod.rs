//! Service layer - client state machines over the backend ports
//!
//! Each service owns the state of one screen or workflow (the rows of a
//! listing, the draft of a send, the signed-in identity) and talks to the
//! server only through the traits in `ports`.

mod admin_account;
mod auth;
mod dashboard;
pub mod fence;
pub mod logging;
mod resource_view;
mod session;
mod stats;
mod transaction;
mod wallet;

pub use admin_account::AdminAccount;
pub use auth::{AuthGateway, AuthOutcome};
pub use dashboard::{DashboardTab, UserDashboard};
pub use fence::{LoadTicket, RequestFence};
pub use logging::{init_logging, LogFormat};
pub use resource_view::{
    FetchCall, LoadStatus, PaginatedResourceView, PendingLoad, DEFAULT_PAGE_SIZE,
};
pub use session::{session_key, SessionStore};
pub use stats::{AdminStatsView, AnalyticsReport, CurrencyVolume};
pub use transaction::{HistoryScope, TransactionComposer, TransactionDraft, TransactionHistory};
pub use wallet::{Reloaded, WalletWorkflow};
