pub mod accounting;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod records;
pub mod store;
pub mod tracker;
pub mod types;
pub mod views;

// re-export key types
pub use accounting::{CalendarMonth, DayMark, MonthCalendar};
pub use config::{DatabaseConfig, TrackerConfig};
pub use decimal::{Money, Rate};
pub use errors::{ErrorKind, Result, TrackerError};
pub use events::{Event, EventStore};
pub use records::{Client, ClientUpdate, Loan, NewClient, NewLoan, NewPayment, Payment};
pub use store::Store;
pub use tracker::LoanTracker;
pub use types::{ClientId, LoanId, LoanStatus, PaymentFrequency, PaymentId, StatusFilter};
pub use views::{
    ClientDetail, ClientListing, ClientQuery, ClientSummary, ClientWithTotals, ComingDue,
    DashboardTotals, LoanDetail, LoanQuery, LoanWithTotals,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
