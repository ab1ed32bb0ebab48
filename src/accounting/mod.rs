pub mod arithmetic;
pub mod calendar;
pub mod status;

pub use arithmetic::{
    checked_total_obligation, due_date, expected_due_dates, loan_progress, outstanding_balance,
    progress_percent, total_obligation,
};
pub use calendar::{month_calendar, CalendarDay, CalendarMonth, DayMark, MonthCalendar};
pub use status::{derive_status, StatusChange, StatusInputs};
