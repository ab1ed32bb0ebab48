/// time control - watch a loan fall overdue and get settled
use microloan_tracker::{
    CalendarMonth, DayMark, Event, LoanTracker, Money, NewClient, NewLoan, NewPayment,
    PaymentFrequency, Rate, SafeTimeProvider, TimeSource,
};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== time control ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();
    let mut tracker = LoanTracker::in_memory(time.clone())?;

    let client = tracker.create_client(NewClient::new("Carlos Pérez", "0414-7654321"))?;
    let loan = tracker.create_loan(NewLoan {
        client_id: client.id,
        principal: Money::from_major(1_000),
        rate: Rate::from_percentage(dec!(10)),
        start_date: tracker.today(),
        frequency: PaymentFrequency::Weekly,
        installment_count: 4,
    })?;
    println!("loan of ${} due {}", loan.total_obligation(), loan.due_date);

    // one payment per week, skipping the third
    for week in 1..=4 {
        controller.advance(Duration::days(7));
        if week != 3 {
            tracker.register_payment(NewPayment::new(loan.id, Money::from_major(250)))?;
        }
        tracker.refresh_statuses()?;
        let detail = tracker.get_loan_detail(loan.id)?;
        println!(
            "  {}: paid ${}, outstanding ${}, {}",
            tracker.today(),
            detail.loan.cumulative_paid,
            detail.outstanding,
            detail.loan.status
        );
    }

    controller.advance(Duration::days(5));
    tracker.refresh_statuses()?;
    println!("\n{}: status {}", tracker.today(), tracker.get_loan_detail(loan.id)?.loan.status);

    let calendar = tracker.loan_calendar(loan.id, CalendarMonth::new(2024, 3)?)?;
    println!("\nmarch 2024");
    println!("  paid days: {}", calendar.count(DayMark::Paid));
    println!("  missed installments: {}", calendar.count(DayMark::Missed));

    let remaining = tracker.get_loan_detail(loan.id)?.outstanding;
    tracker.register_payment(NewPayment::new(loan.id, remaining).note("settled"))?;
    println!("\nsettled ${}, status {}", remaining, tracker.get_loan_detail(loan.id)?.loan.status);

    println!("\nstatus history:");
    for event in tracker.take_events() {
        if let Event::StatusChanged { old_status, new_status, as_of, .. } = event {
            println!("  {}: {} -> {}", as_of, old_status, new_status);
        }
    }

    Ok(())
}
