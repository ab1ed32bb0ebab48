/// quick start - register a client, lend money and collect a payment
use microloan_tracker::{
    LoanTracker, Money, NewClient, NewLoan, NewPayment, PaymentFrequency, Rate, SafeTimeProvider,
    TimeSource,
};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== quick start ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 14, 0, 0, 0).unwrap()
    ));
    let mut tracker = LoanTracker::in_memory(time.clone())?;

    let client = tracker.create_client(
        NewClient::new("María García", "0412-1234567").address("Av. Libertador 123"),
    )?;
    println!("client registered: {} ({})", client.name, client.registration_date);

    let loan = tracker.create_loan(NewLoan {
        client_id: client.id,
        principal: Money::from_major(5_000),
        rate: Rate::from_percentage(dec!(15)),
        start_date: tracker.today(),
        frequency: PaymentFrequency::Monthly,
        installment_count: 6,
    })?;
    println!("\nloan originated");
    println!("  principal: ${}", loan.principal);
    println!("  rate: {}", loan.rate);
    println!("  total to repay: ${}", loan.total_obligation());
    println!("  due date: {}", loan.due_date);

    tracker.register_payment(NewPayment::new(loan.id, Money::from_major(958)).note("first installment"))?;

    let detail = tracker.get_loan_detail(loan.id)?;
    println!("\nafter first payment");
    println!("  paid: ${}", detail.loan.cumulative_paid);
    println!("  outstanding: ${}", detail.outstanding);
    println!("  progress: {}%", detail.progress);
    println!("  status: {}", detail.loan.status);

    println!("\nschedule:");
    for (i, due) in detail.expected_due_dates.iter().enumerate() {
        println!("  {}. {}", i + 1, due);
    }

    // overpaying is refused and leaves the loan untouched
    match tracker.register_payment(NewPayment::new(loan.id, Money::from_major(10_000))) {
        Ok(_) => println!("\nunexpected: overpayment accepted"),
        Err(e) => println!("\nrejected: {}", e),
    }

    Ok(())
}
