/// dashboard - portfolio totals from a file-backed store
use microloan_tracker::{
    ClientQuery, LoanQuery, LoanTracker, Money, NewClient, NewLoan, NewPayment, PaymentFrequency,
    Rate, SafeTimeProvider, StatusFilter, TimeSource, TrackerConfig,
};
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== dashboard ===\n");

    let path = std::env::temp_dir().join("microloan-dashboard-demo.db");
    let _ = std::fs::remove_file(&path);
    let config = TrackerConfig::from_json_str(&format!(
        r#"{{ "database": {{ "path": {:?} }}, "upcoming_window_days": 10 }}"#,
        path.display().to_string()
    ))?;

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();
    let mut tracker = LoanTracker::open(config, time.clone())?;

    let borrowers = [
        ("Ana Torres", 500, 20, PaymentFrequency::Daily, 10),
        ("Luis Mendoza", 2_000, 15, PaymentFrequency::Biweekly, 4),
        ("Rosa Díaz", 1_200, 10, PaymentFrequency::Weekly, 2),
    ];
    let mut loans = Vec::new();
    for (name, principal, rate, frequency, installments) in borrowers {
        let client = tracker.create_client(NewClient::new(name, "0412-0000000"))?;
        loans.push(tracker.create_loan(NewLoan {
            client_id: client.id,
            principal: Money::from_major(principal),
            rate: Rate::from_percentage(rate.into()),
            start_date: tracker.today(),
            frequency,
            installment_count: installments,
        })?);
    }
    tracker.create_client(NewClient::new("Jorge Silva", "0416-0000000"))?;

    controller.advance(Duration::days(3));
    tracker.register_payment(NewPayment::new(loans[0].id, Money::from_major(600)))?;
    tracker.register_payment(NewPayment::new(loans[1].id, Money::from_major(800)))?;

    controller.advance(Duration::days(12));
    let totals = tracker.get_dashboard_totals()?;
    println!("as of {}", tracker.today());
    println!("  lent: ${}", totals.total_lent);
    println!("  collected: ${}", totals.total_collected);
    println!("  outstanding: ${}", totals.total_outstanding);
    println!(
        "  loans: {} active, {} overdue, {} paid",
        totals.active_loans, totals.overdue_loans, totals.paid_loans
    );
    println!("  clients: {} ({} with loans)", totals.total_clients, totals.clients_with_loans);

    println!("\ncoming due:");
    for due in &totals.coming_due {
        println!("  {} owes ${} by {}", due.client_name, due.outstanding, due.due_date);
    }

    println!("\noverdue:");
    for row in tracker.list_loans_with_totals(&LoanQuery::status(StatusFilter::Overdue))? {
        println!("  {} - ${} ({}% progress)", row.client_name, row.outstanding, row.progress);
    }

    println!("\nclients:");
    let listing = tracker.list_clients_with_totals(&ClientQuery::default())?;
    for row in &listing.clients {
        println!(
            "  {}: {} loan(s), debt ${}, paid ${}",
            row.client.name, row.loan_count, row.debt, row.paid
        );
    }
    println!("\n{}", serde_json::to_string_pretty(&listing.summary)?);

    drop(tracker);
    let _ = std::fs::remove_file(&path);
    Ok(())
}
