//! Business metrics for the ticketing ledger.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `turnstile_transfers_total{outcome}` - Transfer notifications by outcome
//!   (purchased, deposit, `top_up`, duplicate, rejected, `persist_failed`)
//! - `turnstile_tickets_sold_total` - Tickets sold
//! - `turnstile_revenue_units_total` - Purchase income in smallest units
//! - `turnstile_deposits_units_total` - Plain deposits in smallest units
//! - `turnstile_redemptions_total` - Tickets redeemed
//! - `turnstile_events_deployed_total` - Events deployed
//! - `turnstile_tiers_added_total` - Tiers added

use metrics::describe_counter;

/// Register metric descriptions. Call once at startup, before recording.
pub fn register_ledger_metrics() {
    describe_counter!(
        "turnstile_transfers_total",
        "Transfer notifications handled, by outcome"
    );
    describe_counter!("turnstile_tickets_sold_total", "Total tickets sold");
    describe_counter!(
        "turnstile_revenue_units_total",
        "Purchase income in smallest token units"
    );
    describe_counter!(
        "turnstile_deposits_units_total",
        "Plain deposits in smallest token units"
    );
    describe_counter!("turnstile_redemptions_total", "Total tickets redeemed");
    describe_counter!("turnstile_events_deployed_total", "Total events deployed");
    describe_counter!("turnstile_tiers_added_total", "Total ticket tiers added");

    tracing::info!("ledger metrics registered");
}

/// Record a handled transfer notification.
pub fn record_transfer(outcome: &'static str) {
    metrics::counter!("turnstile_transfers_total", "outcome" => outcome).increment(1);
}

/// Record tickets sold by a completed purchase.
pub fn record_tickets_sold(quantity: u32) {
    metrics::counter!("turnstile_tickets_sold_total").increment(u64::from(quantity));
}

/// Record purchase income in smallest units.
pub fn record_revenue(units: u64) {
    metrics::counter!("turnstile_revenue_units_total").increment(units);
}

/// Record a plain deposit in smallest units.
pub fn record_deposit(units: u64) {
    metrics::counter!("turnstile_deposits_units_total").increment(units);
}

/// Record a ticket redemption.
pub fn record_redemption() {
    metrics::counter!("turnstile_redemptions_total").increment(1);
}

/// Record an event deployment.
pub fn record_event_deployed() {
    metrics::counter!("turnstile_events_deployed_total").increment(1);
}

/// Record a tier addition.
pub fn record_tier_added() {
    metrics::counter!("turnstile_tiers_added_total").increment(1);
}
