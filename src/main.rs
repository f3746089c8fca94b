//! Trader Exchange - Binary Entry Point
//!
//! A small smoke demo: sets up a registry and a ledger, runs one booking
//! end-to-end, and prints the event trail and the resulting state root.

use trader_exchange::types::money::{from_units, to_units};
use trader_exchange::{Address, Event, Exchange, Registry};

fn main() {
    println!("===========================================");
    println!("  Trader Exchange - Marketplace Ledger");
    println!("===========================================");
    println!();

    let admin = Address::from_low_u64(1);
    let venue = Address::from_low_u64(2);
    let buyer = Address::from_low_u64(3);

    // Registry: clients resolve the authoritative ledger here.
    let ledger_v1 = Address::from_low_u64(100);
    let registry = Registry::new(admin, ledger_v1);
    println!("Registry owner:   {}", registry.owner());
    println!("Current backend:  {}", registry.backend());
    println!();

    // Ledger: list a trader and post an offer.
    let mut exchange = Exchange::new(admin);
    let subscription = exchange.subscribe();

    let trader = match exchange.add_trader(admin, "Nordic FX", venue, "") {
        Ok(id) => id,
        Err(e) => {
            println!("ERROR: failed to add trader: {e}");
            return;
        }
    };

    let price = to_units("0.5").unwrap_or(0);
    let offer = match exchange.add_bid_ask(venue, trader, "EUR", "USD", price, 10, 0, 0) {
        Ok(id) => id,
        Err(e) => {
            println!("ERROR: failed to post offer: {e}");
            return;
        }
    };
    println!(
        "Posted offer {}: EUR -> USD at {} (10 units)",
        offer,
        from_units(price)
    );

    // Book one unit.
    match exchange.book(buyer, &[offer], "Ada", "Lovelace", price) {
        Ok(purchase_id) => {
            println!("Booked purchase {purchase_id} for {}", from_units(price));
        }
        Err(e) => {
            println!("ERROR: booking failed: {e}");
            return;
        }
    }
    println!();

    // The event trail observers would have seen.
    println!("Event trail:");
    for entry in subscription.drain() {
        let label = match entry.event {
            Event::TraderAdded { ref name, .. } => format!("TraderAdded({name})"),
            Event::BidAskAdded { id, trader_id } => {
                format!("BidAskAdded(offer {id}, trader {trader_id})")
            }
            Event::BidAskPurchased { purchase_id, bid_ask_id, .. } => {
                format!("BidAskPurchased(purchase {purchase_id}, offer {bid_ask_id})")
            }
            ref other => format!("{other:?}"),
        };
        println!("  #{} {}", entry.seq, label);
    }
    println!();

    match exchange.state_root_hex() {
        Ok(root) => println!("State root: {root}"),
        Err(e) => println!("ERROR: failed to compute state root: {e}"),
    }
}
