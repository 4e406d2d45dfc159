//! Order status commands.
//!
//! The backend enforces transitions; these commands only expose the same
//! table the admin console uses to decide which actions to offer.

use lecas_core::OrderStatus;
use lecas_storefront::Error;

/// Print the statuses `status` can move to.
#[allow(clippy::print_stdout)]
pub fn next(status: OrderStatus) {
    if status.is_terminal() {
        println!("{} is final; no further changes are allowed", status.label());
        return;
    }

    println!("{} can move to:", status.label());
    for next in status.allowed_next() {
        println!("  {next}");
    }
}

/// Check a single status change.
///
/// # Errors
///
/// Returns `Error::Transition` if the change is not allowed.
#[allow(clippy::print_stdout)]
pub fn check(from: OrderStatus, to: OrderStatus) -> Result<(), Error> {
    let to = from.transition(to)?;
    println!("{from} -> {to} is allowed");
    Ok(())
}
