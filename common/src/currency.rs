//! Rupee display for amounts stored in paise.

/// Paise per rupee.
pub const PAISE_PER_RUPEE: u64 = 100;

/// Whole-rupee form used in cart and checkout summaries, e.g. `₹30`.
///
/// Fractions of a rupee are rounded half up.
pub fn format_rupees(paise: u64) -> String {
    let rupees = paise.saturating_add(PAISE_PER_RUPEE / 2) / PAISE_PER_RUPEE;
    format!("₹{rupees}")
}

/// Exact two-decimal form used in messages, e.g. `₹90.00`.
pub fn format_rupees_exact(paise: u64) -> String {
    format!(
        "₹{}.{:02}",
        paise / PAISE_PER_RUPEE,
        paise % PAISE_PER_RUPEE
    )
}
