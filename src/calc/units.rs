// ==========================================
// Unit conversion (kg <-> lb)
// ==========================================
// Factors are independent empirical constants, not exact inverses.
// No rounding here; rounding belongs to formatting.
// ==========================================

/// Pounds per kilogram
pub const KG_TO_LB: f64 = 2.20462;

/// Kilograms per pound
pub const LB_TO_KG: f64 = 0.453592;

/// Convert kilograms to pounds
///
/// Non-finite or negative input yields 0.
pub fn kg_to_lb(kg: f64) -> f64 {
    if !kg.is_finite() || kg < 0.0 {
        return 0.0;
    }
    kg * KG_TO_LB
}

/// Convert pounds to kilograms
///
/// Non-finite or negative input yields 0.
pub fn lb_to_kg(lb: f64) -> f64 {
    if !lb.is_finite() || lb < 0.0 {
        return 0.0;
    }
    lb * LB_TO_KG
}
