// ==========================================
// Poultry Metrics - calculation layer
// ==========================================
// Responsibility: unit conversion, date arithmetic, display formatting,
// zootechnical / financial KPI formulas
// Rule: pure functions, no I/O, no logging, never NaN/Infinity out
// ==========================================

pub mod dates;
pub mod format;
pub mod math;
pub mod units;

pub use dates::{Calendar, Clock, DateInput, DateStyle, FixedClock, SystemClock};
pub use units::{kg_to_lb, lb_to_kg, KG_TO_LB, LB_TO_KG};
