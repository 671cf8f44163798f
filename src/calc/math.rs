// ==========================================
// Zootechnical & financial KPI formulas
// ==========================================
// Policy:
// - non-finite input is treated as 0
// - a ratio with a zero / non-positive denominator is 0
// - negative physical quantities (mass, counts) are treated as 0
// - negative results (profit, percentage change) are preserved
// ==========================================

/// Finite value or 0
#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Finite, non-negative value or 0
#[inline]
fn non_negative_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// `numerator / denominator`, or 0 when the denominator is not a finite
/// positive number or the ratio itself is not finite
#[inline]
fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if !denominator.is_finite() || denominator <= 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

/// Feed conversion ratio: feed consumed / weight gained (same mass unit)
pub fn calculate_fcr(total_feed: f64, total_weight_gained: f64) -> f64 {
    if !total_weight_gained.is_finite() || total_weight_gained <= 0.0 {
        return 0.0;
    }
    if !total_feed.is_finite() || total_feed <= 0.0 {
        return 0.0;
    }
    guarded_ratio(total_feed, total_weight_gained)
}

/// Cumulative deaths as a percentage (0-100) of the initial batch size
pub fn calculate_mortality_rate(deaths: f64, initial_quantity: f64) -> f64 {
    if !initial_quantity.is_finite() || initial_quantity <= 0.0 {
        return 0.0;
    }
    if !deaths.is_finite() || deaths <= 0.0 {
        return 0.0;
    }
    finite_or_zero(deaths / initial_quantity * 100.0)
}

/// Birds still in the house; never negative
pub fn calculate_birds_alive(initial_quantity: f64, deaths: f64, sold: f64) -> f64 {
    let alive = non_negative_or_zero(initial_quantity)
        - non_negative_or_zero(deaths)
        - non_negative_or_zero(sold);
    alive.max(0.0)
}

/// Revenue minus expenses; may be negative
pub fn calculate_profit(revenue: f64, expenses: f64) -> f64 {
    finite_or_zero(revenue) - finite_or_zero(expenses)
}

/// Total expenses per bird produced
pub fn calculate_cost_per_bird(total_expenses: f64, birds_produced: f64) -> f64 {
    guarded_ratio(total_expenses, birds_produced)
}

/// Total expenses per pound of bird sold
pub fn calculate_cost_per_lb(total_expenses: f64, total_weight_lb: f64) -> f64 {
    guarded_ratio(total_expenses, total_weight_lb)
}

/// Average weight per bird (unit follows `total_weight`)
pub fn calculate_avg_weight_per_bird(total_weight: f64, bird_count: f64) -> f64 {
    guarded_ratio(total_weight, bird_count)
}

/// Profit as a percentage of revenue
pub fn calculate_margin(profit: f64, revenue: f64) -> f64 {
    guarded_ratio(profit, revenue) * 100.0
}

/// Profit as a percentage of total expenses
pub fn calculate_roi(profit: f64, expenses: f64) -> f64 {
    guarded_ratio(profit, expenses) * 100.0
}

/// Sum of numeric-or-absent values; absent and non-finite entries count as 0
///
/// Accepts any iterator of `f64` or `Option<f64>`:
/// ```
/// use poultry_metrics::calc::math::safe_sum;
/// assert_eq!(safe_sum([Some(1.0), None, Some(3.0)]), 4.0);
/// assert_eq!(safe_sum(vec![2.0, f64::NAN]), 2.0);
/// ```
pub fn safe_sum<I, T>(values: I) -> f64
where
    I: IntoIterator<Item = T>,
    T: Into<Option<f64>>,
{
    values
        .into_iter()
        .map(|v| v.into().map(finite_or_zero).unwrap_or(0.0))
        .sum()
}

/// Sum a field over a slice of rows, with the same policy as [`safe_sum`]
pub fn safe_sum_by<R, F, T>(rows: &[R], field: F) -> f64
where
    F: Fn(&R) -> T,
    T: Into<Option<f64>>,
{
    safe_sum(rows.iter().map(field))
}

/// Relative change from `old_value` to `new_value`, in percent
pub fn calculate_percentage_change(old_value: f64, new_value: f64) -> f64 {
    if !old_value.is_finite() || old_value == 0.0 {
        return 0.0;
    }
    finite_or_zero((new_value - old_value) / old_value * 100.0)
}

/// `min(max(value, min), max)`
///
/// Unlike `f64::clamp` this never panics; a NaN value collapses to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
