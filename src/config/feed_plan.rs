// ==========================================
// Feed plan - weekly broiler feeding tiers
// ==========================================
// Stored as JSON under config key `feed_plan`
// ==========================================

use serde::{Deserialize, Serialize};

/// One production week of the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedTier {
    pub week: u32,
    pub name: String,
    pub days: String,
    pub lb_per_bird: f64, // per bird per week
}

/// Ordered tiers, week 1 first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedPlan {
    tiers: Vec<FeedTier>,
}

impl FeedPlan {
    /// Tiers sorted by week; `None` when empty
    pub fn new(mut tiers: Vec<FeedTier>) -> Option<Self> {
        if tiers.is_empty() {
            return None;
        }
        tiers.sort_by_key(|t| t.week);
        Some(Self { tiers })
    }

    pub fn tiers(&self) -> &[FeedTier] {
        &self.tiers
    }

    /// Tier for a production week; weeks past the plan use the last tier
    pub fn tier_for_week(&self, week: u32) -> Option<&FeedTier> {
        let index = week.saturating_sub(1) as usize;
        self.tiers.get(index).or_else(|| self.tiers.last())
    }

    /// Parse the stored JSON; `None` for malformed or empty plans
    pub fn from_json(raw: &str) -> Option<Self> {
        let tiers: Vec<FeedTier> = serde_json::from_str(raw).ok()?;
        if tiers
            .iter()
            .any(|t| !t.lb_per_bird.is_finite() || t.lb_per_bird < 0.0)
        {
            return None;
        }
        Self::new(tiers)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.tiers).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for FeedPlan {
    /// Six-week broiler plan
    fn default() -> Self {
        let tier = |week, name: &str, days: &str, lb_per_bird| FeedTier {
            week,
            name: name.to_string(),
            days: days.to_string(),
            lb_per_bird,
        };
        Self {
            tiers: vec![
                tier(1, "Pre-Iniciarina", "0-7", 0.45),
                tier(2, "Iniciarina", "8-14", 0.85),
                tier(3, "Iniciarina", "15-21", 1.1),
                tier(4, "Engordina", "22-28", 1.8),
                tier(5, "Engordina", "29-35", 2.4),
                tier(6, "Engordina", "36-45", 2.6),
            ],
        }
    }
}
