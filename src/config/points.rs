//! Point system for standings

use serde::{Deserialize, Serialize};

/// Points awarded per round and for a 2-0 sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointSystem {
    pub win_lead: i32,
    pub win_assist: i32,
    pub loss_lead: i32,
    pub loss_assist: i32,
    pub sweep_lead: i32,
    pub sweep_assist: i32,
}

impl Default for PointSystem {
    fn default() -> Self {
        Self {
            win_lead: 4,
            win_assist: 2,
            loss_lead: 0,
            loss_assist: 1,
            sweep_lead: 0,
            sweep_assist: 1,
        }
    }
}
