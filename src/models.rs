use crate::day_key::DayKey;
use crate::week::WeekDay;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeAction {
    Add,
    Subtract,
}

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    pub action: IntakeAction,
    pub amount_ml: f64,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal_ml: f64,
}

/// Read-only view of the tracker handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub date: DayKey,
    pub progress_ml: f64,
    pub goal_ml: f64,
    pub streak: u32,
    pub fraction: f64,
    pub goal_reached: bool,
    pub quick_add_ml: Vec<f64>,
    /// Set while the last persistence write failed.
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WeekResponse {
    pub today: DayKey,
    pub days: Vec<WeekDay>,
}
