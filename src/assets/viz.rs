use common::MaterializeResult;
use serde::{Deserialize, Serialize};

use crate::resources::DashboardStub;

/// Summary shaped for a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VizData {
    pub sum: i64,
    pub title: String,
}

pub fn viz_ready_data(sum: i64) -> MaterializeResult<VizData> {
    MaterializeResult::new(VizData {
        sum,
        title: "Numbers Summary".to_string(),
    })
}

pub fn dashboard_publish(viz: &VizData, dashboard: &DashboardStub) -> MaterializeResult<String> {
    let path = dashboard.publish(viz);
    MaterializeResult::new(path.clone()).with_metadata("dashboard_path", path)
}
