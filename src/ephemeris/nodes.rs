use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::angle::normalize_degree;
use crate::error::{AstroError, Result};
use crate::time::JulianDate;

/// Which ascending lunar node to report for Rahu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Mean,
    #[default]
    True,
}

impl FromStr for NodeKind {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(NodeKind::Mean),
            "true" | "osculating" => Ok(NodeKind::True),
            other => Err(AstroError::Parse(format!("unknown node kind: {}", other))),
        }
    }
}

/// Longitude of the Moon's mean ascending node (Meeus 47.7).
pub fn mean_lunar_node(jd_tt: JulianDate) -> f64 {
    let t = jd_tt.centuries_since_j2000();
    normalize_degree(
        125.044_547_9 - 1_934.136_289_1 * t + 0.002_075_4 * t * t + t.powi(3) / 467_441.0
            - t.powi(4) / 60_616_000.0,
    )
}

/// Mean node corrected by the dominant periodic terms of the true node.
pub fn true_lunar_node(jd_tt: JulianDate) -> f64 {
    let t = jd_tt.centuries_since_j2000();
    let elongation = (297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t * t).to_radians();
    let sun_anomaly = (357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t * t).to_radians();
    let moon_anomaly = (134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t * t).to_radians();
    let latitude_arg = (93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t * t).to_radians();

    let correction = -1.4979 * (2.0 * (elongation - latitude_arg)).sin()
        - 0.1500 * sun_anomaly.sin()
        - 0.1226 * (2.0 * elongation).sin()
        + 0.1176 * (2.0 * latitude_arg).sin()
        - 0.0801 * (2.0 * (latitude_arg - moon_anomaly)).sin();

    normalize_degree(mean_lunar_node(jd_tt) + correction)
}

/// Tropical longitudes of Rahu (ascending node) and Kethu, 180° apart.
pub fn lunar_node(jd_tt: JulianDate, kind: NodeKind) -> (f64, f64) {
    let rahu = match kind {
        NodeKind::Mean => mean_lunar_node(jd_tt),
        NodeKind::True => true_lunar_node(jd_tt),
    };
    (rahu, normalize_degree(rahu + 180.0))
}
