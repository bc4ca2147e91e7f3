use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One observed demand point from the uploaded history.
///
/// The model emits extra per-point fields (profit bands, per-day thresholds);
/// they are flattened through unchanged. Numbers stay `serde_json::Number` so
/// integers are not rewritten as floats on the way back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualPoint {
    pub ds: String,
    pub y: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One forecast horizon point: mean estimate plus its confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: String,
    pub yhat: Number,
    pub yhat_lower: Number,
    pub yhat_upper: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The full model response. `actual` and `forecast` keep the model's
/// chronological ordering; the inventory thresholds and any additional
/// summary fields pass through verbatim with no validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub actual: Vec<ActualPoint>,
    pub forecast: Vec<ForecastPoint>,
    pub optimal_stock: Number,
    pub reorder_point: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_the_contract_fields() {
        let body = json!({
            "actual": [{"ds": "2024-11-01", "y": 184}],
            "forecast": [{
                "ds": "2025-01-01",
                "yhat": 172.7,
                "yhat_lower": 143.3,
                "yhat_upper": 199.7
            }],
            "optimal_stock": 154,
            "reorder_point": 1153.55
        });

        let result: ForecastResult = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(result.actual.len(), 1);
        assert_eq!(result.forecast[0].ds, "2025-01-01");
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
    }

    #[test]
    fn integer_thresholds_stay_integers() {
        let result: ForecastResult = serde_json::from_value(json!({
            "actual": [],
            "forecast": [],
            "optimal_stock": 154,
            "reorder_point": 1153.55
        }))
        .unwrap();

        let serialized = serde_json::to_string(&result).unwrap();
        assert!(serialized.contains("\"optimal_stock\":154"));
        assert!(serialized.contains("\"reorder_point\":1153.55"));
    }

    #[test]
    fn unknown_model_fields_pass_through() {
        let body = json!({
            "actual": [{"ds": "2024-11-01", "y": 184, "daily_profit": 12.5, "profit_band": 0.4}],
            "forecast": [],
            "optimal_stock": 154,
            "reorder_point": 1153.55,
            "model_accuracy": "91.2%",
            "confidence_level": "High",
            "safety_stock": 33.1
        });

        let result: ForecastResult = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(result.extra["confidence_level"], json!("High"));
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
    }

    #[test]
    fn ordering_is_preserved() {
        let result: ForecastResult = serde_json::from_value(json!({
            "actual": [
                {"ds": "2024-11-03", "y": 169},
                {"ds": "2024-11-01", "y": 184},
                {"ds": "2024-11-02", "y": 187}
            ],
            "forecast": [],
            "optimal_stock": 1,
            "reorder_point": 1
        }))
        .unwrap();

        let days: Vec<&str> = result.actual.iter().map(|p| p.ds.as_str()).collect();
        assert_eq!(days, vec!["2024-11-03", "2024-11-01", "2024-11-02"]);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let result: Result<ForecastResult, _> = serde_json::from_value(json!({
            "actual": [],
            "forecast": [],
            "optimal_stock": 154
        }));
        assert!(result.is_err());
    }
}
