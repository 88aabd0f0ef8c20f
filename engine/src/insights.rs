//! City metrics, survey responses and the trends and needs derived from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric value above which a "High" trend is reported
const HIGH_METRIC: f64 = 0.8;
/// Metric value below which a "Low" trend is reported
const LOW_METRIC: f64 = 0.2;
/// Survey "key: value" pairs reported as trends
const TOP_SURVEY_TRENDS: usize = 5;

const ENERGY_EFFICIENCY_TARGET: f64 = 0.7;
const DATA_PRIVACY_TARGET: f64 = 0.8;
/// Satisfaction below this flags the response's area as a need
const SATISFACTION_FLOOR: u8 = 3;

/// One resident's survey answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub area: String,
    /// 1 (unhappy) to 5 (happy); missing answers count as satisfied
    #[serde(default = "default_satisfaction")]
    pub satisfaction: u8,
    /// Free-form extra answers
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_satisfaction() -> u8 {
    5
}

impl SurveyResponse {
    pub fn new(area: impl Into<String>, satisfaction: u8) -> Self {
        Self {
            area: area.into(),
            satisfaction,
            extra: BTreeMap::new(),
        }
    }

    /// Every field as a "key: value" string, area and satisfaction first
    fn answer_pairs(&self) -> Vec<String> {
        let mut pairs = vec![
            format!("area: {}", self.area),
            format!("satisfaction: {}", self.satisfaction),
        ];
        for (key, value) in &self.extra {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            pairs.push(format!("{key}: {rendered}"));
        }
        pairs
    }
}

/// Observed city state the generators adapt to
#[derive(Debug, Clone, Default)]
pub struct CityInsights {
    metrics: BTreeMap<String, f64>,
    survey: Vec<SurveyResponse>,
}

impl CityInsights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current metric snapshot
    pub fn monitor_city_metrics(&mut self, metrics: BTreeMap<String, f64>) {
        self.metrics = metrics;
    }

    /// Append survey responses
    pub fn conduct_survey(&mut self, responses: impl IntoIterator<Item = SurveyResponse>) {
        self.survey.extend(responses);
    }

    pub fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    pub fn survey(&self) -> &[SurveyResponse] {
        &self.survey
    }

    /// "High m" / "Low m" per extreme metric, then the most common survey answers
    pub fn analyze_trends(&self) -> Vec<String> {
        let mut trends = Vec::new();
        for (metric, value) in &self.metrics {
            if *value > HIGH_METRIC {
                trends.push(format!("High {metric}"));
            } else if *value < LOW_METRIC {
                trends.push(format!("Low {metric}"));
            }
        }

        // First-seen order breaks count ties
        let mut counts: Vec<(String, usize)> = Vec::new();
        for response in &self.survey {
            for pair in response.answer_pairs() {
                match counts.iter_mut().find(|(p, _)| *p == pair) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((pair, 1)),
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        trends.extend(
            counts
                .into_iter()
                .take(TOP_SURVEY_TRENDS)
                .map(|(pair, _)| pair),
        );

        trends
    }

    /// Needs implied by lagging metrics and unhappy survey responses
    ///
    /// A metric that was never reported counts as 0.
    pub fn analyze_needs(&self) -> Vec<String> {
        let mut needs = Vec::new();
        let metric = |name: &str| self.metrics.get(name).copied().unwrap_or(0.0);

        if metric("energy_efficiency") < ENERGY_EFFICIENCY_TARGET {
            needs.push("Improve energy efficiency".to_string());
        }
        if metric("data_privacy_score") < DATA_PRIVACY_TARGET {
            needs.push("Enhance data privacy measures".to_string());
        }
        for response in &self.survey {
            if response.satisfaction < SATISFACTION_FLOOR {
                needs.push(format!("Address {} concerns", response.area));
            }
        }

        needs
    }

    /// Lower-cased needs that no vocabulary concept covers, deduplicated
    pub fn identify_capability_gaps(&self, concepts: &[String]) -> Vec<String> {
        let mut gaps: Vec<String> = Vec::new();
        for need in self.analyze_needs() {
            let need = need.to_lowercase();
            if !concepts.contains(&need) && !gaps.contains(&need) {
                gaps.push(need);
            }
        }
        gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_trends_from_extreme_metrics() {
        let mut insights = CityInsights::new();
        insights.monitor_city_metrics(metrics(&[
            ("air_quality", 0.9),
            ("noise", 0.1),
            ("transit_use", 0.5),
        ]));
        assert_eq!(insights.analyze_trends(), vec!["High air_quality", "Low noise"]);
    }

    #[test]
    fn test_survey_trends_most_common_first() {
        let mut insights = CityInsights::new();
        insights.conduct_survey([
            SurveyResponse::new("Harbor", 4),
            SurveyResponse::new("Harbor", 2),
            SurveyResponse::new("Old Town", 4),
        ]);
        let trends = insights.analyze_trends();
        assert_eq!(trends[0], "area: Harbor");
        assert_eq!(trends[1], "satisfaction: 4");
        assert_eq!(trends.len(), 4);
    }

    #[test]
    fn test_needs_default_missing_metrics_to_zero() {
        let insights = CityInsights::new();
        assert_eq!(
            insights.analyze_needs(),
            vec!["Improve energy efficiency", "Enhance data privacy measures"]
        );
    }

    #[test]
    fn test_needs_from_metrics_and_survey() {
        let mut insights = CityInsights::new();
        insights.monitor_city_metrics(metrics(&[
            ("energy_efficiency", 0.75),
            ("data_privacy_score", 0.5),
        ]));
        insights.conduct_survey([
            SurveyResponse::new("Harbor", 2),
            SurveyResponse::new("Old Town", 3),
        ]);
        assert_eq!(
            insights.analyze_needs(),
            vec!["Enhance data privacy measures", "Address Harbor concerns"]
        );
    }

    #[test]
    fn test_capability_gaps_skip_known_concepts() {
        let mut insights = CityInsights::new();
        insights.monitor_city_metrics(metrics(&[("energy_efficiency", 0.9)]));
        let concepts = vec!["enhance data privacy measures".to_string()];
        assert!(insights.identify_capability_gaps(&concepts).is_empty());

        insights.conduct_survey([
            SurveyResponse::new("Harbor", 1),
            SurveyResponse::new("Harbor", 1),
        ]);
        assert_eq!(
            insights.identify_capability_gaps(&concepts),
            vec!["address harbor concerns"]
        );
    }

    #[test]
    fn test_survey_response_extra_fields() {
        let json = r#"{"area": "Harbor", "satisfaction": 2, "comment": "too loud", "age": 31}"#;
        let response: SurveyResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(response.satisfaction, 2);
        assert_eq!(
            response.answer_pairs(),
            vec!["area: Harbor", "satisfaction: 2", "age: 31", "comment: too loud"]
        );

        let bare: SurveyResponse = serde_json::from_str(r#"{"area": "Park"}"#).expect("parse");
        assert_eq!(bare.satisfaction, 5);
    }
}
