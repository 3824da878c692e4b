// Scenario domain model - one demo industry vertical
use super::dashboard::{Dashboard, DashboardDocument};
use super::tile::{SizeType, Tile};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub dashboard_id: String,
    #[serde(default = "default_owner")]
    pub owner_id: String,
    pub dashboard_name: String,
    #[serde(default)]
    pub suggested_name: Option<String>,
    pub layout: Vec<Vec<String>>,
    /// Size of the tiles in each layout row; rows past the end are medium.
    #[serde(default)]
    pub row_sizes: Vec<SizeType>,
    #[serde(default)]
    pub visualizations: Vec<VisualizationTemplate>,
    #[serde(default)]
    pub query_matching: Vec<KeywordRule>,
    #[serde(default)]
    pub suggested_queries: Vec<SuggestedQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationTemplate {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub assistant_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRule {
    pub visualization: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedQuery {
    pub size: SizeType,
    pub query: String,
    pub visualization: String,
}

/// What the scenario picker shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub suggested_name: Option<String>,
    pub suggested_queries: Vec<SuggestedQuery>,
}

fn default_owner() -> String {
    "user-1".to_string()
}

impl Scenario {
    pub fn row_size(&self, row: usize) -> SizeType {
        self.row_sizes.get(row).copied().unwrap_or(SizeType::Medium)
    }

    /// Default dashboard for this scenario with every tile unpopulated.
    pub fn default_document(&self) -> DashboardDocument {
        let dashboard = Dashboard {
            dashboard_id: self.dashboard_id.clone(),
            owner_id: self.owner_id.clone(),
            name: self.dashboard_name.clone(),
            suggested_name: self.suggested_name.clone(),
            layout: self.layout.clone(),
        };

        let tiles = self
            .layout
            .iter()
            .enumerate()
            .flat_map(|(row, ids)| {
                ids.iter().enumerate().map(move |(column, id)| {
                    Tile::empty(
                        id.clone(),
                        self.dashboard_id.clone(),
                        row,
                        column,
                        self.row_size(row),
                    )
                })
            })
            .collect();

        DashboardDocument::new(dashboard, tiles)
    }

    pub fn visualization(&self, key: &str) -> Option<&VisualizationTemplate> {
        self.visualizations.iter().find(|v| v.key == key)
    }

    /// Naive keyword matching: the first rule with a keyword contained in the
    /// lowercased query wins, otherwise the first visualization.
    pub fn match_query(&self, query: &str) -> Option<&VisualizationTemplate> {
        let query = query.to_lowercase();

        self.query_matching
            .iter()
            .filter(|rule| {
                rule.keywords
                    .iter()
                    .any(|keyword| query.contains(&keyword.to_lowercase()))
            })
            .find_map(|rule| self.visualization(&rule.visualization))
            .or_else(|| self.visualizations.first())
    }

    pub fn suggested_queries_for(&self, size: SizeType) -> impl Iterator<Item = &SuggestedQuery> {
        self.suggested_queries.iter().filter(move |q| q.size == size)
    }

    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.title.to_lowercase().contains(&term)
            || self.subtitle.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }

    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            description: self.description.clone(),
            suggested_name: self.suggested_name.clone(),
            suggested_queries: self.suggested_queries.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn all(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn search<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a Scenario> + 'a {
        self.scenarios.iter().filter(move |s| s.matches_search(term))
    }
}

#[cfg(test)]
pub(crate) fn test_scenario() -> Scenario {
    use serde_json::json;

    let template = |key: &str, title: &str| VisualizationTemplate {
        key: key.to_string(),
        title: title.to_string(),
        kind: key.to_string(),
        data: json!({ "labels": ["A", "B"], "values": [1.0, 2.0] }),
        metadata: json!({ "unit": "%" }),
        assistant_message: Some(format!("Done. The chart now shows {}.", title.to_lowercase())),
    };
    let rule = |visualization: &str, keywords: &[&str]| KeywordRule {
        visualization: visualization.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    };
    let ids = |ids: &[&str]| ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();

    Scenario {
        id: "property-appraisal".to_string(),
        title: "Property Appraisal".to_string(),
        subtitle: "Annual Assessment Uniformity Audit".to_string(),
        description: "Analyze property assessment uniformity and sales ratios.".to_string(),
        dashboard_id: "dashboard-1".to_string(),
        owner_id: "user-1".to_string(),
        dashboard_name: "Custom Dashboard".to_string(),
        suggested_name: Some("Annual Assessment Uniformity Audit".to_string()),
        layout: vec![
            ids(&["tile-1", "tile-2", "tile-3", "tile-4"]),
            ids(&["tile-5", "tile-6"]),
            ids(&["tile-7"]),
        ],
        row_sizes: vec![SizeType::Small, SizeType::Medium, SizeType::Large],
        visualizations: vec![
            template("coefficient-dispersion-chart", "Coefficient of Dispersion"),
            template("prd-analysis-chart", "Price-Related Differential"),
            template("sales-map-chart", "Sales Ratio Map"),
        ],
        query_matching: vec![
            rule("coefficient-dispersion-chart", &["cod", "coefficient"]),
            rule("prd-analysis-chart", &["price-related", "prd"]),
            rule("sales-map-chart", &["map", "neighborhood"]),
        ],
        suggested_queries: vec![SuggestedQuery {
            size: SizeType::Small,
            query: "Show COD by property type".to_string(),
            visualization: "coefficient-dispersion-chart".to_string(),
        }],
    }
}
