//! Market research over a static per-segment catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use sb_protocol::{Domain, Operation, ParameterSet, ResearchOp};
use serde::Deserialize;

use crate::error::CommerceResult;
use crate::handler::{CapabilityHandler, require_text, wrong_domain};

/// Research notes for one market segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketSegment {
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub trends: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Segment name → research notes.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct MarketCatalog {
    segments: HashMap<String, MarketSegment>,
}

impl Default for MarketCatalog {
    /// The built-in fashion segment.
    fn default() -> Self {
        let fashion = MarketSegment {
            competitors: vec![
                "ZARA - מחירים ממוצעים גבוהים ב-20%".into(),
                "H&M - מחירים דומים, איכות בינונית".into(),
                "CASTRO - מחירים גבוהים ב-15%, מיקוד בקהל מקומי".into(),
            ],
            trends: vec![
                "בגדים בני-קיימא".into(),
                "אופנה מקיימת".into(),
                "חומרים טבעיים".into(),
            ],
            recommendations: vec![
                "להתמקד במחירים תחרותיים".into(),
                "להדגיש איכות חומרים".into(),
                "לשלב קולקציות אקולוגיות".into(),
            ],
        };
        Self::empty().with_segment("אופנה", fashion)
    }
}

impl MarketCatalog {
    pub fn empty() -> Self {
        Self {
            segments: HashMap::new(),
        }
    }

    pub fn with_segment(mut self, name: impl Into<String>, segment: MarketSegment) -> Self {
        self.segments.insert(name.into(), segment);
        self
    }

    pub fn segment(&self, name: &str) -> Option<&MarketSegment> {
        self.segments.get(name.trim())
    }

    /// Known segment names, sorted.
    pub fn segment_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.segments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn bullets(title: &str, items: &[String]) -> String {
    let mut out = String::from(title);
    for item in items {
        out.push_str("\n• ");
        out.push_str(item);
    }
    out
}

/// Serves the research domain from a [`MarketCatalog`].
pub struct ResearchHandler {
    catalog: MarketCatalog,
}

impl ResearchHandler {
    pub fn new(catalog: MarketCatalog) -> Self {
        Self { catalog }
    }

    fn answer(&self, op: ResearchOp, segment_name: &str) -> String {
        let Some(segment) = self.catalog.segment(segment_name) else {
            let known = self.catalog.segment_names().join(", ");
            return match op {
                ResearchOp::AnalyzeCompetitors => format!("אין מידע על מתחרים בתחום {segment_name}. תחומים זמינים: {known}"),
                ResearchOp::GetMarketTrends => format!("אין מידע על טרנדים בתחום {segment_name}. תחומים זמינים: {known}"),
                ResearchOp::GetRecommendations => format!("אין המלצות זמינות לתחום {segment_name}. תחומים זמינים: {known}"),
            };
        };
        match op {
            ResearchOp::AnalyzeCompetitors => bullets("ניתוח מתחרים:", &segment.competitors),
            ResearchOp::GetMarketTrends => bullets("טרנדים נוכחיים:", &segment.trends),
            ResearchOp::GetRecommendations => bullets("המלצות עסקיות:", &segment.recommendations),
        }
    }
}

#[async_trait]
impl CapabilityHandler for ResearchHandler {
    fn domain(&self) -> Domain {
        Domain::Research
    }

    async fn handle(&self, operation: Operation, params: &ParameterSet) -> CommerceResult<String> {
        let Operation::Research(op) = operation else {
            return Err(wrong_domain(operation, Domain::Research));
        };
        let segment = require_text(params, &["market_segment"])?;
        Ok(self.answer(op, &segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommerceError;
    use sb_protocol::InformationOp;

    fn params(segment: &str) -> ParameterSet {
        ParameterSet::new().with("market_segment", segment)
    }

    #[tokio::test]
    async fn competitors_for_fashion() {
        let handler = ResearchHandler::new(MarketCatalog::default());
        let text = handler
            .handle(Operation::Research(ResearchOp::AnalyzeCompetitors), &params("אופנה"))
            .await
            .unwrap();
        assert!(text.starts_with("ניתוח מתחרים:"));
        assert!(text.contains("• ZARA"));
        assert_eq!(text.lines().count(), 4);
    }

    #[tokio::test]
    async fn unknown_segment_lists_known_ones() {
        let handler = ResearchHandler::new(MarketCatalog::default());
        let text = handler
            .handle(Operation::Research(ResearchOp::GetMarketTrends), &params("רכב"))
            .await
            .unwrap();
        assert!(text.contains("אין מידע על טרנדים בתחום רכב"));
        assert!(text.contains("אופנה"));
    }

    #[tokio::test]
    async fn rejects_foreign_operation() {
        let handler = ResearchHandler::new(MarketCatalog::default());
        let err = handler
            .handle(Operation::Information(InformationOp::GetCoupons), &params("אופנה"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidParameter(_)));
    }

    #[test]
    fn catalog_deserializes() {
        let json = serde_json::json!({
            "אלקטרוניקה": {"competitors": ["KSP"], "trends": ["בית חכם"]}
        });
        let catalog: MarketCatalog = serde_json::from_value(json).unwrap();
        let segment = catalog.segment("אלקטרוניקה").unwrap();
        assert_eq!(segment.competitors, ["KSP"]);
        assert!(segment.recommendations.is_empty());
    }
}
