//! Shared helpers for quorum integration tests

#![allow(dead_code)]

use quorum::{
    Assessment, KeyDetails, MemoryStore, MockGateway, Orchestrator, Recommendation, RiskLevel,
};
use std::sync::Arc;

/// A conforming assessment with the given recommendation
pub fn assessment(recommendation: Recommendation) -> Assessment {
    Assessment {
        recommendation,
        reasoning: "Modest budget with measurable milestones.".to_string(),
        summary: "Allocates treasury funds to a community grants round.".to_string(),
        key_details: KeyDetails {
            budget_impact: "-10K USD".to_string(),
            duration: "3 Months".to_string(),
            risk_level: RiskLevel::Low,
            category: "Funding".to_string(),
        },
    }
}

/// Provider text for a conforming assessment
pub fn raw_assessment(recommendation: &str, risk_level: &str) -> String {
    serde_json::json!({
        "recommendation": recommendation,
        "reasoning": "Clear deliverables.",
        "summary": "Funds a grants round.",
        "keyDetails": {
            "budgetImpact": "-10K USD",
            "duration": "3 Months",
            "riskLevel": risk_level,
            "category": "Funding"
        }
    })
    .to_string()
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<MockGateway>,
    pub orchestrator: Orchestrator,
}

/// Orchestrator over a fresh store, keeping handles to both collaborators
pub fn harness(gateway: MockGateway) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(gateway);
    let orchestrator = Orchestrator::new(store.clone(), gateway.clone());
    Harness {
        store,
        gateway,
        orchestrator,
    }
}
