//! OpenTargets Platform GraphQL client.
//!
//! Two calls per disease: a search that resolves the disease name to an EFO
//! identifier, then the associated-targets page for that identifier.
//!
//! Endpoint: https://api.platform.opentargets.org/api/v4/graphql

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use stargazer_common::sandbox::SandboxClient;
use stargazer_common::{Result, StargazerError};

/// Rows requested from the associated-targets page.
pub const ASSOCIATED_TARGETS_PAGE_SIZE: u32 = 300;

const SEARCH_DISEASE_QUERY: &str = r#"
query searchDiseaseID($diseaseName: String!, $entityNames: [String!]) {
  search(queryString: $diseaseName, entityNames: $entityNames) {
    total
    hits { id name }
  }
}
"#;

const ASSOCIATED_TARGETS_QUERY: &str = r#"
query associatedTargets($diseaseID: String!, $size: Int!) {
  disease(efoId: $diseaseID) {
    id
    name
    associatedTargets(page: { index: 0, size: $size }) {
      count
      rows {
        target { approvedSymbol }
        score
      }
    }
  }
}
"#;

/// Gene-level association score for one disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetAssociation {
    pub gene_symbol: String,
    pub score: f64,
}

pub struct OpenTargetsClient {
    client: SandboxClient,
    endpoint: String,
}

impl OpenTargetsClient {
    pub fn new(client: SandboxClient, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }

    fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        let resp = self.client
            .post(&self.endpoint)?
            .json(&json!({ "query": query, "variables": variables }))
            .send()?
            .error_for_status()?;
        Ok(resp.json::<Value>()?)
    }

    /// Resolve a disease name to its identifier.
    /// `None` when no hit matches the name case-insensitively.
    #[instrument(skip(self))]
    pub fn search_disease_id(&self, disease_name: &str) -> Result<Option<String>> {
        let body = self.graphql(
            SEARCH_DISEASE_QUERY,
            json!({ "diseaseName": disease_name, "entityNames": ["disease"] }),
        )?;
        let id = parse_disease_id(&body, disease_name)?;
        debug!(disease = disease_name, id = ?id, "OpenTargets disease lookup");
        Ok(id)
    }

    /// First page of targets associated with a disease identifier.
    #[instrument(skip(self))]
    pub fn associated_targets(&self, disease_id: &str) -> Result<Vec<TargetAssociation>> {
        let body = self.graphql(
            ASSOCIATED_TARGETS_QUERY,
            json!({ "diseaseID": disease_id, "size": ASSOCIATED_TARGETS_PAGE_SIZE }),
        )?;
        let rows = parse_associated_targets(&body)?;
        debug!(disease_id, targets = rows.len(), "OpenTargets associations fetched");
        Ok(rows)
    }

    /// Name → identifier → scores. `Ok(None)` when the name does not resolve.
    pub fn gene_scores(&self, disease_name: &str) -> Result<Option<Vec<TargetAssociation>>> {
        match self.search_disease_id(disease_name)? {
            Some(id) => Ok(Some(self.associated_targets(&id)?)),
            None => Ok(None),
        }
    }
}

/// First hit whose name equals `disease_name`, ignoring case.
pub fn parse_disease_id(body: &Value, disease_name: &str) -> Result<Option<String>> {
    let hits = body["data"]["search"]["hits"]
        .as_array()
        .ok_or_else(|| StargazerError::Upstream("OpenTargets search: missing data.search.hits".to_string()))?;

    let wanted = disease_name.to_lowercase();
    Ok(hits
        .iter()
        .find(|h| h["name"].as_str().map(|n| n.to_lowercase() == wanted).unwrap_or(false))
        .and_then(|h| h["id"].as_str())
        .map(String::from))
}

pub fn parse_associated_targets(body: &Value) -> Result<Vec<TargetAssociation>> {
    let rows = body["data"]["disease"]["associatedTargets"]["rows"]
        .as_array()
        .ok_or_else(|| {
            StargazerError::Upstream("OpenTargets: missing data.disease.associatedTargets.rows".to_string())
        })?;

    Ok(rows
        .iter()
        .filter_map(|r| {
            Some(TargetAssociation {
                gene_symbol: r["target"]["approvedSymbol"].as_str()?.to_string(),
                score: r["score"].as_f64()?,
            })
        })
        .collect())
}
