//! The plain-text convention used inside a Backlog issue description to request a budget:
//!
//! ```text
//! ProjectId: proj-1
//! BillingAccountId: 012345-ABCDEF
//! Budget[¥]: 50000
//! ```
//!
//! Markers must appear in this order. Anything before the first marker is ignored.

use crate::{ApplicationError, BudgetHookError};
use serde::Serialize;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use strum::AsRefStr;
use thiserror::Error;
use tracing::warn;

pub const PROJECT_ID_MARKER: &str = "ProjectId: ";
pub const BILLING_ACCOUNT_ID_MARKER: &str = "BillingAccountId: ";
pub const BUDGET_MARKER: &str = "Budget[¥]: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum DescriptionField {
    ProjectId,
    BillingAccountId,
    Budget,
}

impl DescriptionField {
    pub fn marker(&self) -> &'static str {
        match self {
            DescriptionField::ProjectId => PROJECT_ID_MARKER,
            DescriptionField::BillingAccountId => BILLING_ACCOUNT_ID_MARKER,
            DescriptionField::Budget => BUDGET_MARKER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptionError {
    #[error("Marker {:?} for {} not found in description", .field.marker(), .field.as_ref())]
    MarkerNotFound { field: DescriptionField },
}

impl From<DescriptionError> for BudgetHookError {
    fn from(error: DescriptionError) -> Self {
        match &error {
            DescriptionError::MarkerNotFound { field } => {
                ApplicationError::unprocessable_entity(&error.to_string(), Some(field.as_ref()))
            }
        }
    }
}

/// Budget request extracted from an issue description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionInfo {
    pub project_id: String,
    pub billing_account_id: String,
    /// Whole currency units.
    pub budget: i64,
}

impl DescriptionInfo {
    pub fn new(project_id: &str, billing_account_id: &str, budget: i64) -> Self {
        Self {
            project_id: project_id.to_owned(),
            billing_account_id: billing_account_id.to_owned(),
            budget,
        }
    }
}

/// Returns the byte range of `field`'s marker, searching from `from` onwards.
fn locate(
    description: &str,
    from: usize,
    field: DescriptionField,
) -> Result<(usize, usize), DescriptionError> {
    let marker = field.marker();
    description[from..]
        .find(marker)
        .map(|index| (from + index, from + index + marker.len()))
        .ok_or(DescriptionError::MarkerNotFound { field })
}

impl FromStr for DescriptionInfo {
    type Err = DescriptionError;

    fn from_str(description: &str) -> Result<Self, Self::Err> {
        let (_, project_start) = locate(description, 0, DescriptionField::ProjectId)?;
        let (project_end, account_start) =
            locate(description, project_start, DescriptionField::BillingAccountId)?;
        let (account_end, budget_start) =
            locate(description, account_start, DescriptionField::Budget)?;

        // The separator before the next marker is not part of the value
        let project_id = description[project_start..project_end].trim_end();
        let billing_account_id = description[account_start..account_end].trim_end();

        let amount = description[budget_start..].trim();
        let budget = amount.parse::<i64>().unwrap_or_else(|e| {
            warn!("Budget amount {amount:?} is not an integer, using 0: {e}");
            0
        });

        Ok(DescriptionInfo::new(project_id, billing_account_id, budget))
    }
}

impl Display for DescriptionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{PROJECT_ID_MARKER}{}", self.project_id)?;
        writeln!(f, "{BILLING_ACCOUNT_ID_MARKER}{}", self.billing_account_id)?;
        write!(f, "{BUDGET_MARKER}{}", self.budget)
    }
}
