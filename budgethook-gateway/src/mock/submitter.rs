use crate::submitter::SubmitBudget;
use async_trait::async_trait;
use budgethook_domain::{
    budget::{Budget, CreateBudgetRequest},
    BudgetHookError, InternalError,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Records every request it receives instead of calling the billing API.
#[derive(Clone, Default)]
pub struct MockSubmitter {
    requests: Arc<Mutex<Vec<CreateBudgetRequest>>>,
    fail: bool,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A submitter whose every call fails as if the billing API rejected it.
    pub fn failing() -> Self {
        Self {
            requests: Arc::default(),
            fail: true,
        }
    }

    pub async fn requests(&self) -> Vec<CreateBudgetRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl SubmitBudget for MockSubmitter {
    async fn submit_budget(
        &self,
        request: &CreateBudgetRequest,
    ) -> Result<Budget, BudgetHookError> {
        self.requests.lock().await.push(request.clone());

        if self.fail {
            return Err(InternalError::upstream_error(
                "Response Status: 500",
                Some("CreateBudget"),
            ));
        }

        let mut budget = request.budget.clone();
        budget.name = Some(format!("{}/budgets/mock", request.parent));
        Ok(budget)
    }
}
