pub mod google;

use async_trait::async_trait;
use budgethook_domain::{
    budget::{Budget, CreateBudgetRequest},
    BudgetHookError,
};

/// Creates a budget on the billing provider and returns the created resource.
#[async_trait]
pub trait SubmitBudget {
    async fn submit_budget(
        &self,
        request: &CreateBudgetRequest,
    ) -> Result<Budget, BudgetHookError>;
}
