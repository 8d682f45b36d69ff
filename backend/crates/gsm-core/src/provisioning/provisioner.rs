use crate::{ProvisionOutcome, ProvisionRequest, Result as LifecycleResult};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// External package manager that installs or updates the server.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Run the tool to completion, timeout or cancellation.
    ///
    /// A timed out or cancelled run must leave no process behind. Errors are
    /// reserved for failing to start the tool at all.
    async fn provision(
        &self,
        request: &ProvisionRequest,
        cancel: CancellationToken,
    ) -> LifecycleResult<ProvisionOutcome>;
}
