use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::errors::ListError;
use super::filter::NameFilter;
use super::traits::{Deletable, Lister};

/// One listing snapshot of a single resource kind, narrowed by a name filter.
///
/// Never refreshed: items deleted during the run stay in the set and items
/// created during the run are invisible.
#[derive(Clone)]
pub struct ResourceSet {
    resource_type: String,
    items: Vec<Arc<dyn Deletable>>,
}

impl ResourceSet {
    pub fn new(resource_type: impl Into<String>, items: Vec<Arc<dyn Deletable>>) -> Self {
        Self {
            resource_type: resource_type.into(),
            items,
        }
    }

    /// Keep the raw items whose name passes `filter`, in lister order.
    pub fn filtered(
        resource_type: impl Into<String>,
        raw: Vec<Arc<dyn Deletable>>,
        filter: &NameFilter,
    ) -> Self {
        let items = raw
            .into_iter()
            .filter(|item| filter.matches(item.name()))
            .collect();
        Self::new(resource_type, items)
    }

    /// List one kind through `lister` and apply `filter`.
    pub async fn build(
        lister: &dyn Lister,
        scope: &str,
        filter: &NameFilter,
    ) -> Result<Self, ListError> {
        let raw = lister.list(scope).await?;
        let listed = raw.len();
        let set = Self::filtered(lister.resource_type(), raw, filter);

        info!(
            event = "core.resources.list_completed",
            resource_type = set.resource_type,
            listed = listed,
            matched = set.items.len(),
            filter = filter.as_str()
        );

        Ok(set)
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn items(&self) -> &[Arc<dyn Deletable>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.identifier()).collect()
    }
}

impl fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSet")
            .field("resource_type", &self.resource_type)
            .field("items", &self.identifiers())
            .finish()
    }
}

/// Every kind's listing result for one sweep invocation.
#[derive(Debug, Default)]
pub struct ListOutcome {
    pub sets: Vec<ResourceSet>,
    /// Kinds whose listing failed, with the reason. Other kinds are unaffected.
    pub failures: Vec<(String, ListError)>,
}

/// Build a `ResourceSet` per lister, in lister order.
///
/// A failing lister only loses its own kind. Once `cancel` fires, kinds not
/// yet listed are recorded as `ListError::Cancelled`.
pub async fn list_resource_sets(
    listers: &[Arc<dyn Lister>],
    scope: &str,
    filter: &NameFilter,
    cancel: &CancellationToken,
) -> ListOutcome {
    let mut outcome = ListOutcome::default();

    for lister in listers {
        let resource_type = lister.resource_type().to_string();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ListError::Cancelled),
            result = ResourceSet::build(lister.as_ref(), scope, filter) => result,
        };

        match result {
            Ok(set) => outcome.sets.push(set),
            Err(e) => {
                error!(
                    event = "core.resources.list_failed",
                    resource_type = resource_type,
                    error = %e
                );
                outcome.failures.push((resource_type, e));
            }
        }
    }

    outcome
}
