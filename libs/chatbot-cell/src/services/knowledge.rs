use async_trait::async_trait;
use tracing::debug;

use auth_cell::UserDirectoryService;
use catalog_cell::CatalogService;
use shared_config::AppConfig;

use crate::models::ChatbotError;

/// Live data the chatbot can quote back to the user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Names of every service in the catalog, in catalog order.
    async fn service_names(&self) -> Result<Vec<String>, ChatbotError>;

    /// Full names of the users with the professional role.
    async fn professional_names(&self) -> Result<Vec<String>, ChatbotError>;
}

/// Reads the catalog and user directory on every call. No caching.
pub struct LiveKnowledge {
    catalog: CatalogService,
    directory: UserDirectoryService,
}

impl LiveKnowledge {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            catalog: CatalogService::new(config),
            directory: UserDirectoryService::new(config),
        }
    }
}

#[async_trait]
impl KnowledgeSource for LiveKnowledge {
    async fn service_names(&self) -> Result<Vec<String>, ChatbotError> {
        let services = self.catalog
            .list_services()
            .await
            .map_err(|e| ChatbotError::Catalog(e.to_string()))?;

        debug!("Chatbot loaded {} services", services.len());
        Ok(services.into_iter().map(|s| s.name).collect())
    }

    async fn professional_names(&self) -> Result<Vec<String>, ChatbotError> {
        let professionals = self.directory
            .list_professionals()
            .await
            .map_err(|e| ChatbotError::Users(e.to_string()))?;

        Ok(professionals.iter().map(|p| p.full_name()).collect())
    }
}
