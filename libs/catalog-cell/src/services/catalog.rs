use anyhow::Result;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::backend::{path_segment, BackendClient};

use crate::models::{CatalogError, CreateServiceRequest, Service, ServiceType};

pub struct CatalogService {
    backend: BackendClient,
    base_url: String,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(),
            base_url: config.api_service_url.clone(),
        }
    }

    pub async fn list_services(&self) -> Result<Vec<Service>> {
        debug!("Fetching service catalog");

        let services: Vec<Service> = self.backend
            .request_list(&self.base_url, None)
            .await?;

        Ok(services)
    }

    pub async fn list_by_type(&self, service_type: ServiceType) -> Result<Vec<Service>> {
        let services = self.list_services().await?;

        Ok(services
            .into_iter()
            .filter(|s| s.service_type == service_type)
            .collect())
    }

    pub async fn get_service(&self, service_id: &str) -> Result<Service> {
        let services = self.list_services().await?;

        services
            .into_iter()
            .find(|s| s.id.as_deref() == Some(service_id))
            .ok_or_else(|| CatalogError::NotFound.into())
    }

    pub async fn create_service(
        &self,
        request: CreateServiceRequest,
        auth_token: Option<&str>,
    ) -> Result<Service> {
        if request.name.trim().is_empty()
            || request.description.trim().is_empty()
            || request.image.trim().is_empty()
        {
            return Err(CatalogError::MissingFields.into());
        }
        if !request.price.is_finite() || request.price <= 0.0 {
            return Err(CatalogError::InvalidPrice(request.price).into());
        }
        if let ServiceType::Other(label) = &request.service_type {
            return Err(CatalogError::InvalidType(label.clone()).into());
        }

        debug!("Creating {} service: {}", request.service_type, request.name);

        let body = json!({
            "nombre": request.name.trim(),
            "descripcion": request.description.trim(),
            "Image": request.image.trim(),
            "precio": request.price,
            "tipo": request.service_type,
        });

        let service: Service = self.backend
            .request(Method::POST, &self.base_url, auth_token, Some(body))
            .await?;

        info!("Service created: {}", service.name);
        Ok(service)
    }

    pub async fn delete_service(&self, service_id: &str, auth_token: Option<&str>) -> Result<()> {
        let url = format!("{}/delete/{}", self.base_url, path_segment(service_id));

        self.backend.send(Method::DELETE, &url, auth_token, None).await?;

        info!("Service {} deleted", service_id);
        Ok(())
    }
}
