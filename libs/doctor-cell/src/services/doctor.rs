use anyhow::{Context, Result};
use tracing::debug;

use shared_api_client::{api_path, ApiClient};
use shared_config::PortalConfig;

use crate::models::{Doctor, DoctorSearchQuery};

pub struct DoctorService {
    api: ApiClient,
}

impl DoctorService {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            api: ApiClient::new(config),
        }
    }

    /// Search doctors by city, specialty or name
    pub async fn search_doctors(
        &self,
        query: &DoctorSearchQuery,
        auth_token: Option<&str>,
    ) -> Result<Vec<Doctor>> {
        debug!("Searching doctors with filters: {:?}", query);

        let doctors: Vec<Doctor> = self.api
            .get("/api/doctors", &query.to_query(), auth_token)
            .await
            .context("searching doctors")?;

        debug!("Found {} doctors", doctors.len());
        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: &str, auth_token: Option<&str>) -> Result<Doctor> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = api_path(&["api", "doctors", doctor_id])?;
        let doctor: Doctor = self.api
            .get(&path, &[], auth_token)
            .await
            .with_context(|| format!("fetching doctor {}", doctor_id))?;

        Ok(doctor)
    }
}
