use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tracing::{debug, instrument, warn};

use shared_api_client::{api_path, ApiClient};
use shared_config::PortalConfig;

use crate::models::{AvailabilityWindow, BookedSlot, DaySchedule};
use crate::services::clock::{Clock, SystemClock};
use crate::services::slots::compute_day_schedule;

pub struct AvailabilityService {
    api: ApiClient,
    clock: Arc<dyn Clock>,
    timezone: FixedOffset,
}

impl AvailabilityService {
    pub fn new(config: &PortalConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &PortalConfig, clock: Arc<dyn Clock>) -> Self {
        let timezone = config.clinic_timezone().unwrap_or_else(|| {
            warn!(
                "Clinic UTC offset of {} minutes is out of range, falling back to UTC",
                config.clinic_utc_offset_minutes
            );
            Utc.fix()
        });

        Self {
            api: ApiClient::new(config),
            clock,
            timezone,
        }
    }

    /// Current instant in the clinic's offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.timezone)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Get a doctor's recurring weekly windows
    pub async fn get_availability_windows(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<AvailabilityWindow>> {
        debug!("Fetching availability windows for doctor: {}", doctor_id);

        let path = api_path(&["api", "doctors", doctor_id, "availability"])?;
        let windows: Vec<AvailabilityWindow> = self.api
            .get(&path, &[], auth_token)
            .await
            .with_context(|| format!("fetching availability for doctor {}", doctor_id))?;

        Ok(windows)
    }

    /// Get slots already reserved on `date`
    pub async fn get_booked_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<BookedSlot>> {
        debug!("Fetching booked slots for doctor {} on {}", doctor_id, date);

        let path = api_path(&["api", "doctors", doctor_id, "booked-slots"])?;
        let booked: Vec<BookedSlot> = self.api
            .get(&path, &[("date", date.format("%Y-%m-%d").to_string())], auth_token)
            .await
            .with_context(|| format!("fetching booked slots for doctor {} on {}", doctor_id, date))?;

        Ok(booked)
    }

    /// Fetch windows and bookings, then derive the bookable slots for `date`
    #[instrument(skip(self, auth_token))]
    pub async fn get_day_schedule(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<DaySchedule> {
        let (windows, booked) = tokio::try_join!(
            self.get_availability_windows(doctor_id, auth_token),
            self.get_booked_slots(doctor_id, date, auth_token),
        )?;

        let schedule = compute_day_schedule(&windows, date, &booked, self.now());
        debug!(
            "Doctor {} has {} slots on {}",
            doctor_id,
            schedule.slots.len(),
            date
        );

        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::services::clock::MockClock;
    use shared_utils::test_utils::{MockBackendResponses, TestConfig};

    #[tokio::test]
    async fn test_day_schedule_uses_clinic_offset() {
        let server = MockServer::start().await;

        // 2030-01-07 is a Monday
        Mock::given(method("GET"))
            .and(path("/api/doctors/doc-1/availability"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                MockBackendResponses::availability_window("Monday", "14:00:00", "16:00:00"),
                MockBackendResponses::availability_window("Tuesday", "09:00:00", "10:00:00"),
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/doctors/doc-1/booked-slots"))
            .and(query_param("date", "2030-01-07"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                MockBackendResponses::booked_slot("15:30:00"),
            ])))
            .mount(&server)
            .await;

        // 12:20 UTC is 14:20 at +02:00
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2030, 1, 7, 12, 20, 0).unwrap());

        let mut config = TestConfig::with_api(&server.uri()).to_app_config();
        config.clinic_utc_offset_minutes = 120;

        let service = AvailabilityService::with_clock(&config, Arc::new(clock));
        let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
        let schedule = service.get_day_schedule("doc-1", date, None).await.unwrap();

        let available: Vec<String> = schedule.available_slots().map(|s| s.time.to_string()).collect();
        assert_eq!(schedule.slots.len(), 4);
        assert_eq!(available, vec!["15:00"]);
        assert_eq!(schedule.utc_offset, "+02:00");
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/doctors/missing/availability"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Doctor not found"})))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/doctors/missing/booked-slots"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let config = TestConfig::with_api(&server.uri()).to_app_config();
        let service = AvailabilityService::new(&config);
        let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();

        let err = service.get_day_schedule("missing", date, None).await.unwrap_err();
        let api_error = err.downcast_ref::<shared_api_client::ApiError>();
        assert!(matches!(api_error, Some(shared_api_client::ApiError::NotFound(_))));
    }
}
