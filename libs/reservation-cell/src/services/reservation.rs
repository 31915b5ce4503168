use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use doctor_cell::AvailabilityService;
use shared_api_client::{api_path, ApiClient};
use shared_config::PortalConfig;

use crate::error::ReservationError;
use crate::models::{PaymentMethod, Reservation, ReservationRequest};

pub struct ReservationService {
    api: ApiClient,
    availability: AvailabilityService,
}

impl ReservationService {
    pub fn new(config: &PortalConfig) -> Self {
        Self::with_availability(config, AvailabilityService::new(config))
    }

    pub fn with_availability(config: &PortalConfig, availability: AvailabilityService) -> Self {
        Self {
            api: ApiClient::new(config),
            availability,
        }
    }

    /// Book the chosen slot and hand the payment reference to the backend.
    ///
    /// The availability pre-check only catches stale screens; the backend
    /// still decides, and its conflict message is passed through untouched.
    #[instrument(skip(self, request, auth_token), fields(doctor_id = %request.doctor_id, date = %request.date, time = %request.time))]
    pub async fn reserve(
        &self,
        request: ReservationRequest,
        auth_token: &str,
    ) -> Result<Reservation, ReservationError> {
        self.validate_request(&request)?;

        let schedule = self.availability
            .get_day_schedule(&request.doctor_id, request.date, Some(auth_token))
            .await
            .map_err(ReservationError::Availability)?;

        if !schedule.is_available(request.time) {
            debug!("Slot {} on {} is not offered or already gone", request.time, request.date);
            return Err(ReservationError::SlotUnavailable(request.time));
        }

        let reservation: Reservation = match self.api
            .post("/api/appointments", Some(auth_token), Some(request.to_backend_payload()))
            .await
        {
            Ok(reservation) => reservation,
            Err(e) => {
                warn!("Backend rejected reservation: {}", e);
                return Err(e.into());
            }
        };

        info!("Reservation {} created ({})", reservation.id, reservation.status);
        Ok(reservation)
    }

    pub async fn list_my_reservations(&self, auth_token: &str) -> Result<Vec<Reservation>, ReservationError> {
        debug!("Fetching reservations for current user");

        let reservations: Vec<Reservation> = self.api
            .get("/api/appointments/mine", &[], Some(auth_token))
            .await?;

        Ok(reservations)
    }

    pub async fn cancel(&self, reservation_id: &str, auth_token: &str) -> Result<Reservation, ReservationError> {
        debug!("Cancelling reservation: {}", reservation_id);

        let path = api_path(&["api", "appointments", reservation_id, "cancel"])?;
        let reservation: Reservation = self.api
            .post(&path, Some(auth_token), None::<Value>)
            .await?;

        Ok(reservation)
    }

    fn validate_request(&self, request: &ReservationRequest) -> Result<(), ReservationError> {
        if request.doctor_id.trim().is_empty() {
            return Err(ReservationError::ValidationError("Doctor is required".to_string()));
        }

        if !request.payment.amount.is_finite() || request.payment.amount < 0.0 {
            return Err(ReservationError::ValidationError("Payment amount must be zero or more".to_string()));
        }

        let has_reference = request.payment.reference
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty());
        if request.payment.method == PaymentMethod::Card && !has_reference {
            return Err(ReservationError::ValidationError(
                "Card payments need a payment reference".to_string(),
            ));
        }

        if request.date < self.availability.today() {
            return Err(ReservationError::ValidationError("Date must be today or later".to_string()));
        }

        Ok(())
    }
}
