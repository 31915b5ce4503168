use std::path::PathBuf;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::PortalConfig;
use shared_models::auth::{Session, User};

pub struct TestConfig {
    pub api_base_url: String,
    pub clinic_utc_offset_minutes: i32,
    pub state_dir: Option<PathBuf>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            clinic_utc_offset_minutes: 0,
            state_dir: None,
        }
    }
}

impl TestConfig {
    pub fn with_api(url: &str) -> Self {
        Self {
            api_base_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> PortalConfig {
        PortalConfig {
            api_base_url: self.api_base_url.clone(),
            request_timeout_secs: 5,
            max_retries: 0,
            clinic_utc_offset_minutes: self.clinic_utc_offset_minutes,
            state_dir: self.state_dir.clone(),
            ..PortalConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<PortalConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            name: Some("Test User".to_string()),
        }
    }

    pub fn to_session(&self, access_token: &str) -> Session {
        Session {
            user: self.to_user(),
            access_token: access_token.to_string(),
            refresh_token: Some(format!("refresh-{}", self.id)),
            issued_at: Utc::now(),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "name": "Test User",
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn login_response(user: &TestUser, access_token: &str) -> serde_json::Value {
        json!({
            "user": {
                "id": user.id,
                "email": user.email,
                "role": user.role,
                "name": "Test User"
            },
            "access_token": access_token,
            "refresh_token": format!("refresh-{}", user.id)
        })
    }

    pub fn doctor_response(doctor_id: &str, city: &str, specialty: &str) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "full_name": "Dr. Test",
            "specialty": specialty,
            "city": city,
            "address": "1 Main Street",
            "consultation_fee": 50.0,
            "rating": 4.5
        })
    }

    pub fn availability_window(day: &str, start: &str, end: &str) -> serde_json::Value {
        json!({
            "day_of_week": day,
            "start_time": start,
            "end_time": end
        })
    }

    pub fn booked_slot(time: &str) -> serde_json::Value {
        json!({
            "time": time,
            "status": "confirmed"
        })
    }

    pub fn appointment_response(patient_id: &str, doctor_id: &str, date: &str, time: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "date": date,
            "time": time,
            "status": "pending",
            "payment_status": "authorized"
        })
    }

    pub fn notification(id: &str, title: &str, read: bool) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "message": format!("{} details", title),
            "read_at": if read { json!("2024-01-01T00:00:00Z") } else { json!(null) },
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({
            "message": message
        })
    }
}
