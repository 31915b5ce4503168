use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use doctor_cell::TimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    Insurance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    /// Gateway reference (payment intent, claim number...). Required for cards.
    pub reference: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub reason: Option<String>,
    pub payment: PaymentDetails,
}

impl ReservationRequest {
    /// Body expected by the appointments endpoint.
    pub fn to_backend_payload(&self) -> Value {
        json!({
            "doctor_id": self.doctor_id,
            "date": self.date.format("%Y-%m-%d").to_string(),
            "time": self.time.as_hms(),
            "reason": self.reason,
            "payment": {
                "method": self.payment.method,
                "reference": self.payment.reference,
                "amount": self.payment.amount
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
            ReservationStatus::Completed => write!(f, "completed"),
            ReservationStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub doctor_id: String,
    pub patient_id: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub status: ReservationStatus,
    pub payment_status: Option<String>,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        matches!(self.status, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }
}
