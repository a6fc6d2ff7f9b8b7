use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use super::reminder::Reminder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Amc,
    New,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Active,
    Offline,
}

/// How the service dates of a new customer are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationType {
    #[default]
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub technician_id: String,
    pub full_name: String,
    pub contact_number: String,
    pub address: String,
    pub area: Option<String>,
    pub tds: Option<f64>,
    pub ro_model: Option<String>,
    pub category: Category,
    pub number_of_services: i64,
    pub joining_date: NaiveDate,
    pub remark: Option<String>,
    pub status: CustomerStatus,
    pub reminders: Json<Vec<Reminder>>,
    /// Service ids in service-number order. Loaded from the services table.
    #[sqlx(skip)]
    pub services: Vec<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomerRequest {
    pub full_name: String,
    pub contact_number: String,
    pub address: String,
    pub area: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub tds: Option<f64>,
    pub ro_model: Option<String>,
    pub category: Option<Category>,
    pub number_of_services: Option<i64>,
    pub remark: Option<String>,
    pub status: Option<CustomerStatus>,
    #[serde(default)]
    pub service_generation_type: GenerationType,
    pub service_dates: Option<Vec<NaiveDate>>,
}

/// Profile edits. Schedule-related fields are fixed at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub full_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub area: Option<String>,
    pub tds: Option<f64>,
    pub ro_model: Option<String>,
    pub remark: Option<String>,
    pub status: Option<CustomerStatus>,
}
