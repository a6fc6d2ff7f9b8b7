use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::auth::Caller;
use crate::db;
use crate::models::{Customer, GenerationType, NewCustomerRequest, NewTechnicianRequest, Technician};
use crate::notify::NoopNotifier;
use crate::services::CustomerService;

pub async fn setup_test_db() -> SqlitePool {
    db::connect_in_memory()
        .await
        .expect("Failed to create test database")
}

pub async fn seed_technician(pool: &SqlitePool, contact_number: &str) -> Technician {
    db::technicians::insert_technician(
        pool,
        NewTechnicianRequest {
            full_name: format!("Tech {}", contact_number),
            contact_number: contact_number.to_string(),
            address: "Workshop Road".to_string(),
            email_address: None,
            company_name: None,
        },
    )
    .await
    .expect("Failed to seed technician")
}

pub fn customer_request(full_name: &str) -> NewCustomerRequest {
    NewCustomerRequest {
        full_name: full_name.to_string(),
        contact_number: "9876543210".to_string(),
        address: "12 Lake View".to_string(),
        area: Some("North".to_string()),
        joining_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        tds: None,
        ro_model: None,
        category: None,
        number_of_services: Some(4),
        remark: None,
        status: None,
        service_generation_type: GenerationType::Automatic,
        service_dates: None,
    }
}

/// Creates a customer with `count` monthly services. Returns the customer and
/// its service ids in service-number order.
pub async fn seed_customer_with_services(
    pool: &SqlitePool,
    technician_id: &str,
    count: u32,
) -> (Customer, Vec<String>) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date");
    let dates = (0..count)
        .map(|i| start + chrono::Months::new(i))
        .collect::<Vec<_>>();

    let mut req = customer_request("Seeded Customer");
    req.service_generation_type = GenerationType::Manual;
    req.number_of_services = None;
    req.service_dates = Some(dates);

    let customers = CustomerService::new(pool.clone(), Arc::new(NoopNotifier));
    let customer = customers
        .create(&Caller::new(technician_id), req)
        .await
        .expect("Failed to seed customer");
    let services = customer.services.clone();
    (customer, services)
}
