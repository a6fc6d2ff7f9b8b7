pub mod bill;
pub mod complaint;
pub mod customer;
pub mod reminder;
pub mod service;
pub mod task;
pub mod technician;

pub use bill::{Bill, BillItem, BillStatus, NewBillRequest, PaymentMethod, UpdateBillRequest};
pub use complaint::{Complaint, ComplaintStatus, NewComplaintRequest};
pub use customer::{
    Category, Customer, CustomerStatus, GenerationType, NewCustomerRequest, UpdateCustomerRequest,
};
pub use reminder::{NewReminderRequest, Reminder, ReminderEntity, ReminderKind};
pub use service::{PartUsed, Service, ServiceStatus};
pub use task::{
    CreateBatchTaskRequest, ShareTaskRequest, Task, TaskServicesRequest, TaskStatus, UpdateTaskRequest,
};
pub use technician::{LoginRequest, LoginResponse, NewTechnicianRequest, Pagination, Technician, TechnicianPage};
