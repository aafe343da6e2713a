//! Table definitions, created idempotently at startup.

pub const CONTACT_NAME_MAX: usize = 100;
pub const CONTACT_EMAIL_MAX: usize = 100;

pub const APPOINTMENT_NAME_MAX: usize = 100;
pub const APPOINTMENT_PHONE_MAX: usize = 50;
pub const APPOINTMENT_EMAIL_MAX: usize = 100;
pub const APPOINTMENT_TIME_MAX: usize = 100;

pub const CREATE_CONTACT_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS contact_messages (
    id SERIAL PRIMARY KEY,
    name VARCHAR(100),
    email VARCHAR(100),
    message TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)"#;

pub const CREATE_APPOINTMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS appointments (
    id SERIAL PRIMARY KEY,
    name VARCHAR(100),
    phone VARCHAR(50),
    email VARCHAR(100),
    time VARCHAR(100),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)"#;

/// Statements run by [`crate::store::Store::ensure_schema`], in order.
pub const BOOTSTRAP: [&str; 2] = [CREATE_CONTACT_MESSAGES, CREATE_APPOINTMENTS];
