use chrono::Utc;
use uuid::Uuid;

/// Client-visible correlation ids: "{PREFIX}_{unix_millis}_{9 alphanumerics}".
/// Orders use the ORDER prefix, payments PAY.
pub fn generate(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &suffix[..9])
}

pub fn order_reference() -> String {
    generate("ORDER")
}

pub fn payment_reference() -> String {
    generate("PAY")
}
