use serde::{Deserialize, Serialize};

pub mod earnings;
pub mod health;
pub mod rides;
pub mod vehicles;

/// Body of a successful delete.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Deleted {
    ok: bool,
}

impl Deleted {
    pub const OK: Deleted = Deleted { ok: true };
}

#[test]
fn delete_body_reports_ok() {
    let body = serde_json::to_value(Deleted::OK).unwrap();

    assert_eq!(body, serde_json::json!({ "ok": true }));
}
