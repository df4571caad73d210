use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::entities::RideStatus;
use crate::store::StoreError;

/// Coarse classification of every failure the engine can surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input, rejected before any write.
    Validation,
    /// Entity missing or not owned by the caller.
    NotFound,
    /// Business-rule refusal; the caller may retry after the state changes.
    Conflict,
    /// Storage-level write contention; retried automatically by the engine.
    RaceConflict,
    /// Role precondition failed.
    Unauthorized,
    /// Persistence layer unreachable; always retryable.
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Vehicle,
    Ride,
}

impl Entity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Ride => "ride",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("invalid seat capacity {seat_capacity} for vehicle class {class:?}")]
    InvalidCapacity { class: String, seat_capacity: i64 },

    #[error("invalid total seats")]
    InvalidSeats,

    #[error("departure time must be in the future")]
    PastDeparture,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{} not found", .0.name())]
    NotFound(Entity),

    #[error("plate number already registered")]
    DuplicatePlate,

    #[error("vehicle has an active ride and cannot be edited")]
    ActiveRideBlocksEdit,

    #[error("vehicle has an active ride and cannot be deleted")]
    ActiveRideBlocksDelete,

    #[error("ride can only be edited while pending and before departure")]
    EditNotAllowed,

    #[error("total seats cannot be lower than booked seats")]
    SeatsBelowBooked,

    #[error("invalid transition: {} -> {}", .from.name(), .to.name())]
    InvalidTransition { from: RideStatus, to: RideStatus },

    #[error("ride has booked seats")]
    HasBookedSeats,

    #[error("ride is not pending")]
    NotPending,

    #[error("no seats left")]
    SoldOut,

    #[error("concurrent write detected")]
    RaceConflict,

    #[error("conflicting concurrent updates, try again")]
    Conflict,

    #[error("unauthorized")]
    Unauthorized,

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCapacity { .. }
            | Self::InvalidSeats
            | Self::PastDeparture
            | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DuplicatePlate
            | Self::ActiveRideBlocksEdit
            | Self::ActiveRideBlocksDelete
            | Self::EditNotAllowed
            | Self::SeatsBelowBooked
            | Self::InvalidTransition { .. }
            | Self::HasBookedSeats
            | Self::NotPending
            | Self::SoldOut
            | Self::Conflict => ErrorKind::Conflict,
            Self::RaceConflict => ErrorKind::RaceConflict,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// Stable numeric code. 1..=99 are internal, everything else is caused by the caller.
    pub fn code(&self) -> i32 {
        match self {
            Self::Unavailable(_) => 2,
            Self::RaceConflict => 6,
            Self::InvalidInput(_) => 101,
            Self::InvalidCapacity { .. } => 102,
            Self::InvalidSeats => 103,
            Self::PastDeparture => 104,
            Self::NotFound(_) => 110,
            Self::Unauthorized => 111,
            Self::DuplicatePlate => 120,
            Self::ActiveRideBlocksEdit => 121,
            Self::ActiveRideBlocksDelete => 122,
            Self::EditNotAllowed => 123,
            Self::SeatsBelowBooked => 124,
            Self::InvalidTransition { .. } => 125,
            Self::HasBookedSeats => 126,
            Self::NotPending => 127,
            Self::SoldOut => 128,
            Self::Conflict => 129,
        }
    }

    pub fn is_race_conflict(&self) -> bool {
        self.kind() == ErrorKind::RaceConflict
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VehicleNotFound => Self::NotFound(Entity::Vehicle),
            StoreError::RideNotFound => Self::NotFound(Entity::Ride),
            StoreError::RaceConflict => Self::RaceConflict,
            StoreError::DuplicatePlate => Self::DuplicatePlate,
            StoreError::Unavailable(message) => Self::Unavailable(message),
        }
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        Self::Unavailable(format!("authorization policy: {}", err))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict | ErrorKind::RaceConflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };

        let error_message = match self.code() {
            1..=99 => "Internal Server Error".to_string(),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "code": self.code(),
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[test]
fn error_kinds_follow_taxonomy() {
    assert_eq!(Error::InvalidSeats.kind(), ErrorKind::Validation);
    assert_eq!(Error::NotFound(Entity::Ride).kind(), ErrorKind::NotFound);
    assert_eq!(Error::SoldOut.kind(), ErrorKind::Conflict);
    assert_eq!(Error::RaceConflict.kind(), ErrorKind::RaceConflict);
    assert_eq!(
        Error::Unavailable("down".into()).kind(),
        ErrorKind::Unavailable
    );
    assert!(Error::RaceConflict.is_race_conflict());
    assert!(!Error::Conflict.is_race_conflict());
}

#[test]
fn store_errors_map_to_engine_errors() {
    assert_eq!(
        Error::from(StoreError::VehicleNotFound),
        Error::NotFound(Entity::Vehicle)
    );
    assert_eq!(
        Error::from(StoreError::RideNotFound),
        Error::NotFound(Entity::Ride)
    );
    assert_eq!(Error::from(StoreError::RaceConflict), Error::RaceConflict);
    assert_eq!(Error::from(StoreError::DuplicatePlate), Error::DuplicatePlate);
}

#[test]
fn internal_errors_hide_their_message() {
    let response = Error::Unavailable("connection refused".into()).into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = Error::SoldOut.into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = Error::NotFound(Entity::Vehicle).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
