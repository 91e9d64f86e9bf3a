pub type Result<T> = std::result::Result<T, Error>;

/// Centralized error for the service layer.
///
/// `NotInDB` maps to a caller-side not-found, `BadArgument`,
/// `AlreadyExist` and `RegistrationClosed` to a validation rejection
/// with no partial writes, `DBErr` to an internal storage failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("`{0}` not found in database")]
    NotInDB(&'static str),
    #[error("payload.`{0}` is not a vaild argument")]
    BadArgument(&'static str),
    #[error("`{0}` already exist")]
    AlreadyExist(&'static str),
    #[error("contest is not accepting registrations")]
    RegistrationClosed,
    #[error("seaorm error: `{0}`")]
    DBErr(sea_orm::DbErr),
}

impl From<sea_orm::DbErr> for Error {
    fn from(value: sea_orm::DbErr) -> Self {
        match value {
            sea_orm::DbErr::RecordNotFound(_) => Error::NotInDB("record"),
            _ => Error::DBErr(value),
        }
    }
}
