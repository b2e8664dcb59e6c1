use agora_core::api::{Error as ApiError, SubjectId, Uuid};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    pub fn uuid_already_used(uuid: Uuid) -> Error {
        Error::Api(ApiError::UuidAlreadyUsed(uuid))
    }

    pub fn subject_not_found(id: SubjectId) -> Error {
        Error::Api(ApiError::SubjectNotFound(id))
    }

    pub fn invalid_parameter(reason: String) -> Error {
        Error::Api(ApiError::InvalidParameter(reason))
    }
}

impl From<agora_core::Error> for Error {
    fn from(e: agora_core::Error) -> Error {
        match e {
            agora_core::Error::Anyhow(e) => Error::Anyhow(e),
            agora_core::Error::Api(e) => Error::Api(e),
        }
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let err = match self {
            Error::Anyhow(err) => {
                tracing::error!(?err, "internal server error");
                #[cfg(not(test))]
                let err =
                    ApiError::Unknown(String::from("Internal server error, see logs for details"));
                #[cfg(test)]
                let err = ApiError::Unknown(format!("Internal server error: {err:?}"));
                err
            }
            Error::Api(err) => {
                tracing::info!("returning error to client: {err}");
                err
            }
        };
        (
            err.status_code(),
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            err.contents(),
        )
            .into_response()
    }
}
