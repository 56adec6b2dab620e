use crate::error::{AppError, AppResult};
use axum::extract::{FromRequest, Json, Request, rejection::JsonRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `validator` rules before the handler sees
/// the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(length(min = 1, max = 8, message = "Name must be between 1 and 8 characters"))]
        name: String,
        description: Option<String>,
    }

    fn json_request(body: &'static str, content_type: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let request = json_request(r#"{"name": "payments"}"#, "application/json");

        let ValidatedJson(body) = ValidatedJson::<TestBody>::from_request(request, &())
            .await
            .unwrap();

        assert_eq!(body.name, "payments");
        assert!(body.description.is_none());
    }

    #[tokio::test]
    async fn test_validation_error() {
        let request = json_request(r#"{"name": ""}"#, "application/json");

        let error = ValidatedJson::<TestBody>::from_request(request, &())
            .await
            .unwrap_err();

        match error {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "name");
                assert!(reason.contains("between 1 and 8"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let request = json_request(r#"{"name": "#, "application/json");

        let error = ValidatedJson::<TestBody>::from_request(request, &())
            .await
            .unwrap_err();

        assert!(matches!(error, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_missing_field() {
        let request = json_request(r#"{"description": "x"}"#, "application/json");

        let error = ValidatedJson::<TestBody>::from_request(request, &())
            .await
            .unwrap_err();

        assert!(matches!(error, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_wrong_content_type() {
        let request = json_request(r#"{"name": "payments"}"#, "text/plain");

        let error = ValidatedJson::<TestBody>::from_request(request, &())
            .await
            .unwrap_err();

        match error {
            AppError::BadRequest { message } => assert!(message.contains("Content-Type")),
            other => panic!("Expected BadRequest error, got {:?}", other),
        }
    }
}
