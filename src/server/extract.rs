//! Principal extraction. The upstream auth gateway authenticates the caller and
//! forwards the identity in `x-user-id` / `x-user-role`.

use async_trait::async_trait;
use axum::extract::{FromRequest, RequestParts};
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::auth::{Role, User};
use crate::error::Error;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

#[async_trait]
impl<B: Send> FromRequest<B> for User {
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        user_from_headers(req.headers())
    }
}

fn user_from_headers(headers: &HeaderMap) -> Result<User, Error> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .ok_or(Error::Unauthorized)
    };

    let id: Uuid = header(USER_ID_HEADER)?
        .parse()
        .map_err(|_| Error::Unauthorized)?;
    let role: Role = header(USER_ROLE_HEADER)?.parse()?;

    Ok(User::new(id, role))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reads_principal_from_gateway_headers() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&id.to_string()).unwrap(),
        );
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("driver"));

        let user = user_from_headers(&headers).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Driver);
    }

    #[test]
    fn missing_or_malformed_headers_are_unauthorized() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_from_headers(&headers).err(), Some(Error::Unauthorized));

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("driver"));
        assert_eq!(user_from_headers(&headers).err(), Some(Error::Unauthorized));

        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
        );
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("pilot"));
        assert_eq!(user_from_headers(&headers).err(), Some(Error::Unauthorized));
    }
}
