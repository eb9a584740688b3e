use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

use crate::auth::jwt::verify_token;
use crate::config::Config;

/// The signed-in user, handed explicitly to every handler that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
}

impl Session {
    pub fn owns(&self, owner_id: &str) -> bool {
        self.user_id == owner_id
    }
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by the auth middleware on protected scopes
        if let Some(session) = req.extensions().get::<Session>() {
            return ready(Ok(session.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        match verify_token(token, &config.jwt_secret, config.jwt_audience.as_deref()) {
            Ok(claims) => ready(Ok(Session {
                user_id: claims.sub,
                email: claims.email,
            })),
            Err(_) => ready(Err(ErrorUnauthorized("Invalid token"))),
        }
    }
}
