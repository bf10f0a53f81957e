use actix_web::{dev::ServiceRequest, web::Data, Error};
use actix_web_httpauth::extractors::{
    bearer::{BearerAuth, Config},
    AuthenticationError,
};
use constant_time_eq::constant_time_eq;
use tracing::error;

pub async fn auth_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let api_key: &str = req.app_data::<Data<String>>().expect("missing api_key");
    let token = credentials.token();

    if !constant_time_eq(api_key.as_bytes(), token.as_bytes()) {
        error!("authentication failed");
        let config = req
            .app_data::<Config>()
            .cloned()
            .unwrap_or_default()
            .scope("v1");

        return Err((AuthenticationError::from(config).into(), req));
    }

    Ok(req)
}
