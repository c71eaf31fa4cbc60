use crate::routes::ErrorBody;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::Request;

// Rocket answers a body that fails to deserialize with 422; callers expect 400.
#[catch(422)]
pub fn unprocessable_entity_to_bad_request(_req: &Request) -> (Status, Json<ErrorBody>) {
    (Status::BadRequest, ErrorBody::new("Invalid request body"))
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorBody> {
    ErrorBody::new("Invalid request body")
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<ErrorBody> {
    ErrorBody::new(format!("No route for {} {}", req.method(), req.uri().path()))
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorBody> {
    ErrorBody::new("Internal server error")
}
