#[get("/health_check")]
pub fn health() {}

/// Answers CORS preflight requests for every path.
#[options("/<_..>")]
pub fn preflight() -> rocket::http::Status {
    rocket::http::Status::NoContent
}
