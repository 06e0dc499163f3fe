use std::io::Write;

use taco_http::http::response::{Body, InvalidStatusCode, Response, ResponseBuilder, StatusCode};
use taco_http::http::writer::{serialize_response, ResponseWriter};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Created.as_u16(), 201);
    assert_eq!(StatusCode::NoContent.as_u16(), 204);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::Unauthorized.as_u16(), 401);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::NoContent.reason_phrase(), "No Content");
    assert_eq!(StatusCode::Unauthorized.reason_phrase(), "Unauthorized");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_status_code_from_u16_round_trips_known_codes() {
    for code in [200, 204, 301, 400, 401, 403, 404, 429, 500, 503] {
        assert_eq!(StatusCode::from_u16(code).unwrap().as_u16(), code);
    }
}

#[test]
fn test_status_code_rejects_unknown_codes() {
    assert_eq!(StatusCode::from_u16(299), Err(InvalidStatusCode(299)));
    assert_eq!(StatusCode::try_from(1000), Err(InvalidStatusCode(1000)));
    assert!(Response::with_status_code(42).is_err());
    assert_eq!(
        Response::with_status_code(202).unwrap().status,
        StatusCode::Accepted
    );
}

#[test]
fn test_response_builder_basic() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"Hello, World!".to_vec())
        .build();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body.as_bytes(), b"Hello, World!");
}

#[test]
fn test_response_builder_repeated_headers() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Set-Cookie", "a=1")
        .header("Set-Cookie", "b=2")
        .header("X-Custom", "value")
        .build();

    assert_eq!(response.headers.get_all("set-cookie"), ["a=1", "b=2"]);
    assert_eq!(response.headers.get("X-Custom"), Some("value"));
    assert_eq!(response.headers.len(), 2);
}

#[test]
fn test_serialized_content_length_matches_body() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(b"This is the body".to_vec())
        .build();

    let wire = String::from_utf8(serialize_response(&response)).unwrap();
    let (head, body) = wire.split_once("\r\n\r\n").unwrap();

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: text/plain\r\n"));
    assert!(head.ends_with(&format!("Content-Length: {}", body.len())));
    assert_eq!(body, "This is the body");
}

#[test]
fn test_serialized_content_length_overrides_caller_value() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    let wire = String::from_utf8(serialize_response(&response)).unwrap();

    assert!(!wire.contains("999"));
    assert_eq!(wire.matches("Content-Length").count(), 1);
    assert!(wire.contains("Content-Length: 4\r\n"));
}

#[test]
fn test_serialized_empty_body() {
    let response = Response::no_content();
    let wire = String::from_utf8(serialize_response(&response)).unwrap();

    assert_eq!(wire, "HTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\n");
}

#[test]
fn test_response_json_helper() {
    let response = Response::json(StatusCode::Created, &serde_json::json!({ "id": 7 })).unwrap();

    assert_eq!(response.status, StatusCode::Created);
    assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
    assert_eq!(response.body.as_bytes(), br#"{"id":7}"#);
}

#[test]
fn test_response_ok_helper() {
    let response = Response::ok(b"test content".to_vec());

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body.as_bytes(), b"test content");
}

#[test]
fn test_response_error_helpers() {
    assert_eq!(Response::not_found().status, StatusCode::NotFound);
    assert_eq!(Response::not_found().body.as_bytes(), b"404 Not Found");
    assert_eq!(Response::unauthorized().status, StatusCode::Unauthorized);
    assert_eq!(Response::bad_request().status, StatusCode::BadRequest);
    assert_eq!(
        Response::internal_error().body.as_bytes(),
        b"500 Internal Server Error"
    );
}

#[test]
fn test_response_file_guesses_content_type() {
    let response = Response::file("/srv/docs/openapi.json");

    assert!(response.body.is_file());
    assert_eq!(response.headers.get("Content-Type"), Some("application/json"));
    assert_eq!(response.body, Body::File("/srv/docs/openapi.json".into()));
}

#[tokio::test]
async fn test_file_response_streams_file_with_its_length() {
    let path = std::env::temp_dir().join(format!("taco-http-{}.txt", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"streamed from disk").unwrap();
    }

    let response = Response::file(&path);
    let mut writer = ResponseWriter::new(&response).await.unwrap();
    let mut out = Vec::new();
    let sent = writer.write_to_stream(&mut out).await.unwrap();
    std::fs::remove_file(&path).unwrap();

    let wire = String::from_utf8(out).unwrap();
    assert_eq!(sent, 18);
    assert!(wire.contains("Content-Type: text/plain; charset=utf-8\r\n"));
    assert!(wire.contains("Content-Length: 18\r\n"));
    assert!(wire.ends_with("\r\n\r\nstreamed from disk"));
}

#[tokio::test]
async fn test_missing_file_fails_before_writing() {
    let response = Response::file("/definitely/not/here.bin");

    assert!(ResponseWriter::new(&response).await.is_err());
}
