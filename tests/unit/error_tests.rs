//! Unit tests for `AppError` display formats and conversions.

use oncall_relay::AppError;

#[test]
fn display_formats_carry_category_prefix() {
    assert_eq!(
        AppError::Config("bad port".into()).to_string(),
        "config: bad port"
    );
    assert_eq!(
        AppError::InvalidArgument("start timestamp in the past".into()).to_string(),
        "invalid argument: start timestamp in the past"
    );
    assert_eq!(
        AppError::NotFound("no incident found".into()).to_string(),
        "not found: no incident found"
    );
    assert_eq!(
        AppError::Unavailable("db: closed".into()).to_string(),
        "unavailable: db: closed"
    );
    assert_eq!(
        AppError::Unknown("could not scan".into()).to_string(),
        "unknown: could not scan"
    );
}

#[test]
fn display_has_no_trailing_period() {
    let err = AppError::NotFound("no schedule found".into());
    let s = err.to_string();
    assert!(!s.ends_with('.'), "error message must not end with a period: {s}");
}

#[test]
fn implements_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(AppError::Unknown("test".into()));
    assert!(!err.to_string().is_empty());
}

#[test]
fn sqlx_transport_errors_map_to_unavailable() {
    let err = AppError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, AppError::Unavailable(_)), "got {err}");
}

#[test]
fn sqlx_decode_errors_map_to_unknown() {
    let err = AppError::from(sqlx::Error::ColumnNotFound("acknowledged_at".into()));
    assert!(matches!(err, AppError::Unknown(_)), "got {err}");
}

#[test]
fn toml_errors_map_to_config() {
    let parse_err = toml::from_str::<toml::Value>("not [valid").expect_err("must fail");
    let err = AppError::from(parse_err);
    assert!(matches!(err, AppError::Config(_)), "got {err}");
}
