use axum::http::StatusCode;
use lazy_static::lazy_static;
use regex::Regex;
use standard_error::{Interpolate, StandardError, Status};

use crate::prelude::Result;

pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_TYPES: [(&str, &str); 3] = [
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
];

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z\s]{2,50}$").expect("invalid name pattern");
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern");
}

/// Raw multipart fields, exactly as submitted.
#[derive(Debug, Default)]
pub struct RawSubmission {
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub contact_country_code: String,
    pub role_interest: String,
}

#[derive(Debug)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Normalized fields plus the canonical type derived for the file.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidSubmission {
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub contact_country_code: String,
    pub role_interest: String,
    pub extension: String,
    pub content_type: String,
}

fn bad_request(code: &str) -> StandardError {
    StandardError::new(code).code(StatusCode::BAD_REQUEST)
}

/// Pure validation, no I/O. Rules short-circuit in order: file presence,
/// file type, file size, required fields, name shape, email shape, phone.
pub fn validate_submission(raw: RawSubmission, file: Option<&FileUpload>) -> Result<ValidSubmission> {
    let file = file.ok_or_else(|| bad_request("ERR-VALIDATE-FILE-MISSING"))?;
    if file.filename.is_empty() || file.size == 0 {
        return Err(bad_request("ERR-VALIDATE-FILE-MISSING"));
    }

    let extension = file
        .filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    let content_type = match ALLOWED_TYPES.iter().find(|(ext, _)| *ext == extension) {
        Some((_, mime)) => mime.to_string(),
        None => return Err(bad_request("ERR-VALIDATE-FILE-TYPE")),
    };
    if let Some(declared) = &file.content_type {
        if ALLOWED_TYPES.iter().all(|(_, mime)| mime != declared) {
            return Err(bad_request("ERR-VALIDATE-FILE-TYPE"));
        }
    }
    if file.size > MAX_FILE_BYTES {
        return Err(bad_request("ERR-VALIDATE-FILE-SIZE"));
    }

    let name = raw.name.trim().to_string();
    let email = raw.email.trim().to_lowercase();
    if name.is_empty() {
        return Err(bad_request("ERR-VALIDATE-REQUIRED").interpolate_err("name".into()));
    }
    if email.is_empty() {
        return Err(bad_request("ERR-VALIDATE-REQUIRED").interpolate_err("email".into()));
    }
    if !NAME_RE.is_match(&name) {
        return Err(bad_request("ERR-VALIDATE-NAME"));
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(bad_request("ERR-VALIDATE-EMAIL"));
    }

    let contact_number: String = raw
        .contact_number
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if !raw.contact_number.trim().is_empty()
        && (contact_number.len() < 7 || contact_number.len() > 15)
    {
        return Err(bad_request("ERR-VALIDATE-PHONE"));
    }

    Ok(ValidSubmission {
        name,
        email,
        contact_number,
        contact_country_code: raw.contact_country_code.trim().to_string(),
        role_interest: raw.role_interest.trim().to_string(),
        extension,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(size: usize) -> FileUpload {
        FileUpload {
            filename: "resume.pdf".into(),
            content_type: Some("application/pdf".into()),
            size,
        }
    }

    fn raw() -> RawSubmission {
        RawSubmission {
            name: "Jane Doe".into(),
            email: "Jane@X.com".into(),
            contact_number: "123-456-7890".into(),
            contact_country_code: "+1".into(),
            role_interest: "Backend Engineer".into(),
        }
    }

    #[test]
    fn accepts_and_normalizes_a_valid_submission() {
        let valid = validate_submission(raw(), Some(&pdf(2 * 1024 * 1024))).unwrap();
        assert_eq!(valid.name, "Jane Doe");
        assert_eq!(valid.email, "jane@x.com");
        assert_eq!(valid.contact_number, "1234567890");
        assert!(valid.contact_number.len() >= 7 && valid.contact_number.len() <= 15);
        assert_eq!(valid.extension, "pdf");
        assert_eq!(valid.content_type, "application/pdf");
    }

    #[test]
    fn missing_file_is_rejected_first() {
        let err = validate_submission(RawSubmission::default(), None).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-FILE-MISSING");
    }

    #[test]
    fn disallowed_extension_is_rejected() {
        let file = FileUpload {
            filename: "resume.exe".into(),
            content_type: None,
            size: 100,
        };
        let err = validate_submission(raw(), Some(&file)).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-FILE-TYPE");
    }

    #[test]
    fn disallowed_declared_media_type_is_rejected() {
        let file = FileUpload {
            filename: "resume.pdf".into(),
            content_type: Some("text/html".into()),
            size: 100,
        };
        let err = validate_submission(raw(), Some(&file)).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-FILE-TYPE");
    }

    #[test]
    fn oversize_file_is_rejected() {
        let err = validate_submission(raw(), Some(&pdf(8 * 1024 * 1024))).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-FILE-SIZE");
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn name_shape_is_enforced() {
        let mut bad = raw();
        bad.name = "J4ne!".into();
        let err = validate_submission(bad, Some(&pdf(100))).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-NAME");

        let mut short = raw();
        short.name = "J".into();
        let err = validate_submission(short, Some(&pdf(100))).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-NAME");
    }

    #[test]
    fn email_shape_is_enforced() {
        let mut bad = raw();
        bad.email = "not-an-email".into();
        let err = validate_submission(bad, Some(&pdf(100))).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-EMAIL");
    }

    #[test]
    fn missing_fields_are_required_in_order() {
        let mut no_name = raw();
        no_name.name = "  ".into();
        let err = validate_submission(no_name, Some(&pdf(100))).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-REQUIRED");
    }

    #[test]
    fn phone_is_optional_but_bounded_when_present() {
        let mut absent = raw();
        absent.contact_number = "".into();
        let valid = validate_submission(absent, Some(&pdf(100))).unwrap();
        assert_eq!(valid.contact_number, "");

        let mut short = raw();
        short.contact_number = "12-34".into();
        let err = validate_submission(short, Some(&pdf(100))).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-PHONE");

        let mut long = raw();
        long.contact_number = "1234567890123456".into();
        let err = validate_submission(long, Some(&pdf(100))).unwrap_err();
        assert_eq!(err.err_code, "ERR-VALIDATE-PHONE");
    }
}
