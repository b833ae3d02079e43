use regex::Regex;

use crate::{
    error::{AppError, FieldError},
    models::{Signee, SignupRequest},
    registration::Registration,
};

pub const MAX_FIELD_LENGTH: usize = 100;

/// Checks every field of the payload, collecting per-field errors, and
/// resolves entity-escaped class/session text back to raw form so it can
/// be compared against stored names, which are never escaped.
pub fn parse_registration(payload: SignupRequest) -> Result<Registration, AppError> {
    let mut errors = Vec::new();

    let class_name = checked_field("className", &payload.class_name, &mut errors);
    let day = checked_field("day", &payload.day, &mut errors);
    let time = checked_field("time", &payload.time, &mut errors);

    let child_first_name = checked_field(
        "signee.childFirstName",
        &payload.signee.child_first_name,
        &mut errors,
    );
    let child_last_name = checked_field(
        "signee.childLastName",
        &payload.signee.child_last_name,
        &mut errors,
    );
    let parent_first_name = checked_field(
        "signee.parentFirstName",
        &payload.signee.parent_first_name,
        &mut errors,
    );
    let parent_last_name = checked_field(
        "signee.parentLastName",
        &payload.signee.parent_last_name,
        &mut errors,
    );

    let parent_phone_number = checked_field(
        "signee.parentPhoneNumber",
        &payload.signee.parent_phone_number,
        &mut errors,
    );
    if !parent_phone_number.is_empty() && !is_valid_phone(&parent_phone_number) {
        errors.push(FieldError::new(
            "signee.parentPhoneNumber",
            "must be a valid phone number",
        ));
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(Registration {
        class_name: decode_entities(&class_name),
        day: decode_entities(&day),
        time: decode_entities(&time),
        signee: Signee {
            child_first_name,
            child_last_name,
            parent_first_name,
            parent_last_name,
            parent_phone_number,
        },
    })
}

fn checked_field(field: &'static str, value: &str, errors: &mut Vec<FieldError>) -> String {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    } else if trimmed.len() > MAX_FIELD_LENGTH {
        errors.push(FieldError::new(field, "is too long"));
    }

    trimmed.to_string()
}

pub fn decode_entities(input: &str) -> String {
    html_escape::decode_html_entities(input).into_owned()
}

pub fn is_valid_phone(input: &str) -> bool {
    let shape = Regex::new(r"^\+?[0-9 ().-]{7,20}$").unwrap();
    if !shape.is_match(input) {
        return false;
    }

    let digits = input.chars().filter(char::is_ascii_digit).count();

    (7..=15).contains(&digits)
}
