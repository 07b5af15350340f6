use crate::db::models::ListingInput;
use crate::error::AppError;

/// Validate client-supplied listing fields before they reach the store.
///
/// Kept separate from the persistence layer so create and update share one
/// set of rules and the store stays schema-agnostic.
pub fn validate_listing(input: &ListingInput) -> Result<(), AppError> {
    let required = [
        ("title", &input.title),
        ("location", &input.location),
        ("roomType", &input.room_type),
        ("description", &input.description),
        ("contactInfo", &input.contact_info),
    ];

    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} is required")));
        }
    }

    if input.rent < 0 {
        return Err(AppError::Validation("rent must be non-negative".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Availability;

    fn valid_input() -> ListingInput {
        ListingInput {
            title: "Room".to_string(),
            location: "Town".to_string(),
            rent: 500,
            room_type: "Single".to_string(),
            lifestyle: vec![],
            description: "desc".to_string(),
            contact_info: "me@example.com".to_string(),
            availability: Availability::Available,
            user_email: String::new(),
            user_name: String::new(),
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(validate_listing(&valid_input()).is_ok());
    }

    #[test]
    fn accepts_zero_rent() {
        let mut input = valid_input();
        input.rent = 0;
        assert!(validate_listing(&input).is_ok());
    }

    #[test]
    fn rejects_negative_rent() {
        let mut input = valid_input();
        input.rent = -1;
        match validate_listing(&input).unwrap_err() {
            AppError::Validation(msg) => assert!(msg.contains("rent")),
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn rejects_blank_required_fields() {
        for field in ["title", "location", "roomType", "description", "contactInfo"] {
            let mut input = valid_input();
            match field {
                "title" => input.title = "  ".to_string(),
                "location" => input.location = String::new(),
                "roomType" => input.room_type = String::new(),
                "description" => input.description = String::new(),
                "contactInfo" => input.contact_info = String::new(),
                _ => unreachable!(),
            }
            match validate_listing(&input).unwrap_err() {
                AppError::Validation(msg) => assert!(msg.contains(field), "{msg}"),
                other => panic!("Expected Validation error, got: {:?}", other),
            }
        }
    }
}
