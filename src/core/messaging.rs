//! Outbound chat links for booking inquiries.
//!
//! Produces plain text and a `wa.me` link; nothing is sent from here.

use crate::{
    core::report,
    entities::package,
    errors::{Error, Result},
};
use chrono::NaiveDate;

/// Inquiry text a customer sends to the agency about a package.
#[must_use]
pub fn booking_inquiry_message(
    agency_name: &str,
    package: &package::Model,
    travel_start: NaiveDate,
    travel_end: NaiveDate,
    participants: i32,
    currency: &str,
) -> String {
    let traveller_word = if participants == 1 { "traveller" } else { "travellers" };
    format!(
        "Hello {agency_name}, I would like to book \"{name}\" ({days} days, {continent}).\n\
         Dates: {travel_start} to {travel_end}\n\
         Group: {participants} {traveller_word}\n\
         Listed price: {price} per person",
        name = package.name,
        days = package.duration_days,
        continent = package.continent,
        price = report::format_amount(package.base_price, currency),
    )
}

/// Builds a `https://wa.me/<digits>?text=<encoded>` link.
///
/// Everything except digits is stripped from `phone`, so `+62 812-3456` becomes
/// `628123456`.
///
/// # Errors
/// `Error::Validation` when `phone` holds no digits.
pub fn whatsapp_link(phone: &str, text: &str) -> Result<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(Error::Validation {
            message: format!("'{phone}' is not a phone number"),
        });
    }

    Ok(format!(
        "https://wa.me/{digits}?text={}",
        urlencoding::encode(text)
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::sea_orm_active_enums::Continent;

    fn kyoto() -> package::Model {
        package::Model {
            id: 1,
            name: "Kyoto Autumn".to_string(),
            continent: Continent::Asia,
            duration_days: 7,
            base_price: 2_480.0,
            is_active: true,
        }
    }

    #[test]
    fn test_booking_inquiry_message() {
        let text = booking_inquiry_message(
            "Wander Co",
            &kyoto(),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 16).unwrap(),
            2,
            "USD",
        );

        assert!(text.starts_with("Hello Wander Co, I would like to book \"Kyoto Autumn\" (7 days, asia)."));
        assert!(text.contains("Dates: 2024-06-10 to 2024-06-16"));
        assert!(text.contains("Group: 2 travellers"));
        assert!(text.contains("USD 2,480.00 per person"));
    }

    #[test]
    fn test_whatsapp_link_strips_phone_and_encodes_text() {
        let link = whatsapp_link("+62 812-3456", "Hi there & welcome\nDates?").unwrap();
        assert_eq!(
            link,
            "https://wa.me/628123456?text=Hi%20there%20%26%20welcome%0ADates%3F"
        );
    }

    #[test]
    fn test_whatsapp_link_rejects_empty_phone() {
        assert!(matches!(
            whatsapp_link("n/a", "hi"),
            Err(Error::Validation { .. })
        ));
    }
}
