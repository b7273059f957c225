//! On-page structure of the booking portal.
//!
//! Everything that depends on the portal's concrete markup is collected
//! here: the login and register controls, the federated-identity form
//! fields, and the listing's per-day grouping. The listing groups
//! lessons under German day headings.

use chrono::Weekday;

use crate::driver::Locator;
use crate::schedule::LessonSpec;

/// WebDriver keyboard codepoint for RETURN; commits the organisation
/// picker's dropdown selection.
pub const RETURN_KEY: &str = "\u{e006}";

pub fn login_button() -> Locator {
    Locator::xpath("//button[@class='btn btn-default' and @title='Login']")
}

pub fn federated_login_button() -> Locator {
    Locator::xpath("//button[@class='btn btn-warning btn-block' and @title='SwitchAai Account Login']")
}

pub fn organisation_field() -> Locator {
    Locator::xpath("//input[@id='userIdPSelection_iddtext']")
}

pub fn username_field() -> Locator {
    Locator::xpath("//input[@id='username']")
}

pub fn password_field() -> Locator {
    Locator::xpath("//input[@id='password']")
}

pub fn submit_button() -> Locator {
    Locator::xpath("//button[@type='submit']")
}

pub fn register_button() -> Locator {
    Locator::xpath("//button[@id='btnRegister']")
}

pub fn load_more_button() -> Locator {
    Locator::xpath("//button[@class='btn btn--primary separator__btn']")
}

/// On-page label of a weekday in the listing.
pub fn day_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Montag",
        Weekday::Tue => "Dienstag",
        Weekday::Wed => "Mittwoch",
        Weekday::Thu => "Donnerstag",
        Weekday::Fri => "Freitag",
        Weekday::Sat => "Samstag",
        Weekday::Sun => "Sonntag",
    }
}

/// The listing section grouping all lessons of one weekday.
pub fn day_group(weekday: Weekday) -> Locator {
    Locator::xpath(format!(
        "//div[@class='teaser-list-calendar__day'][contains(., '{}')]",
        day_label(weekday)
    ))
}

/// A lesson entry inside a day group, matched on facility, start time
/// and, when configured, a description substring.
pub fn lesson_item(spec: &LessonSpec) -> Locator {
    let mut query = format!(
        ".//li[@class='btn-hover-parent'][contains(., '{}')][contains(., '{}')]",
        spec.facility,
        spec.start_time.format("%H:%M"),
    );
    if let Some(description) = &spec.description {
        query.push_str(&format!("[contains(., '{description}')]"));
    }
    Locator::xpath(query)
}
