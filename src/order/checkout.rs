//! Checkout wizard: `pincode -> kyc -> details -> success`.
//!
//! The storefront drives these steps one screen at a time; order creation
//! re-runs the same guards before anything is persisted.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::utils::{
    AppError,
    validate::{is_ten_digit_phone, is_valid_email, is_valid_pincode},
};

/// IST is UTC+05:30 all year.
const IST_OFFSET_MINUTES: i64 = 330;
const INSTANT_OPENS_AT: u32 = 8;
const INSTANT_CLOSES_AT: u32 = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Pincode,
    Kyc,
    Details,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverySpeed {
    Instant,
    Normal,
}

impl DeliverySpeed {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliverySpeed::Instant => "instant",
            DeliverySpeed::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fulfillment {
    Delivery { speed: DeliverySpeed },
    Pickup { location: String },
}

impl Fulfillment {
    pub fn mode(&self) -> &'static str {
        match self {
            Fulfillment::Delivery { .. } => "delivery",
            Fulfillment::Pickup { .. } => "pickup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    RcFront,
    RcBack,
    AadharFront,
    AadharBack,
    Pan,
}

impl DocType {
    pub const ALL: [DocType; 5] = [
        DocType::RcFront,
        DocType::RcBack,
        DocType::AadharFront,
        DocType::AadharBack,
        DocType::Pan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocType::RcFront => "rc_front",
            DocType::RcBack => "rc_back",
            DocType::AadharFront => "aadhar_front",
            DocType::AadharBack => "aadhar_back",
            DocType::Pan => "pan",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocType::ALL
            .into_iter()
            .find(|d| d.as_str() == s.trim())
            .ok_or_else(|| CheckoutError::UnknownDocType(s.to_owned()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("Enter a valid 6-digit pincode")]
    InvalidPincode,
    #[error("Instant delivery is available only between 8 AM and 11 PM")]
    InstantUnavailable,
    #[error("Select a pickup location")]
    MissingPickupLocation,
    #[error("RC front image is required")]
    MissingRcFront,
    #[error("Unknown document type {0}")]
    UnknownDocType(String),
    #[error("Name is required")]
    MissingName,
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Enter a valid 10-digit phone number")]
    InvalidPhone,
    #[error("Address, city and state are required for delivery")]
    MissingAddress,
    #[error("Action not allowed at the {0:?} step")]
    WrongStep(Step),
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Instant delivery runs 08:00 to 23:00 Indian Standard Time.
pub fn instant_available(now: DateTime<Utc>) -> bool {
    let hour = (now + TimeDelta::minutes(IST_OFFSET_MINUTES)).hour();
    (INSTANT_OPENS_AT..INSTANT_CLOSES_AT).contains(&hour)
}

pub fn check_fulfillment(
    pincode: &str,
    fulfillment: &Fulfillment,
    now: DateTime<Utc>,
) -> Result<(), CheckoutError> {
    if !is_valid_pincode(pincode.trim()) {
        return Err(CheckoutError::InvalidPincode);
    }

    match fulfillment {
        Fulfillment::Delivery {
            speed: DeliverySpeed::Instant,
        } if !instant_available(now) => Err(CheckoutError::InstantUnavailable),
        Fulfillment::Delivery { .. } => Ok(()),
        Fulfillment::Pickup { location } if location.trim().is_empty() => {
            Err(CheckoutError::MissingPickupLocation)
        }
        Fulfillment::Pickup { .. } => Ok(()),
    }
}

pub fn check_documents(documents: &BTreeMap<DocType, String>) -> Result<(), CheckoutError> {
    match documents.get(&DocType::RcFront) {
        Some(url) if !url.trim().is_empty() => Ok(()),
        _ => Err(CheckoutError::MissingRcFront),
    }
}

pub fn check_details(
    details: &CustomerDetails,
    fulfillment: &Fulfillment,
) -> Result<(), CheckoutError> {
    if details.name.trim().is_empty() {
        return Err(CheckoutError::MissingName);
    }
    if !is_valid_email(&details.email) {
        return Err(CheckoutError::InvalidEmail);
    }
    if !is_ten_digit_phone(&details.phone) {
        return Err(CheckoutError::InvalidPhone);
    }

    if let Fulfillment::Delivery { .. } = fulfillment {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !(filled(&details.address) && filled(&details.city) && filled(&details.state)) {
            return Err(CheckoutError::MissingAddress);
        }
    }

    Ok(())
}

/// External order reference, e.g. `ORD-20250114-3f9a1c2b`.
pub fn generate_order_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "ORD-{:04}{:02}{:02}-{}",
        now.year(),
        now.month(),
        now.day(),
        &suffix[..8]
    )
}

/// The storefront's checkout wizard (pincode, KYC, details, success) as a
/// state machine. The browser drives the real flow; this type pins down its
/// step order and uses the same guards `create_order` re-runs on the final
/// submission, so the two cannot drift apart.
#[derive(Debug, Clone)]
pub struct Checkout {
    step: Step,
    pincode: Option<String>,
    fulfillment: Option<Fulfillment>,
    documents: BTreeMap<DocType, String>,
    order_id: Option<String>,
    details: Option<CustomerDetails>,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkout {
    pub fn new() -> Self {
        Self {
            step: Step::Pincode,
            pincode: None,
            fulfillment: None,
            documents: BTreeMap::new(),
            order_id: None,
            details: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn pincode(&self) -> Option<&str> {
        self.pincode.as_deref()
    }

    pub fn documents(&self) -> &BTreeMap<DocType, String> {
        &self.documents
    }

    pub fn fulfillment(&self) -> Option<&Fulfillment> {
        self.fulfillment.as_ref()
    }

    pub fn details(&self) -> Option<&CustomerDetails> {
        self.details.as_ref()
    }

    fn expect_step(&self, step: Step) -> Result<(), CheckoutError> {
        if self.step == step {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep(self.step))
        }
    }

    /// `pincode -> kyc`. On failure the wizard stays on the pincode step.
    pub fn submit_pincode(
        &mut self,
        pincode: &str,
        fulfillment: Fulfillment,
        now: DateTime<Utc>,
    ) -> Result<Step, CheckoutError> {
        self.expect_step(Step::Pincode)?;
        check_fulfillment(pincode, &fulfillment, now)?;

        self.pincode = Some(pincode.trim().to_owned());
        self.fulfillment = Some(fulfillment);
        self.step = Step::Kyc;
        Ok(self.step)
    }

    /// `kyc -> pincode`, the only backward move.
    pub fn back(&mut self) -> Result<Step, CheckoutError> {
        self.expect_step(Step::Kyc)?;
        self.step = Step::Pincode;
        Ok(self.step)
    }

    /// Order reference used to group uploads, created on first use.
    pub fn order_id(&mut self, now: DateTime<Utc>) -> &str {
        self.order_id
            .get_or_insert_with(|| generate_order_id(now))
            .as_str()
    }

    pub fn attach_document(&mut self, doc_type: &str, url: String) -> Result<DocType, CheckoutError> {
        self.expect_step(Step::Kyc)?;
        let doc_type = doc_type.parse::<DocType>()?;
        self.documents.insert(doc_type, url);
        Ok(doc_type)
    }

    /// `kyc -> details`, gated on the RC front upload.
    pub fn submit_documents(&mut self) -> Result<Step, CheckoutError> {
        self.expect_step(Step::Kyc)?;
        check_documents(&self.documents)?;
        self.step = Step::Details;
        Ok(self.step)
    }

    /// `details -> success`.
    pub fn confirm(&mut self, details: CustomerDetails) -> Result<Step, CheckoutError> {
        self.expect_step(Step::Details)?;
        let fulfillment = self
            .fulfillment
            .as_ref()
            .ok_or(CheckoutError::WrongStep(Step::Pincode))?;
        check_details(&details, fulfillment)?;

        self.details = Some(details);
        self.step = Step::Success;
        Ok(self.step)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    /// 12:00 IST.
    fn noon_ist() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 14, 6, 30, 0).unwrap()
    }

    fn delivery() -> Fulfillment {
        Fulfillment::Delivery {
            speed: DeliverySpeed::Normal,
        }
    }

    fn details() -> CustomerDetails {
        CustomerDetails {
            name: "Asha".to_owned(),
            email: "asha@example.in".to_owned(),
            phone: "9876543210".to_owned(),
            address: Some("12 Avinashi Road".to_owned()),
            city: Some("Coimbatore".to_owned()),
            state: Some("Tamil Nadu".to_owned()),
        }
    }

    #[test]
    fn instant_window_is_evaluated_in_ist() {
        // 02:29 UTC is 07:59 IST, 02:30 UTC is 08:00 IST
        assert!(!instant_available(Utc.with_ymd_and_hms(2025, 1, 14, 2, 29, 0).unwrap()));
        assert!(instant_available(Utc.with_ymd_and_hms(2025, 1, 14, 2, 30, 0).unwrap()));
        // 17:29 UTC is 22:59 IST, 17:30 UTC is 23:00 IST
        assert!(instant_available(Utc.with_ymd_and_hms(2025, 1, 14, 17, 29, 0).unwrap()));
        assert!(!instant_available(Utc.with_ymd_and_hms(2025, 1, 14, 17, 30, 0).unwrap()));
    }

    #[test]
    fn invalid_pincode_keeps_wizard_on_first_step() {
        let mut checkout = Checkout::new();
        assert_eq!(
            checkout.submit_pincode("04102", delivery(), noon_ist()),
            Err(CheckoutError::InvalidPincode)
        );
        assert_eq!(checkout.step(), Step::Pincode);
    }

    #[test]
    fn pickup_needs_a_location() {
        let mut checkout = Checkout::new();
        let pickup = Fulfillment::Pickup {
            location: "  ".to_owned(),
        };
        assert_eq!(
            checkout.submit_pincode("641028", pickup, noon_ist()),
            Err(CheckoutError::MissingPickupLocation)
        );
        assert_eq!(checkout.step(), Step::Pincode);
    }

    #[test]
    fn instant_delivery_outside_window_is_rejected() {
        let mut checkout = Checkout::new();
        let late = Utc.with_ymd_and_hms(2025, 1, 14, 19, 0, 0).unwrap();
        let instant = Fulfillment::Delivery {
            speed: DeliverySpeed::Instant,
        };
        assert_eq!(
            checkout.submit_pincode("641028", instant, late),
            Err(CheckoutError::InstantUnavailable)
        );
    }

    #[test]
    fn details_unreachable_without_rc_front() {
        let mut checkout = Checkout::new();
        checkout
            .submit_pincode("641028", delivery(), noon_ist())
            .unwrap();

        checkout
            .attach_document("pan", "https://cdn/pan.jpg".to_owned())
            .unwrap();
        assert_eq!(checkout.submit_documents(), Err(CheckoutError::MissingRcFront));
        assert_eq!(
            checkout.confirm(details()),
            Err(CheckoutError::WrongStep(Step::Kyc))
        );
        assert_eq!(checkout.step(), Step::Kyc);
    }

    #[test]
    fn unknown_document_types_are_rejected() {
        let mut checkout = Checkout::new();
        checkout
            .submit_pincode("641028", delivery(), noon_ist())
            .unwrap();
        assert_eq!(
            checkout.attach_document("passport", "u".to_owned()),
            Err(CheckoutError::UnknownDocType("passport".to_owned()))
        );
    }

    #[test]
    fn happy_path_reaches_success() {
        let mut checkout = Checkout::new();
        assert_eq!(
            checkout.submit_pincode("641028", delivery(), noon_ist()),
            Ok(Step::Kyc)
        );
        let order_id = checkout.order_id(noon_ist()).to_owned();
        assert!(order_id.starts_with("ORD-20250114-"));
        assert_eq!(checkout.order_id(noon_ist()), order_id);

        checkout
            .attach_document("rc_front", "https://cdn/rc.jpg".to_owned())
            .unwrap();
        assert_eq!(checkout.submit_documents(), Ok(Step::Details));

        let mut missing_city = details();
        missing_city.city = None;
        assert_eq!(
            checkout.confirm(missing_city),
            Err(CheckoutError::MissingAddress)
        );

        assert_eq!(checkout.confirm(details()), Ok(Step::Success));
        assert_eq!(checkout.details().map(|d| d.name.as_str()), Some("Asha"));
    }

    #[test]
    fn pickup_orders_skip_address_but_check_contact() {
        let pickup = Fulfillment::Pickup {
            location: "Gandhipuram".to_owned(),
        };
        let contact_only = CustomerDetails {
            address: None,
            city: None,
            state: None,
            ..details()
        };
        assert_eq!(check_details(&contact_only, &pickup), Ok(()));

        let bad_phone = CustomerDetails {
            phone: "98765".to_owned(),
            ..contact_only.clone()
        };
        assert_eq!(check_details(&bad_phone, &pickup), Err(CheckoutError::InvalidPhone));

        let bad_email = CustomerDetails {
            email: "asha".to_owned(),
            ..contact_only
        };
        assert_eq!(check_details(&bad_email, &pickup), Err(CheckoutError::InvalidEmail));
    }

    #[test]
    fn back_only_from_kyc() {
        let mut checkout = Checkout::new();
        assert_eq!(checkout.back(), Err(CheckoutError::WrongStep(Step::Pincode)));
        checkout
            .submit_pincode("641028", delivery(), noon_ist())
            .unwrap();
        assert_eq!(checkout.pincode(), Some("641028"));
        assert_eq!(checkout.back(), Ok(Step::Pincode));
    }
}
