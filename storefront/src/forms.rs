// storefront/src/forms.rs

//! Url-encoded request bodies and the payment option they select.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{AddressType, NewAddress};

/// A checkbox is checked when present with any truthy value; absent means unchecked.
fn checkbox<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<String>::deserialize(deserializer)?;
  Ok(matches!(
    raw.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref(),
    Some("on" | "true" | "1" | "yes")
  ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOption {
  Stripe,
  Paypal,
}

impl PaymentOption {
  /// Parses the checkout form value (`S` or `P`).
  pub fn from_code(code: &str) -> Option<Self> {
    match code.trim() {
      "S" => Some(PaymentOption::Stripe),
      "P" => Some(PaymentOption::Paypal),
      _ => None,
    }
  }

  /// Parses the `/payment/{option}/` path segment.
  pub fn from_path(segment: &str) -> Option<Self> {
    match segment {
      "stripe" => Some(PaymentOption::Stripe),
      "paypal" => Some(PaymentOption::Paypal),
      _ => None,
    }
  }

  pub fn path_segment(self) -> &'static str {
    match self {
      PaymentOption::Stripe => "stripe",
      PaymentOption::Paypal => "paypal",
    }
  }
}

/// The four address inputs for one address type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
  pub street_address: String,
  pub apartment_address: String,
  pub country: String,
  pub zip: String,
}

impl AddressFields {
  /// Street, country and zip are required; the apartment line is not.
  pub fn is_complete(&self) -> bool {
    [&self.street_address, &self.country, &self.zip]
      .iter()
      .all(|v| !v.trim().is_empty())
  }

  pub fn into_new_address(self, user_id: Uuid, address_type: AddressType) -> NewAddress {
    NewAddress {
      user_id,
      street_address: self.street_address.trim().to_string(),
      apartment_address: self.apartment_address.trim().to_string(),
      country: self.country.trim().to_string(),
      zip: self.zip.trim().to_string(),
      address_type,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
  #[serde(default)]
  pub shipping_address: String,
  #[serde(default)]
  pub shipping_address2: String,
  #[serde(default)]
  pub shipping_country: String,
  #[serde(default)]
  pub shipping_zip: String,

  #[serde(default)]
  pub billing_address: String,
  #[serde(default)]
  pub billing_address2: String,
  #[serde(default)]
  pub billing_country: String,
  #[serde(default)]
  pub billing_zip: String,

  #[serde(default, deserialize_with = "checkbox")]
  pub same_billing_address: bool,
  #[serde(default, deserialize_with = "checkbox")]
  pub set_default_shipping: bool,
  #[serde(default, deserialize_with = "checkbox")]
  pub use_default_shipping: bool,
  #[serde(default, deserialize_with = "checkbox")]
  pub set_default_billing: bool,
  #[serde(default, deserialize_with = "checkbox")]
  pub use_default_billing: bool,

  #[serde(default)]
  pub payment_option: String,
}

impl CheckoutForm {
  pub fn payment_option(&self) -> Option<PaymentOption> {
    PaymentOption::from_code(&self.payment_option)
  }

  pub fn shipping_fields(&self) -> AddressFields {
    AddressFields {
      street_address: self.shipping_address.clone(),
      apartment_address: self.shipping_address2.clone(),
      country: self.shipping_country.clone(),
      zip: self.shipping_zip.clone(),
    }
  }

  pub fn billing_fields(&self) -> AddressFields {
    AddressFields {
      street_address: self.billing_address.clone(),
      apartment_address: self.billing_address2.clone(),
      country: self.billing_country.clone(),
      zip: self.billing_zip.clone(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponForm {
  #[serde(default)]
  pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundForm {
  pub ref_code: String,
  pub message: String,
  pub email: String,
}

impl RefundForm {
  /// Trims every field and rejects blank ones or an email without `@`.
  pub fn validated(self) -> Result<Self> {
    let form = Self {
      ref_code: self.ref_code.trim().to_string(),
      message: self.message.trim().to_string(),
      email: self.email.trim().to_string(),
    };
    if form.ref_code.is_empty() || form.message.is_empty() {
      return Err(AppError::Validation("Reference code and message are required".to_string()));
    }
    if !form.email.contains('@') {
      return Err(AppError::Validation(format!("Invalid email address '{}'", form.email)));
    }
    Ok(form)
  }
}
