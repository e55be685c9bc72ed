// storefront/src/models/address.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, SqlxType)]
#[sqlx(type_name = "address_type_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
  Shipping,
  Billing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Address {
  pub id: Uuid,
  pub user_id: Uuid,
  pub street_address: String,
  pub apartment_address: String,
  pub country: String,
  pub zip: String,
  pub address_type: AddressType,
  /// At most one default per (user, address_type).
  pub is_default: bool,
  pub created_at: DateTime<Utc>,
}

/// Fields for an address about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
  pub user_id: Uuid,
  pub street_address: String,
  pub apartment_address: String,
  pub country: String,
  pub zip: String,
  pub address_type: AddressType,
}

impl NewAddress {
  /// Same street, apartment, country and zip as `source`, filed under `address_type`.
  pub fn copy_of(source: &Address, address_type: AddressType) -> Self {
    Self {
      user_id: source.user_id,
      street_address: source.street_address.clone(),
      apartment_address: source.apartment_address.clone(),
      country: source.country.clone(),
      zip: source.zip.clone(),
      address_type,
    }
  }
}
