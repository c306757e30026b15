use serde::{Deserialize, Serialize};

use crate::identity::UserId;
use crate::validation::{FieldError, Validate, Violations};

/// A delivery address, stored on the user profile and snapshotted into orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Address {
    /// Short name such as "Home".
    pub label: String,
    /// Full multi-line postal text.
    pub full: String,
    /// Contact number for the delivery person.
    pub phone: String,
}

impl Validate for Address {
    fn validate(&self) -> Vec<FieldError> {
        let mut v = Violations::new();
        v.not_blank("label", &self.label);
        v.not_blank("full", &self.full);
        v.not_blank("phone", &self.phone);
        v.into_errors()
    }
}

/// A registered customer. `phone` is unique and doubles as the login key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Registration body for `POST /api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl NewUser {
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            phone: self.phone,
            address: self.address,
        }
    }
}

impl Validate for NewUser {
    fn validate(&self) -> Vec<FieldError> {
        let mut v = Violations::new();
        v.not_blank("name", &self.name);
        v.not_blank("phone", &self.phone);
        if let Some(address) = &self.address {
            v.nested("address", address);
        }
        v.into_errors()
    }
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Option<Address>>,
}

impl UserPatch {
    /// Shallow-merge the provided fields over `user`.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(address) = self.address {
            user.address = address;
        }
    }
}

impl Validate for UserPatch {
    fn validate(&self) -> Vec<FieldError> {
        let mut v = Violations::new();
        v.not_blank_opt("name", self.name.as_deref());
        v.not_blank_opt("phone", self.phone.as_deref());
        if let Some(Some(address)) = &self.address {
            v.nested("address", address);
        }
        v.into_errors()
    }
}
