//! Phone-number login and registration. There is no credential check: a
//! phone number that exists is a login.

use ruralcart_common::user::{Address, NewUser, User};

use crate::api::{ApiClient, ClientError};
use crate::persist::ClientStore;

/// Look the user up by phone and make them the session user.
///
/// A [`ClientError::NotFound`] means the phone is not registered yet.
pub async fn login(api: &ApiClient, store: &mut ClientStore, phone: &str) -> Result<User, ClientError> {
    let user = api.user_by_phone(phone.trim()).await?;
    tracing::debug!(user = %user.id, "logged in");
    store.set_user(user.clone());
    Ok(user)
}

/// Register a new user and make them the session user.
pub async fn register(
    api: &ApiClient,
    store: &mut ClientStore,
    name: &str,
    phone: &str,
    address: Option<Address>,
) -> Result<User, ClientError> {
    let new = NewUser {
        name: name.trim().to_string(),
        phone: phone.trim().to_string(),
        address,
    };
    let user = api.create_user(&new).await?;
    store.set_user(user.clone());
    Ok(user)
}

/// Drop the session user, cart and current order.
pub fn logout(store: &mut ClientStore) {
    store.clear();
}
