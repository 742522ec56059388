//! Typed wrappers for well-known Wallet API resources.
//!
//! Each model is a deref-newtype over [`ApiObject`]: the generic coercing
//! accessors stay available, and the model adds the operations that make
//! sense for its resource type.

use crate::error::CoinbaseError;
use crate::wallet::rest::object::ApiObject;
use crate::wallet::rest::traits::{ApiClient, Params};

macro_rules! model {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(ApiObject);

        impl From<ApiObject> for $name {
            fn from(object: ApiObject) -> Self {
                Self(object)
            }
        }

        impl From<$name> for ApiObject {
            fn from(model: $name) -> ApiObject {
                model.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = ApiObject;
            fn deref(&self) -> &ApiObject {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut ApiObject {
                &mut self.0
            }
        }
    };
}

model! {
    /// A user's wallet, vault or fiat account.
    Account
}

model! {
    /// Any movement of funds on an account's ledger.
    Transaction
}

model! {
    /// A pending request for money sent to another user.
    MoneyRequest
}

model! {
    /// A buy, sell, deposit or withdrawal in progress.
    Transfer
}

model! {
    /// A merchant order.
    Order
}

model! {
    /// A merchant checkout (reusable payment page).
    Checkout
}

model! {
    /// Another user's public profile.
    User
}

model! {
    /// The authenticated user's own profile.
    CurrentUser
}

impl Account {
    /// Update this account and merge the result in place.
    pub async fn update_account(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        self.0.update(params).await
    }

    /// Promote this account to the user's primary account.
    pub async fn make_primary(&mut self) -> Result<(), CoinbaseError> {
        let path = self
            .resource_path()
            .map(str::to_owned)
            .ok_or_else(|| CoinbaseError::InvalidResponse("account has no resource_path".into()))?;
        let client = self.0.client().clone();
        let response = client.post(&format!("{path}/primary"), &Params::new()).await?;
        self.0.merge(response.data());
        Ok(())
    }

    /// Delete this account.
    pub async fn delete_account(&mut self) -> Result<(), CoinbaseError> {
        self.0.delete(&Params::new()).await
    }
}

impl Transfer {
    /// Commit this transfer (buys, sells, deposits and withdrawals are
    /// created uncommitted unless requested otherwise).
    pub async fn commit_transfer(&mut self) -> Result<(), CoinbaseError> {
        self.0.commit(&Params::new()).await
    }
}

impl MoneyRequest {
    /// Re-send the notification email for this request.
    pub async fn resend_request(&mut self) -> Result<(), CoinbaseError> {
        self.0.resend(&Params::new()).await
    }

    /// Cancel this request.
    pub async fn cancel_request(&mut self) -> Result<(), CoinbaseError> {
        self.0.cancel(&Params::new()).await
    }

    /// Complete (pay) this request.
    pub async fn complete_request(&mut self) -> Result<(), CoinbaseError> {
        let path = self
            .resource_path()
            .map(str::to_owned)
            .ok_or_else(|| CoinbaseError::InvalidResponse("request has no resource_path".into()))?;
        let client = self.0.client().clone();
        let response = client.post(&format!("{path}/complete"), &Params::new()).await?;
        self.0.merge(response.data());
        Ok(())
    }
}

impl Order {
    /// Refund this order.
    pub async fn refund(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        self.0.refund(params).await
    }
}

impl CurrentUser {
    /// Update the authenticated user's profile in place.
    pub async fn update_user(&mut self, params: &Params) -> Result<(), CoinbaseError> {
        self.0.update(params).await
    }
}
