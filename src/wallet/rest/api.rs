//! Wallet API endpoint wrappers.
//!
//! Thin request-building glue over the [`ApiClient`] verb primitives: each
//! method formats a path, validates required parameters client-side (no
//! wasted round-trip for a request the server would reject), issues the
//! call, and wraps the decoded payload. Implemented as a blanket trait so
//! the HMAC and OAuth clients share the whole surface.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoinbaseError;
use crate::wallet::rest::endpoints::paths;
use crate::wallet::rest::models::{
    Account, Checkout, CurrentUser, MoneyRequest, Order, Transaction, Transfer, User,
};
use crate::wallet::rest::object::ApiObject;
use crate::wallet::rest::traits::{ApiClient, Params};

/// Ensure required parameters are present before issuing a request.
fn require(params: &Params, keys: &[&'static str]) -> Result<(), CoinbaseError> {
    for key in keys {
        if !params.contains_key(*key) {
            return Err(CoinbaseError::MissingParam(key));
        }
    }
    Ok(())
}

/// The full Wallet API surface, available on any [`ApiClient`] variant.
#[async_trait]
pub trait WalletApi: ApiClient + Clone + Sized + Sync + 'static {
    /// A shareable handle for response objects to call back through.
    fn handle(&self) -> Arc<dyn ApiClient> {
        Arc::new(self.clone())
    }

    //
    // Market data
    //

    /// List known currencies.
    async fn currencies(&self) -> Result<Vec<ApiObject>, CoinbaseError> {
        let response = self.get(paths::CURRENCIES, &Params::new()).await?;
        Ok(ApiObject::collection(&self.handle(), response.data()))
    }

    /// Current exchange rates.
    async fn exchange_rates(&self, params: Params) -> Result<ApiObject, CoinbaseError> {
        let response = self.get(paths::EXCHANGE_RATES, &params).await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    /// Total buy price for a currency pair, fees included.
    async fn buy_price(&self, params: Params) -> Result<ApiObject, CoinbaseError> {
        let response = self.get(paths::BUY_PRICE, &params).await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    /// Total sell price for a currency pair, fees included.
    async fn sell_price(&self, params: Params) -> Result<ApiObject, CoinbaseError> {
        let response = self.get(paths::SELL_PRICE, &params).await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    /// Market spot price for a currency pair.
    async fn spot_price(&self, params: Params) -> Result<ApiObject, CoinbaseError> {
        let response = self.get(paths::SPOT_PRICE, &params).await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    /// Server time.
    async fn server_time(&self) -> Result<ApiObject, CoinbaseError> {
        let response = self.get(paths::TIME, &Params::new()).await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    //
    // Users
    //

    /// A user's public profile.
    async fn user(&self, user_id: &str) -> Result<User, CoinbaseError> {
        let response = self.get(&format!("/v2/users/{user_id}"), &Params::new()).await?;
        Ok(User::from(ApiObject::new(self.handle(), response.data())))
    }

    /// The authenticated user.
    async fn current_user(&self) -> Result<CurrentUser, CoinbaseError> {
        let response = self.get(paths::CURRENT_USER, &Params::new()).await?;
        Ok(CurrentUser::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Authentication metadata for the current credentials.
    async fn auth_info(&self) -> Result<ApiObject, CoinbaseError> {
        let response = self.get(paths::USER_AUTH, &Params::new()).await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    /// Update the authenticated user's profile.
    async fn update_current_user(&self, params: Params) -> Result<CurrentUser, CoinbaseError> {
        let response = self.put(paths::CURRENT_USER, &params).await?;
        Ok(CurrentUser::from(ApiObject::new(self.handle(), response.data())))
    }

    //
    // Accounts
    //

    /// List the user's accounts (one page; see `fetch_all` for everything).
    async fn accounts(&self) -> Result<Vec<Account>, CoinbaseError> {
        let response = self.get(paths::ACCOUNTS, &Params::new()).await?;
        Ok(collect(self.handle(), response.data()))
    }

    /// One account by id.
    async fn account(&self, account_id: &str) -> Result<Account, CoinbaseError> {
        let response = self
            .get(&format!("/v2/accounts/{account_id}"), &Params::new())
            .await?;
        Ok(Account::from(ApiObject::new(self.handle(), response.data())))
    }

    /// The user's primary account.
    async fn primary_account(&self) -> Result<Account, CoinbaseError> {
        let response = self.get(paths::PRIMARY_ACCOUNT, &Params::new()).await?;
        Ok(Account::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Promote an account to primary.
    async fn set_primary_account(&self, account_id: &str) -> Result<Account, CoinbaseError> {
        let response = self
            .post(&format!("/v2/accounts/{account_id}/primary"), &Params::new())
            .await?;
        Ok(Account::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Create a new account.
    async fn create_account(&self, params: Params) -> Result<Account, CoinbaseError> {
        let response = self.post(paths::ACCOUNTS, &params).await?;
        Ok(Account::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Update an account.
    async fn update_account(
        &self,
        account_id: &str,
        params: Params,
    ) -> Result<Account, CoinbaseError> {
        let response = self
            .put(&format!("/v2/accounts/{account_id}"), &params)
            .await?;
        Ok(Account::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Delete an account.
    async fn delete_account(&self, account_id: &str) -> Result<(), CoinbaseError> {
        self.delete(&format!("/v2/accounts/{account_id}"), &Params::new())
            .await?;
        Ok(())
    }

    //
    // Addresses
    //

    /// List receive addresses for an account.
    async fn addresses(&self, account_id: &str) -> Result<Vec<ApiObject>, CoinbaseError> {
        let response = self
            .get(&format!("/v2/accounts/{account_id}/addresses"), &Params::new())
            .await?;
        Ok(ApiObject::collection(&self.handle(), response.data()))
    }

    /// One receive address.
    async fn address(
        &self,
        account_id: &str,
        address_id: &str,
    ) -> Result<ApiObject, CoinbaseError> {
        let response = self
            .get(
                &format!("/v2/accounts/{account_id}/addresses/{address_id}"),
                &Params::new(),
            )
            .await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    /// Create a receive address.
    async fn create_address(
        &self,
        account_id: &str,
        params: Params,
    ) -> Result<ApiObject, CoinbaseError> {
        let response = self
            .post(&format!("/v2/accounts/{account_id}/addresses"), &params)
            .await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    //
    // Transactions
    //

    /// List transactions for an account.
    async fn transactions(&self, account_id: &str) -> Result<Vec<Transaction>, CoinbaseError> {
        let response = self
            .get(&format!("/v2/accounts/{account_id}/transactions"), &Params::new())
            .await?;
        Ok(collect(self.handle(), response.data()))
    }

    /// One transaction.
    async fn transaction(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<Transaction, CoinbaseError> {
        let response = self
            .get(
                &format!("/v2/accounts/{account_id}/transactions/{transaction_id}"),
                &Params::new(),
            )
            .await?;
        Ok(Transaction::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Send money to an address or email. Requires `to` and `amount`.
    async fn send_money(
        &self,
        account_id: &str,
        mut params: Params,
    ) -> Result<Transaction, CoinbaseError> {
        require(&params, &["to", "amount"])?;
        params.insert("type".to_owned(), Value::String("send".to_owned()));
        let response = self
            .post(&format!("/v2/accounts/{account_id}/transactions"), &params)
            .await?;
        Ok(Transaction::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Transfer money between the user's own accounts. Requires `to` and `amount`.
    async fn transfer_money(
        &self,
        account_id: &str,
        mut params: Params,
    ) -> Result<Transaction, CoinbaseError> {
        require(&params, &["to", "amount"])?;
        params.insert("type".to_owned(), Value::String("transfer".to_owned()));
        let response = self
            .post(&format!("/v2/accounts/{account_id}/transactions"), &params)
            .await?;
        Ok(Transaction::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Request money from an email. Requires `to`, `amount` and `currency`.
    async fn request_money(
        &self,
        account_id: &str,
        mut params: Params,
    ) -> Result<MoneyRequest, CoinbaseError> {
        require(&params, &["to", "amount", "currency"])?;
        params.insert("type".to_owned(), Value::String("request".to_owned()));
        let response = self
            .post(&format!("/v2/accounts/{account_id}/transactions"), &params)
            .await?;
        Ok(MoneyRequest::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Re-send a pending money request's notification email.
    async fn resend_request(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<ApiObject, CoinbaseError> {
        let response = self
            .post(
                &format!("/v2/accounts/{account_id}/transactions/{transaction_id}/resend"),
                &Params::new(),
            )
            .await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    /// Cancel a pending money request.
    async fn cancel_request(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<ApiObject, CoinbaseError> {
        let response = self
            .delete(
                &format!("/v2/accounts/{account_id}/transactions/{transaction_id}"),
                &Params::new(),
            )
            .await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    /// Complete (pay) a money request sent to the current user.
    async fn complete_request(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<ApiObject, CoinbaseError> {
        let response = self
            .post(
                &format!("/v2/accounts/{account_id}/transactions/{transaction_id}/complete"),
                &Params::new(),
            )
            .await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    //
    // Buys
    //

    /// List buys for an account.
    async fn list_buys(&self, account_id: &str) -> Result<Vec<Transfer>, CoinbaseError> {
        let response = self
            .get(&format!("/v2/accounts/{account_id}/buys"), &Params::new())
            .await?;
        Ok(collect(self.handle(), response.data()))
    }

    /// One buy.
    async fn buy_order(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<Transfer, CoinbaseError> {
        let response = self
            .get(
                &format!("/v2/accounts/{account_id}/buys/{transaction_id}"),
                &Params::new(),
            )
            .await?;
        Ok(Transfer::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Buy currency. Requires `amount`.
    async fn buy(&self, account_id: &str, params: Params) -> Result<Transfer, CoinbaseError> {
        require(&params, &["amount"])?;
        let response = self
            .post(&format!("/v2/accounts/{account_id}/buys"), &params)
            .await?;
        Ok(Transfer::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Commit an uncommitted buy.
    async fn commit_buy(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<Transfer, CoinbaseError> {
        let response = self
            .post(
                &format!("/v2/accounts/{account_id}/buys/{transaction_id}/commit"),
                &Params::new(),
            )
            .await?;
        Ok(Transfer::from(ApiObject::new(self.handle(), response.data())))
    }

    //
    // Sells
    //

    /// List sells for an account.
    async fn list_sells(&self, account_id: &str) -> Result<Vec<Transfer>, CoinbaseError> {
        let response = self
            .get(&format!("/v2/accounts/{account_id}/sells"), &Params::new())
            .await?;
        Ok(collect(self.handle(), response.data()))
    }

    /// Sell currency. Requires `amount`.
    async fn sell(&self, account_id: &str, params: Params) -> Result<Transfer, CoinbaseError> {
        require(&params, &["amount"])?;
        let response = self
            .post(&format!("/v2/accounts/{account_id}/sells"), &params)
            .await?;
        Ok(Transfer::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Commit an uncommitted sell.
    async fn commit_sell(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<Transfer, CoinbaseError> {
        let response = self
            .post(
                &format!("/v2/accounts/{account_id}/sells/{transaction_id}/commit"),
                &Params::new(),
            )
            .await?;
        Ok(Transfer::from(ApiObject::new(self.handle(), response.data())))
    }

    //
    // Deposits
    //

    /// List fiat deposits for an account.
    async fn list_deposits(&self, account_id: &str) -> Result<Vec<Transfer>, CoinbaseError> {
        let response = self
            .get(&format!("/v2/accounts/{account_id}/deposits"), &Params::new())
            .await?;
        Ok(collect(self.handle(), response.data()))
    }

    /// Deposit fiat into an account. Requires `amount`.
    async fn deposit(&self, account_id: &str, params: Params) -> Result<Transfer, CoinbaseError> {
        require(&params, &["amount"])?;
        let response = self
            .post(&format!("/v2/accounts/{account_id}/deposits"), &params)
            .await?;
        Ok(Transfer::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Commit an uncommitted deposit.
    async fn commit_deposit(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<Transfer, CoinbaseError> {
        let response = self
            .post(
                &format!("/v2/accounts/{account_id}/deposits/{transaction_id}/commit"),
                &Params::new(),
            )
            .await?;
        Ok(Transfer::from(ApiObject::new(self.handle(), response.data())))
    }

    //
    // Withdrawals
    //

    /// List fiat withdrawals for an account.
    async fn list_withdrawals(&self, account_id: &str) -> Result<Vec<Transfer>, CoinbaseError> {
        let response = self
            .get(&format!("/v2/accounts/{account_id}/withdrawals"), &Params::new())
            .await?;
        Ok(collect(self.handle(), response.data()))
    }

    /// Withdraw fiat from an account. Requires `amount`.
    async fn withdraw(&self, account_id: &str, params: Params) -> Result<Transfer, CoinbaseError> {
        require(&params, &["amount"])?;
        let response = self
            .post(&format!("/v2/accounts/{account_id}/withdrawals"), &params)
            .await?;
        Ok(Transfer::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Commit an uncommitted withdrawal.
    async fn commit_withdrawal(
        &self,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<Transfer, CoinbaseError> {
        let response = self
            .post(
                &format!("/v2/accounts/{account_id}/withdrawals/{transaction_id}/commit"),
                &Params::new(),
            )
            .await?;
        Ok(Transfer::from(ApiObject::new(self.handle(), response.data())))
    }

    //
    // Payment methods
    //

    /// List the user's payment methods.
    async fn payment_methods(&self) -> Result<Vec<ApiObject>, CoinbaseError> {
        let response = self.get(paths::PAYMENT_METHODS, &Params::new()).await?;
        Ok(ApiObject::collection(&self.handle(), response.data()))
    }

    /// One payment method.
    async fn payment_method(&self, payment_method_id: &str) -> Result<ApiObject, CoinbaseError> {
        let response = self
            .get(&format!("/v2/payment-methods/{payment_method_id}"), &Params::new())
            .await?;
        Ok(ApiObject::new(self.handle(), response.data()))
    }

    //
    // Merchant orders
    //

    /// List merchant orders.
    async fn orders(&self) -> Result<Vec<Order>, CoinbaseError> {
        let response = self.get(paths::ORDERS, &Params::new()).await?;
        Ok(collect(self.handle(), response.data()))
    }

    /// One merchant order.
    async fn order(&self, order_id: &str) -> Result<Order, CoinbaseError> {
        let response = self
            .get(&format!("/v2/orders/{order_id}"), &Params::new())
            .await?;
        Ok(Order::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Create a merchant order. Requires `amount`, `currency` and `name`.
    async fn create_order(&self, params: Params) -> Result<Order, CoinbaseError> {
        require(&params, &["amount", "currency", "name"])?;
        let response = self.post(paths::ORDERS, &params).await?;
        Ok(Order::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Refund a merchant order. Requires `currency`.
    async fn refund_order(&self, order_id: &str, params: Params) -> Result<Order, CoinbaseError> {
        require(&params, &["currency"])?;
        let response = self
            .post(&format!("/v2/orders/{order_id}/refund"), &params)
            .await?;
        Ok(Order::from(ApiObject::new(self.handle(), response.data())))
    }

    //
    // Checkouts
    //

    /// List checkouts.
    async fn checkouts(&self) -> Result<Vec<Checkout>, CoinbaseError> {
        let response = self.get(paths::CHECKOUTS, &Params::new()).await?;
        Ok(collect(self.handle(), response.data()))
    }

    /// One checkout.
    async fn checkout(&self, checkout_id: &str) -> Result<Checkout, CoinbaseError> {
        let response = self
            .get(&format!("/v2/checkouts/{checkout_id}"), &Params::new())
            .await?;
        Ok(Checkout::from(ApiObject::new(self.handle(), response.data())))
    }

    /// Create a checkout. Requires `amount`, `currency` and `name`.
    async fn create_checkout(&self, params: Params) -> Result<Checkout, CoinbaseError> {
        require(&params, &["amount", "currency", "name"])?;
        let response = self.post(paths::CHECKOUTS, &params).await?;
        Ok(Checkout::from(ApiObject::new(self.handle(), response.data())))
    }

    /// List the orders placed against a checkout.
    async fn checkout_orders(&self, checkout_id: &str) -> Result<Vec<Order>, CoinbaseError> {
        let response = self
            .get(&format!("/v2/checkouts/{checkout_id}/orders"), &Params::new())
            .await?;
        Ok(collect(self.handle(), response.data()))
    }

    /// Create an order against a checkout.
    async fn create_checkout_order(&self, checkout_id: &str) -> Result<Order, CoinbaseError> {
        let response = self
            .post(&format!("/v2/checkouts/{checkout_id}/orders"), &Params::new())
            .await?;
        Ok(Order::from(ApiObject::new(self.handle(), response.data())))
    }
}

impl<C> WalletApi for C where C: ApiClient + Clone + Sync + 'static {}

fn collect<M: From<ApiObject>>(client: Arc<dyn ApiClient>, data: &Value) -> Vec<M> {
    ApiObject::collection(&client, data)
        .into_iter()
        .map(M::from)
        .collect()
}
