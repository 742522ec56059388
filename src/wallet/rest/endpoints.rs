//! Coinbase Wallet API endpoint constants.

/// Base URL for the Coinbase Wallet API.
pub const BASE_API_URL: &str = "https://api.coinbase.com";

/// The API version date sent in the `CB-VERSION` header.
pub const API_VERSION: &str = "2015-06-16";

/// Stable (non-parameterized) endpoint paths.
#[allow(dead_code)]
pub mod paths {
    // Market data
    /// List known currencies.
    pub const CURRENCIES: &str = "/v2/currencies";
    /// Current exchange rates.
    pub const EXCHANGE_RATES: &str = "/v2/exchange-rates";
    /// Buy price for a currency pair.
    pub const BUY_PRICE: &str = "/v2/prices/buy";
    /// Sell price for a currency pair.
    pub const SELL_PRICE: &str = "/v2/prices/sell";
    /// Spot price for a currency pair.
    pub const SPOT_PRICE: &str = "/v2/prices/spot";
    /// Server time.
    pub const TIME: &str = "/v2/time";

    // Users
    /// The authenticated user.
    pub const CURRENT_USER: &str = "/v2/user";
    /// Authentication metadata for the current token.
    pub const USER_AUTH: &str = "/v2/user/auth";

    // Accounts
    /// List or create accounts.
    pub const ACCOUNTS: &str = "/v2/accounts";
    /// The primary account.
    pub const PRIMARY_ACCOUNT: &str = "/v2/accounts/primary";

    // Payment methods
    /// List payment methods.
    pub const PAYMENT_METHODS: &str = "/v2/payment-methods";

    // Merchant
    /// List or create orders.
    pub const ORDERS: &str = "/v2/orders";
    /// List or create checkouts.
    pub const CHECKOUTS: &str = "/v2/checkouts";

    // OAuth
    /// Token grant/refresh endpoint.
    pub const OAUTH_TOKEN: &str = "/oauth/token";
    /// Token revocation endpoint.
    pub const OAUTH_REVOKE: &str = "/oauth/revoke";
}
