//! Checkout step names, used in logs, metrics labels and errors.

/// Step 1: read the user's cart.
pub const FETCH_CART: &str = "fetch_cart";

/// Step 2: resolve every cart line in the product catalog.
pub const RESOLVE_ITEMS: &str = "resolve_items";

/// Step 3: convert prices into the requested currency.
pub const CONVERT_PRICES: &str = "convert_prices";

/// Step 4: obtain a shipping quote.
pub const QUOTE_SHIPPING: &str = "quote_shipping";

/// Step 5: charge the payment credential. First externally visible side effect.
pub const CHARGE_PAYMENT: &str = "charge_payment";

/// Step 6: confirm the shipment and obtain a tracking ID.
pub const CONFIRM_SHIPMENT: &str = "confirm_shipment";

/// Step 7: send the order confirmation email. Non-essential.
pub const SEND_CONFIRMATION: &str = "send_confirmation";

/// Step 8: empty the cart. Non-essential.
pub const EMPTY_CART: &str = "empty_cart";
